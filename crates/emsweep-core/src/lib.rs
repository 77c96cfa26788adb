//! # EMSWEEP Core Library
//!
//! Orchestrates energy sweeps of the Geant4 TestEm1 example and turns the
//! scraped energy deposits into Bethe-Bloch energy-loss curve data.
//!
//! ## Architecture
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: macro templating,
//!   console-output scraping, the append-only result table, the Bethe-Bloch
//!   formula and the small numeric toolkit used by the analysis.
//!
//! - **[`engine`]: The Orchestration Support.** Configuration and its builder,
//!   engine errors, progress reporting and the [`engine::runner::SimulationRunner`]
//!   seam through which the external executable is invoked.
//!
//! - **[`workflows`]: The Public API.** Complete procedures: the energy sweep
//!   ([`workflows::sweep`]) and the curve analysis ([`workflows::analyze`]).

pub mod core;
pub mod engine;
pub mod workflows;
