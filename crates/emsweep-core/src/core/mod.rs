//! # Core Module
//!
//! Stateless building blocks shared by the sweep and analysis workflows.
//!
//! - **Energy Points** ([`energy`]) - The scalar kinetic energies a sweep iterates over
//! - **Macro Templating** ([`template`]) - Rendering Geant4 macros for one energy point
//! - **Output Scraping** ([`scrape`]) - Line rules extracting values from console output
//! - **Result Table** ([`table`]) - The append-only CSV sink and its reader
//! - **Physics** ([`physics`]) - Relativistic kinematics and the Bethe-Bloch formula
//! - **Numerics** ([`numeric`]) - Spline interpolation, regression and summary statistics

pub mod energy;
pub mod numeric;
pub mod physics;
pub mod scrape;
pub mod table;
pub mod template;
