//! # Workflows Module
//!
//! Top-level entry points that tie the core and engine layers together.
//!
//! - [`sweep`] renders one macro per energy, runs the simulation, scrapes its
//!   console output and appends a row to the result table.
//! - [`analyze`] reads a result table back and derives the minimum-ionization
//!   point, regional statistics, high-energy trends and a curve export.

pub mod analyze;
pub mod sweep;
