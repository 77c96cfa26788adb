//! # Engine Module
//!
//! Support layer for the sweep and analysis workflows.
//!
//! - **Configuration** ([`config`]) - Sweep and analysis settings with a validating builder
//! - **Error Handling** ([`error`]) - Engine and analysis error types
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress and status events
//! - **Simulation Runner** ([`runner`]) - The seam through which the external
//!   simulation executable is invoked, one blocking call per energy point

pub mod config;
pub mod error;
pub mod progress;
pub mod runner;
