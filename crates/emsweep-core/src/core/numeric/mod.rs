//! Small numeric toolkit for post-processing a sweep: not-a-knot cubic splines,
//! least-squares line fits and summary statistics.

pub mod interpolation;
pub mod regression;
pub mod statistics;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NumericError {
    #[error("At least {required} points are required, found {found}")]
    TooFewPoints { required: usize, found: usize },

    #[error("Abscissa and ordinate lengths differ ({x_len} vs {y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Abscissae must be strictly increasing (violated at index {index})")]
    NotIncreasing { index: usize },

    #[error("Abscissae have zero variance; the fit is undetermined")]
    DegenerateAbscissae,
}
