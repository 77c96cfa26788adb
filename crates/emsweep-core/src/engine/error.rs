use crate::core::numeric::NumericError;
use crate::core::table::TableError;
use crate::core::template::TemplateError;
use super::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Macro template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Result table error: {0}")]
    Table(#[from] TableError),

    #[error("Simulation executable not found: {}", path.display())]
    ExecutableNotFound { path: PathBuf },

    #[error("Failed to launch '{}': {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulation run at {energy} MeV failed: {cause}")]
    RunFailed { energy: String, cause: String },

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Need at least {required} rows with a positive deposit, found {usable}")]
    InsufficientData { required: usize, usable: usize },

    #[error("Numeric error: {0}")]
    Numeric(#[from] NumericError),

    #[error("Result table error: {0}")]
    Table(#[from] TableError),

    #[error("Failed to write curve export '{path}': {source}")]
    CurveExport { path: String, source: csv::Error },
}
