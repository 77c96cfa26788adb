use crate::core::energy::EnergyPoint;
use crate::core::physics::materials::{COPPER, MUON, MaterialProperties, Particle};
use crate::core::template::DEFAULT_PLACEHOLDER;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Where the macro template comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TemplateSource {
    #[default]
    Builtin,
    File(PathBuf),
}

/// What the sweep does when the simulation exits unsuccessfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Write a row with the missing fields flagged and move on.
    #[default]
    Flag,
    /// Write the flagged row, then stop the sweep.
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub executable: PathBuf,
    pub template: TemplateSource,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepSettings {
    pub energies: Vec<EnergyPoint>,
    pub failure_policy: FailurePolicy,
    pub radiative_echo_threshold_mev: f64,
    pub macro_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub table_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub simulation: SimulationConfig,
    pub sweep: SweepSettings,
    pub output: OutputConfig,
}

#[derive(Default)]
pub struct SweepConfigBuilder {
    executable: Option<PathBuf>,
    template: Option<TemplateSource>,
    placeholder: Option<String>,
    energies: Option<Vec<EnergyPoint>>,
    failure_policy: Option<FailurePolicy>,
    radiative_echo_threshold_mev: Option<f64>,
    macro_dir: Option<PathBuf>,
    table_path: Option<PathBuf>,
}

impl SweepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable(mut self, path: PathBuf) -> Self {
        self.executable = Some(path);
        self
    }
    pub fn template(mut self, source: TemplateSource) -> Self {
        self.template = Some(source);
        self
    }
    pub fn placeholder(mut self, token: impl Into<String>) -> Self {
        self.placeholder = Some(token.into());
        self
    }
    pub fn energies(mut self, energies: Vec<EnergyPoint>) -> Self {
        self.energies = Some(energies);
        self
    }
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }
    pub fn radiative_echo_threshold_mev(mut self, threshold: f64) -> Self {
        self.radiative_echo_threshold_mev = Some(threshold);
        self
    }
    pub fn macro_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.macro_dir = dir;
        self
    }
    pub fn table_path(mut self, path: PathBuf) -> Self {
        self.table_path = Some(path);
        self
    }

    pub fn build(self) -> Result<SweepConfig, ConfigError> {
        let placeholder = self
            .placeholder
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string());
        if placeholder.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "placeholder",
                reason: "must not be empty".to_string(),
            });
        }

        let energies = self
            .energies
            .ok_or(ConfigError::MissingParameter("energies"))?;
        if energies.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "energies",
                reason: "at least one energy point is required".to_string(),
            });
        }
        if let Some(bad) = energies.iter().find(|e| !e.is_finite()) {
            return Err(ConfigError::InvalidValue {
                parameter: "energies",
                reason: format!("'{}' is not a finite number", bad),
            });
        }

        let radiative_echo_threshold_mev = self
            .radiative_echo_threshold_mev
            .ok_or(ConfigError::MissingParameter("radiative_echo_threshold_mev"))?;

        let simulation = SimulationConfig {
            executable: self
                .executable
                .ok_or(ConfigError::MissingParameter("executable"))?,
            template: self.template.unwrap_or_default(),
            placeholder,
        };
        let sweep = SweepSettings {
            energies,
            failure_policy: self.failure_policy.unwrap_or_default(),
            radiative_echo_threshold_mev,
            macro_dir: self.macro_dir,
        };
        let output = OutputConfig {
            table_path: self
                .table_path
                .ok_or(ConfigError::MissingParameter("table_path"))?,
        };

        Ok(SweepConfig {
            simulation,
            sweep,
            output,
        })
    }
}

/// Settings for the post-sweep curve analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Energy window (MeV, inclusive) searched for the ionization minimum.
    pub minimum_window_mev: (f64, f64),
    /// Number of log-spaced points in the exported curve.
    pub curve_points: usize,
    /// Energy range (MeV) of the standalone Bethe-Bloch curve. Independent of
    /// the data range.
    pub theory_range_mev: (f64, f64),
    pub theory_points: usize,
    pub particle: Particle,
    pub material: MaterialProperties,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            minimum_window_mev: (100.0, 5000.0),
            curve_points: 500,
            theory_range_mev: (1.0, 1.0e9),
            theory_points: 2000,
            particle: MUON,
            material: COPPER,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = self.minimum_window_mev;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(ConfigError::InvalidValue {
                parameter: "minimum_window_mev",
                reason: format!("[{}, {}] is not a valid range", lo, hi),
            });
        }
        if self.curve_points < 2 {
            return Err(ConfigError::InvalidValue {
                parameter: "curve_points",
                reason: "at least two points are required".to_string(),
            });
        }
        let (lo, hi) = self.theory_range_mev;
        if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || lo >= hi {
            return Err(ConfigError::InvalidValue {
                parameter: "theory_range_mev",
                reason: format!("[{}, {}] is not a positive increasing range", lo, hi),
            });
        }
        if self.theory_points < 2 {
            return Err(ConfigError::InvalidValue {
                parameter: "theory_points",
                reason: "at least two points are required".to_string(),
            });
        }
        Ok(())
    }
}
