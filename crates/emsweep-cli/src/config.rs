pub mod defaults;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use emsweep::core::energy::energy_points;
use emsweep::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialFailurePolicy {
    Flag,
    Abort,
}

impl From<PartialFailurePolicy> for core_config::FailurePolicy {
    fn from(p: PartialFailurePolicy) -> Self {
        match p {
            PartialFailurePolicy::Flag => core_config::FailurePolicy::Flag,
            PartialFailurePolicy::Abort => core_config::FailurePolicy::Abort,
        }
    }
}

impl PartialFailurePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "flag" => Some(Self::Flag),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSimulationConfig {
    executable: Option<PathBuf>,
    template: Option<PathBuf>,
    placeholder: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSweepSettings {
    #[serde(rename = "energies-mev")]
    energies_mev: Option<Vec<f64>>,
    #[serde(rename = "failure-policy")]
    failure_policy: Option<PartialFailurePolicy>,
    #[serde(rename = "radiative-echo-threshold-mev")]
    radiative_echo_threshold_mev: Option<f64>,
    #[serde(rename = "macro-dir")]
    macro_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    table: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSweepConfig {
    simulation: Option<PartialSimulationConfig>,
    sweep: Option<PartialSweepSettings>,
    output: Option<PartialOutputConfig>,
}

impl PartialSweepConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or starts from an empty layer.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the final sweep configuration.
    ///
    /// Precedence: command-line flag, then `--set`, then file, then defaults.
    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<core_config::SweepConfig> {
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let simulation = self.simulation.take().unwrap_or_default();
        let sweep = self.sweep.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let executable = args
            .executable
            .clone()
            .or(simulation.executable)
            .unwrap_or_else(|| PathBuf::from(&defaults.executable));
        let template = match args.template.clone().or(simulation.template) {
            Some(path) => core_config::TemplateSource::File(path),
            None => core_config::TemplateSource::Builtin,
        };
        let placeholder = args
            .placeholder
            .clone()
            .or(simulation.placeholder)
            .unwrap_or(defaults.placeholder);

        let energies = args
            .energies
            .clone()
            .or(sweep.energies_mev)
            .unwrap_or(defaults.energies_mev);
        let failure_policy = if args.abort_on_failure {
            core_config::FailurePolicy::Abort
        } else {
            sweep
                .failure_policy
                .map(Into::into)
                .unwrap_or_default()
        };
        let macro_dir = args.macro_dir.clone().or(sweep.macro_dir);

        let table_path = args
            .output
            .clone()
            .or(output.table)
            .unwrap_or_else(|| PathBuf::from(&defaults.table));

        core_config::SweepConfigBuilder::new()
            .executable(executable)
            .template(template)
            .placeholder(placeholder)
            .energies(energy_points(&energies))
            .failure_policy(failure_policy)
            .radiative_echo_threshold_mev(
                sweep
                    .radiative_echo_threshold_mev
                    .unwrap_or(defaults.radiative_echo_threshold_mev),
            )
            .macro_dir(macro_dir)
            .table_path(table_path)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "simulation.executable" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .executable = Some(PathBuf::from(value_str));
                }
                "simulation.template" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .template = Some(PathBuf::from(value_str));
                }
                "simulation.placeholder" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .placeholder = Some(value_str.to_string());
                }
                "sweep.energies-mev" => {
                    let energies = value_str
                        .split(',')
                        .map(|v| v.trim().parse::<f64>())
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map_err(|_| {
                            CliError::Config(format!(
                                "Invalid energy list for {}: {}",
                                key, value_str
                            ))
                        })?;
                    self.sweep
                        .get_or_insert_with(Default::default)
                        .energies_mev = Some(energies);
                }
                "sweep.failure-policy" => {
                    let policy = PartialFailurePolicy::parse(value_str).ok_or_else(|| {
                        CliError::Config(format!(
                            "Invalid value for {}: '{}'. Expected 'flag' or 'abort'.",
                            key, value_str
                        ))
                    })?;
                    self.sweep
                        .get_or_insert_with(Default::default)
                        .failure_policy = Some(policy);
                }
                "sweep.radiative-echo-threshold-mev" => {
                    self.sweep
                        .get_or_insert_with(Default::default)
                        .radiative_echo_threshold_mev = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
                }
                "sweep.macro-dir" => {
                    self.sweep
                        .get_or_insert_with(Default::default)
                        .macro_dir = Some(PathBuf::from(value_str));
                }
                "output.table" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .table = Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use defaults::DEFAULT_ENERGIES_MEV;
    use emsweep::core::energy::EnergyPoint;
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["emsweep", "run"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            _ => panic!("Expected 'run' subcommand"),
        }
    }

    const FULL_CONFIG: &str = r#"
        [simulation]
        executable = "/opt/geant4/TestEm1"
        template = "muon_copper.mac.in"
        placeholder = "%E%"

        [sweep]
        energies-mev = [1.0, 2.0, 5.0]
        failure-policy = "abort"
        radiative-echo-threshold-mev = 500.0
        macro-dir = "macros"

        [output]
        table = "sweep.csv"
    "#;

    #[test]
    fn defaults_apply_without_config_file() {
        let config = PartialSweepConfig::load(None)
            .unwrap()
            .merge_with_cli(&run_args(&[]))
            .unwrap();

        assert_eq!(config.simulation.executable, PathBuf::from("./TestEm1"));
        assert_eq!(
            config.simulation.template,
            core_config::TemplateSource::Builtin
        );
        assert_eq!(config.sweep.energies.len(), DEFAULT_ENERGIES_MEV.len());
        assert_eq!(config.sweep.energies[0], EnergyPoint::from_mev(0.1));
        assert_eq!(config.sweep.failure_policy, core_config::FailurePolicy::Flag);
        assert_eq!(config.sweep.radiative_echo_threshold_mev, 1.0e6);
        assert_eq!(config.output.table_path, PathBuf::from("detailed_results.csv"));
    }

    #[test]
    fn file_values_are_loaded() {
        let path = write_config_file("full.toml", FULL_CONFIG);
        let config = PartialSweepConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&[]))
            .unwrap();

        assert_eq!(
            config.simulation.executable,
            PathBuf::from("/opt/geant4/TestEm1")
        );
        assert_eq!(
            config.simulation.template,
            core_config::TemplateSource::File(PathBuf::from("muon_copper.mac.in"))
        );
        assert_eq!(config.simulation.placeholder, "%E%");
        assert_eq!(config.sweep.energies, energy_points(&[1.0, 2.0, 5.0]));
        assert_eq!(config.sweep.failure_policy, core_config::FailurePolicy::Abort);
        assert_eq!(config.sweep.radiative_echo_threshold_mev, 500.0);
        assert_eq!(config.sweep.macro_dir, Some(PathBuf::from("macros")));
        assert_eq!(config.output.table_path, PathBuf::from("sweep.csv"));
    }

    #[test]
    fn cli_args_override_file_values() {
        let path = write_config_file("override.toml", FULL_CONFIG);
        let args = run_args(&[
            "-e",
            "./build/TestEm1",
            "--energies",
            "10,20",
            "-o",
            "cli.csv",
        ]);
        let config = PartialSweepConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(
            config.simulation.executable,
            PathBuf::from("./build/TestEm1")
        );
        assert_eq!(config.sweep.energies, energy_points(&[10.0, 20.0]));
        assert_eq!(config.output.table_path, PathBuf::from("cli.csv"));
        assert_eq!(config.simulation.placeholder, "%E%");
    }

    #[test]
    fn set_value_overrides_file_but_not_cli_flags() {
        let path = write_config_file("set.toml", FULL_CONFIG);
        let args = run_args(&[
            "-S",
            "sweep.energies-mev=3, 4",
            "-S",
            "sweep.failure-policy=flag",
            "-S",
            "output.table=set.csv",
            "-o",
            "flag.csv",
        ]);
        let config = PartialSweepConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.sweep.energies, energy_points(&[3.0, 4.0]));
        assert_eq!(config.sweep.failure_policy, core_config::FailurePolicy::Flag);
        assert_eq!(config.output.table_path, PathBuf::from("flag.csv"));
    }

    #[test]
    fn abort_flag_wins_over_file_policy() {
        let path = write_config_file("policy.toml", "[sweep]\nfailure-policy = \"flag\"\n");
        let config = PartialSweepConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&["--abort-on-failure"]))
            .unwrap();
        assert_eq!(config.sweep.failure_policy, core_config::FailurePolicy::Abort);
    }

    #[test]
    fn unknown_keys_in_file_are_rejected() {
        let path = write_config_file("unknown.toml", "[sweep]\nenergy = [1.0]\n");
        let result = PartialSweepConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        for bad in [
            "no-equals-sign",
            "sweep.unknown=1",
            "sweep.failure-policy=maybe",
            "sweep.energies-mev=1,two",
        ] {
            let result = PartialSweepConfig::default().merge_with_cli(&run_args(&["-S", bad]));
            assert!(
                matches!(result, Err(CliError::Config(_))),
                "accepted invalid --set value: {bad}"
            );
        }
    }

    #[test]
    fn empty_energy_list_fails_validation() {
        let path = write_config_file("empty.toml", "[sweep]\nenergies-mev = []\n");
        let result = PartialSweepConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&[]));
        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("energies")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
