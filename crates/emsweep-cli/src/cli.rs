use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "EMSWEEP CLI - Drives energy sweeps of the Geant4 TestEm1 example and analyzes the resulting energy-loss curve.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulation once per energy point and collect the result table.
    Run(RunArgs),
    /// Print the macro that would be generated for a single energy.
    Render(RenderArgs),
    /// Analyze a result table: ionization minimum, regional statistics and curve export.
    Analyze(AnalyzeArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a sweep configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Simulation Overrides ---
    /// Path to the TestEm1 executable.
    #[arg(short, long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Macro template file. The built-in muon-in-copper template is used otherwise.
    #[arg(short, long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Token in the template that is replaced by the energy value.
    #[arg(long, value_name = "TOKEN")]
    pub placeholder: Option<String>,

    // --- Sweep Overrides ---
    /// Comma-separated list of energies in MeV, swept in the given order.
    #[arg(long, value_name = "LIST", value_delimiter = ',', num_args = 1..)]
    pub energies: Option<Vec<f64>>,

    /// Keep a copy of every rendered macro in this directory.
    #[arg(long, value_name = "DIR")]
    pub macro_dir: Option<PathBuf>,

    /// Stop the sweep at the first failed simulation run instead of flagging the row.
    #[arg(long)]
    pub abort_on_failure: bool,

    // --- Output Overrides ---
    /// Path of the result table (CSV).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S sweep.failure-policy=abort
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Energy in MeV to substitute into the template.
    #[arg(short, long, required = true, value_name = "MEV")]
    pub energy: f64,

    /// Macro template file. The built-in template is used otherwise.
    #[arg(short, long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Token in the template that is replaced by the energy value.
    #[arg(long, value_name = "TOKEN")]
    pub placeholder: Option<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Result table produced by `emsweep run`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the interpolated curve and theory values to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub curve_output: Option<PathBuf>,

    /// Energy window (MeV) searched for the ionization minimum, as MIN,MAX.
    #[arg(long, value_name = "MIN,MAX", value_delimiter = ',', num_args = 2)]
    pub minimum_window: Option<Vec<f64>>,

    /// Number of log-spaced points in the curve export.
    #[arg(long, value_name = "INT")]
    pub curve_points: Option<usize>,

    /// Write the Bethe-Bloch curve, sampled over its own energy range, to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub theory_output: Option<PathBuf>,

    /// Number of log-spaced points in the Bethe-Bloch curve.
    #[arg(long, value_name = "INT")]
    pub theory_points: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_comma_separated_energies() {
        let cli = Cli::parse_from(["emsweep", "run", "--energies", "1,2.5,1e3"]);
        let Commands::Run(args) = cli.command else {
            panic!("Expected 'run' subcommand");
        };
        assert_eq!(args.energies, Some(vec![1.0, 2.5, 1000.0]));
        assert!(!args.abort_on_failure);
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::parse_from(["emsweep", "analyze", "-i", "t.csv", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["emsweep", "-q", "-v", "render", "--energy", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn analyze_minimum_window_takes_two_values() {
        let cli = Cli::parse_from(["emsweep", "analyze", "-i", "t.csv", "--minimum-window", "50,800"]);
        let Commands::Analyze(args) = cli.command else {
            panic!("Expected 'analyze' subcommand");
        };
        assert_eq!(args.minimum_window, Some(vec![50.0, 800.0]));

        let single = Cli::try_parse_from(["emsweep", "analyze", "-i", "t.csv", "--minimum-window", "50"]);
        assert!(single.is_err());
    }

    #[test]
    fn render_requires_energy() {
        assert!(Cli::try_parse_from(["emsweep", "render"]).is_err());
    }
}
