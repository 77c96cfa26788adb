use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use emsweep::engine::config::AnalysisConfig;
use emsweep::engine::error::EngineError;
use emsweep::workflows;
use tracing::info;

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let config = analysis_config(&args)?;

    info!("Invoking the core analysis workflow...");
    let report = tokio::task::block_in_place(|| {
        workflows::analyze::run_from_path(&args.input, &config)
    })?;

    println!("{}", report);

    if let Some(path) = &args.curve_output {
        report
            .write_curve_csv(path)
            .map_err(EngineError::from)?;
        println!(
            "✓ Curve data ({} points) written to: {}",
            report.curve.len(),
            path.display()
        );
    }

    if let Some(path) = &args.theory_output {
        report
            .write_theory_csv(path)
            .map_err(EngineError::from)?;
        println!(
            "✓ Bethe-Bloch curve ({} points) written to: {}",
            report.theory.len(),
            path.display()
        );
    }

    Ok(())
}

fn analysis_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::default();
    if let Some(window) = &args.minimum_window {
        match window.as_slice() {
            &[lo, hi] => config.minimum_window_mev = (lo, hi),
            _ => {
                return Err(CliError::Argument(
                    "--minimum-window expects exactly two values: MIN,MAX".to_string(),
                ));
            }
        }
    }
    if let Some(points) = args.curve_points {
        config.curve_points = points;
    }
    if let Some(points) = args.theory_points {
        config.theory_points = points;
    }
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(config)
}
