use crate::cli::RunArgs;
use crate::config::PartialSweepConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use emsweep::{
    engine::{progress::ProgressReporter, runner::ProcessRunner},
    workflows,
};
use tracing::{debug, info, warn};

pub async fn run(args: RunArgs) -> Result<()> {
    let partial_config = PartialSweepConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_cli(&args)?;

    let runner = ProcessRunner::new(&final_config.simulation.executable);
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting energy sweep: {} point(s) with {}",
        final_config.sweep.energies.len(),
        final_config.simulation.executable.display()
    );
    info!("Invoking the core sweep workflow...");

    let summary = tokio::task::block_in_place(|| {
        workflows::sweep::run(&final_config, &runner, &reporter)
    })?;

    for line in progress_handler.status_lines() {
        debug!(status = %line.trim(), "Sweep point.");
    }

    if summary.failed_runs > 0 {
        warn!("{} simulation run(s) failed.", summary.failed_runs);
        println!(
            "Warning: {} of {} run(s) failed; their rows are flagged with 'error'.",
            summary.failed_runs, summary.rows_written
        );
    }
    println!(
        "✓ {} row(s) written to {} ({} with a scraped loss value).",
        summary.rows_written,
        summary.table_path.display(),
        summary.rows_with_loss_values
    );

    Ok(())
}
