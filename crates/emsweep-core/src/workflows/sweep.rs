use crate::core::scrape::scrape;
use crate::core::table::{ResultTable, RunRecord};
use crate::core::template::{DEFAULT_PLACEHOLDER, MacroTemplate, TESTEM1_MUON_COPPER};
use crate::engine::config::{FailurePolicy, SweepConfig, TemplateSource};
use crate::engine::error::EngineError;
use crate::engine::progress::{PointReport, Progress, ProgressReporter};
use crate::engine::runner::SimulationRunner;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Outcome of a completed sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    pub table_path: PathBuf,
    pub rows_written: usize,
    /// Rows with at least one scraped (non-sentinel) loss value.
    pub rows_with_loss_values: usize,
    pub failed_runs: usize,
}

/// Runs the simulation once per configured energy, in order, and appends one
/// row per run to the result table.
///
/// Each invocation finishes before the next macro is rendered. Template and
/// table problems, as well as an executable that cannot be launched, abort
/// the sweep. A run that starts but fails is flagged in its row and, under
/// [`FailurePolicy::Flag`], the sweep continues.
#[instrument(skip_all, name = "sweep_workflow")]
pub fn run(
    config: &SweepConfig,
    runner: &dyn SimulationRunner,
    reporter: &ProgressReporter,
) -> Result<SweepSummary, EngineError> {
    // === Phase 0: Load template and open table ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let template = load_template(config)?;
    info!(
        sites = template.placeholder_sites(),
        placeholder = template.placeholder(),
        "Macro template ready."
    );
    let mut table = ResultTable::create(&config.output.table_path)?;
    info!("Result table opened at {:?}", &config.output.table_path);
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Energy sweep ===
    let energies = &config.sweep.energies;
    let total = energies.len();
    reporter.report(Progress::PhaseStart {
        name: "Energy Sweep",
    });
    reporter.report(Progress::TaskStart {
        total_steps: total as u64,
    });
    info!("Starting sweep over {} energy point(s).", total);

    let mut rows_with_loss_values = 0;
    let mut failed_runs = 0;

    for (index, &energy) in energies.iter().enumerate() {
        let rendered = template.write_scoped(energy)?;
        if let Some(dir) = &config.sweep.macro_dir {
            let kept = rendered.keep_copy(dir, index)?;
            debug!("Kept rendered macro at {:?}", kept);
        }

        let output = runner.run(rendered.path())?;
        drop(rendered);

        let scraped = scrape(&output.text);
        let failure = output.status.failure();
        let record = RunRecord::assemble(energy, &scraped, failure);
        table.append(&record)?;

        if record.has_loss_value() {
            rows_with_loss_values += 1;
        }
        reporter.report(Progress::PointComplete(PointReport::new(
            index, total, &record,
        )));

        if energy.mev() > config.sweep.radiative_echo_threshold_mev {
            for line in &scraped.radiative_excerpt {
                reporter.report(Progress::Message(format!("radiative: {}", line)));
            }
        }

        if let Some(cause) = failure {
            failed_runs += 1;
            warn!(energy = %energy, cause, "Simulation run failed; row flagged.");
            if config.sweep.failure_policy == FailurePolicy::Abort {
                reporter.report(Progress::TaskFinish);
                reporter.report(Progress::PhaseFinish);
                return Err(EngineError::RunFailed {
                    energy: energy.to_string(),
                    cause: cause.to_string(),
                });
            }
        }

        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let summary = SweepSummary {
        table_path: config.output.table_path.clone(),
        rows_written: table.rows(),
        rows_with_loss_values,
        failed_runs,
    };
    reporter.report(Progress::Message(format!(
        "{} of {} row(s) contain a scraped loss value.",
        summary.rows_with_loss_values, summary.rows_written
    )));
    info!(
        rows = summary.rows_written,
        with_loss_values = summary.rows_with_loss_values,
        failed = summary.failed_runs,
        "Sweep complete."
    );
    Ok(summary)
}

fn load_template(config: &SweepConfig) -> Result<MacroTemplate, EngineError> {
    let placeholder = &config.simulation.placeholder;
    let template = match &config.simulation.template {
        TemplateSource::Builtin if placeholder == DEFAULT_PLACEHOLDER => MacroTemplate::builtin(),
        TemplateSource::Builtin => MacroTemplate::new(
            TESTEM1_MUON_COPPER.replace(DEFAULT_PLACEHOLDER, placeholder),
            placeholder.as_str(),
        )?,
        TemplateSource::File(path) => MacroTemplate::load(path, placeholder)?,
    };
    Ok(template)
}
