use emsweep::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders the sweep bar on stderr and per-point status lines on stdout.
///
/// Status lines are printed above the bar and recorded, so the run command
/// can copy them into the log once the sweep ends.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(Self::spinner_style());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Status lines printed so far, in order.
    pub fn status_lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();
        let lines = self.lines.clone();

        Box::new(move |progress: Progress| {
            let Ok(bar) = pb.lock() else {
                warn!("Progress bar mutex was poisoned; dropping a progress event.");
                return;
            };

            match progress {
                Progress::PointComplete(report) => emit(&bar, &lines, report.to_string()),
                Progress::Message(msg) => emit(&bar, &lines, format!("  {}", msg)),
                Progress::PhaseStart { name } => {
                    bar.reset();
                    bar.set_length(0);
                    bar.set_style(Self::spinner_style());
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    bar.set_message(name);
                }
                Progress::TaskStart { total_steps } => {
                    bar.disable_steady_tick();
                    bar.reset();
                    bar.set_length(total_steps);
                    bar.set_style(Self::bar_style());
                }
                Progress::TaskIncrement => bar.inc(1),
                Progress::TaskFinish => bar.finish(),
                Progress::PhaseFinish => {
                    bar.disable_steady_tick();
                    bar.finish_with_message("✓ Done");
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<14} [{bar:40.cyan/blue}] {pos}/{len} points ({eta})")
            .expect("Failed to create bar style template")
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.0}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("=>-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

// `pb.println` is a no-op while the bar is hidden, so print around it instead.
fn emit(bar: &ProgressBar, lines: &Mutex<Vec<String>>, line: String) {
    bar.suspend(|| println!("{}", line));
    if let Ok(mut lines) = lines.lock() {
        lines.push(line);
    }
}
