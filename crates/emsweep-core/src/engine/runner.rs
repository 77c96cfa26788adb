use super::error::EngineError;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, instrument};

/// How one simulation invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Non-zero exit or termination by a signal, with a readable cause.
    Failed(String),
}

impl RunStatus {
    pub fn failure(&self) -> Option<&str> {
        match self {
            RunStatus::Success => None,
            RunStatus::Failed(cause) => Some(cause),
        }
    }
}

/// Captured console text of one invocation and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub text: String,
    pub status: RunStatus,
}

/// Runs the external simulation for one rendered macro.
///
/// Implementations block until the simulation has terminated. An `Err` means
/// the simulation could not be started at all and aborts the sweep; a run
/// that started and then failed is reported through [`RunStatus::Failed`].
pub trait SimulationRunner {
    fn run(&self, macro_path: &Path) -> Result<RunOutput, EngineError>;
}

/// Invokes `<executable> <macro-path>` as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    executable: PathBuf,
}

impl ProcessRunner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl SimulationRunner for ProcessRunner {
    #[instrument(skip_all, fields(macro_path = %macro_path.display()))]
    fn run(&self, macro_path: &Path) -> Result<RunOutput, EngineError> {
        debug!("Launching {:?}", &self.executable);
        let output = Command::new(&self.executable)
            .arg(macro_path)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => EngineError::ExecutableNotFound {
                    path: self.executable.clone(),
                },
                _ => EngineError::Spawn {
                    path: self.executable.clone(),
                    source: e,
                },
            })?;

        // stdout first, then stderr: the scraper treats both as one blob.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        let status = if output.status.success() {
            RunStatus::Success
        } else {
            RunStatus::Failed(output.status.to_string())
        };
        debug!(
            bytes = text.len(),
            status = ?status,
            "Simulation process finished."
        );

        Ok(RunOutput { text, status })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    // The shell interprets the "macro" file, which stands in for TestEm1.
    fn shell_macro(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn captures_stdout_and_stderr_and_passes_macro_path() {
        let dir = tempdir().unwrap();
        let macro_path = shell_macro(
            &dir,
            "run.mac",
            "echo \"macro=$0\"\necho 'Total energy deposit: 1 MeV' 1>&2\n",
        );

        let output = ProcessRunner::new("/bin/sh").run(&macro_path).unwrap();

        assert_eq!(output.status, RunStatus::Success);
        assert!(output.text.contains(&format!("macro={}", macro_path.display())));
        assert!(output.text.contains("Total energy deposit: 1 MeV"));
    }

    #[test]
    fn non_zero_exit_is_reported_as_failed_run() {
        let dir = tempdir().unwrap();
        let macro_path = shell_macro(&dir, "fail.mac", "echo partial\nexit 3\n");

        let output = ProcessRunner::new("/bin/sh").run(&macro_path).unwrap();

        assert_eq!(output.text.trim(), "partial");
        let cause = output.status.failure().unwrap();
        assert!(cause.contains('3'), "unexpected cause: {cause}");
    }

    #[test]
    fn killed_process_is_reported_as_failed_run() {
        let dir = tempdir().unwrap();
        let macro_path = shell_macro(&dir, "crash.mac", "kill -9 $$\n");

        let output = ProcessRunner::new("/bin/sh").run(&macro_path).unwrap();

        assert!(output.text.is_empty());
        assert!(output.status.failure().is_some());
    }

    #[test]
    fn missing_executable_is_fatal() {
        let dir = tempdir().unwrap();
        let result = ProcessRunner::new(dir.path().join("no-such-binary")).run(Path::new("x.mac"));
        assert!(matches!(result, Err(EngineError::ExecutableNotFound { .. })));
    }
}
