//! Hand-off of written scripts to the scheduler.

use std::path::Path;
use std::process::Command;

use exl_core::errors::{ErrorInfo, LaunchError};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Submission {
    /// Scheduler job id, when the command reported one.
    pub job_id: Option<String>,
    pub stdout: String,
}

/// Submits a script path to the batch scheduler.
pub trait Submitter {
    /// Command line that [`Submitter::submit`] runs, shown in dry runs.
    fn command_line(&self, script: &Path) -> String;

    fn submit(&self, script: &Path) -> Result<Submission, LaunchError>;
}

/// Runs `{program} {script}`, `sbatch` by default.
#[derive(Debug, Clone)]
pub struct CommandSubmitter {
    program: String,
}

impl CommandSubmitter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandSubmitter {
    fn default() -> Self {
        Self::new("sbatch")
    }
}

impl Submitter for CommandSubmitter {
    fn command_line(&self, script: &Path) -> String {
        format!("{} {}", self.program, script.display())
    }

    fn submit(&self, script: &Path) -> Result<Submission, LaunchError> {
        let output = Command::new(&self.program)
            .arg(script)
            .output()
            .map_err(|err| {
                LaunchError::Submission(
                    ErrorInfo::new("submit.spawn", format!("failed to run `{}`", self.program))
                        .with_context("script", script.display().to_string())
                        .with_hint(err.to_string()),
                )
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(LaunchError::Submission(
                ErrorInfo::new(
                    "submit.exit",
                    format!("`{}` exited with {}", self.program, output.status),
                )
                .with_context("script", script.display().to_string())
                .with_hint(stderr),
            ));
        }
        Ok(Submission {
            job_id: parse_job_id(&stdout),
            stdout,
        })
    }
}

/// Extracts `N` from Slurm's `Submitted batch job N` acknowledgement.
pub fn parse_job_id(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        line.trim()
            .strip_prefix("Submitted batch job ")
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
    })
}
