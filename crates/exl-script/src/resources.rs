use std::path::PathBuf;

use exl_core::errors::{ErrorInfo, LaunchError};
use exl_core::WallTime;
use serde::{Deserialize, Serialize};

/// Scheduling and resource requests shared by every script of a launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    /// Number of seeds, i.e. the size of the job array.
    #[serde(default = "ResourceSpec::default_n_seeds")]
    pub n_seeds: u32,
    #[serde(default = "ResourceSpec::default_cpus_per_task")]
    pub cpus_per_task: u32,
    /// Memory per node in gigabytes.
    #[serde(default = "ResourceSpec::default_memory_gb")]
    pub memory_gb: u32,
    #[serde(default)]
    pub walltime: WallTime,
    /// Generic resource request, e.g. `gpu:1`.
    #[serde(default = "ResourceSpec::default_gres")]
    pub gres: Option<String>,
    #[serde(default = "ResourceSpec::default_partition")]
    pub partition: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub reservation: Option<String>,
    /// Shell name or absolute path used as the script interpreter.
    #[serde(default = "ResourceSpec::default_shell")]
    pub shell: String,
    /// Conda environment activated before the program starts.
    #[serde(default)]
    pub conda_env: Option<String>,
    /// Startup delay in seconds per script index.
    #[serde(default)]
    pub stagger_seconds: Option<u64>,
}

impl ResourceSpec {
    const fn default_n_seeds() -> u32 {
        1
    }

    const fn default_cpus_per_task() -> u32 {
        4
    }

    const fn default_memory_gb() -> u32 {
        20
    }

    fn default_gres() -> Option<String> {
        Some("gpu:1".to_string())
    }

    fn default_partition() -> Option<String> {
        Some("short".to_string())
    }

    fn default_shell() -> String {
        "zsh".to_string()
    }

    /// Rejects requests the scheduler could not honour.
    pub fn validate(&self) -> Result<(), LaunchError> {
        if self.n_seeds < 1 {
            return Err(LaunchError::Configuration(
                ErrorInfo::new("resources.n_seeds", "seed count must be at least 1")
                    .with_context("n_seeds", self.n_seeds.to_string())
                    .with_hint("the job array would span 0 to -1"),
            ));
        }
        if self.cpus_per_task < 1 {
            return Err(LaunchError::Configuration(ErrorInfo::new(
                "resources.cpus_per_task",
                "cpus_per_task must be at least 1",
            )));
        }
        if self.memory_gb < 1 {
            return Err(LaunchError::Configuration(ErrorInfo::new(
                "resources.memory_gb",
                "memory_gb must be at least 1",
            )));
        }
        if self.walltime.is_zero() {
            return Err(LaunchError::Configuration(
                ErrorInfo::new("resources.walltime", "wall time must be positive")
                    .with_context("walltime", self.walltime.render()),
            ));
        }
        Ok(())
    }

    /// Bare shell name, used for re-invocation and the `~/.{shell}rc` convention.
    pub fn shell_name(&self) -> &str {
        self.shell
            .rsplit('/')
            .next()
            .unwrap_or(self.shell.as_str())
    }

    /// Startup delay for the script at `index`.
    pub fn stagger_delay(&self, index: Option<u32>) -> u64 {
        match (index, self.stagger_seconds) {
            (Some(index), Some(stagger)) => u64::from(index).saturating_mul(stagger),
            _ => 0,
        }
    }
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            n_seeds: Self::default_n_seeds(),
            cpus_per_task: Self::default_cpus_per_task(),
            memory_gb: Self::default_memory_gb(),
            walltime: WallTime::default(),
            gres: Self::default_gres(),
            partition: Self::default_partition(),
            account: None,
            reservation: None,
            shell: Self::default_shell(),
            conda_env: None,
            stagger_seconds: None,
        }
    }
}

/// Program started by each array task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Program {
    #[serde(default = "Program::default_interpreter")]
    pub interpreter: String,
    pub entry_point: PathBuf,
}

impl Program {
    pub fn new(interpreter: impl Into<String>, entry_point: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            entry_point: entry_point.into(),
        }
    }

    fn default_interpreter() -> String {
        "python".to_string()
    }
}

/// Treats blank strings the same as unset options; set values pass through untouched.
pub(crate) fn configured(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_needs_index_and_interval() {
        let mut spec = ResourceSpec {
            stagger_seconds: Some(10),
            ..ResourceSpec::default()
        };
        assert_eq!(spec.stagger_delay(Some(2)), 20);
        assert_eq!(spec.stagger_delay(None), 0);
        spec.stagger_seconds = None;
        assert_eq!(spec.stagger_delay(Some(2)), 0);
    }

    #[test]
    fn shell_name_strips_directories() {
        let spec = ResourceSpec {
            shell: "/usr/bin/bash".into(),
            ..ResourceSpec::default()
        };
        assert_eq!(spec.shell_name(), "bash");
        assert_eq!(ResourceSpec::default().shell_name(), "zsh");
    }

    #[test]
    fn blank_options_count_as_unset() {
        assert_eq!(configured(&Some("  ".into())), None);
        assert_eq!(configured(&Some("a2i".into())), Some("a2i"));
        assert_eq!(configured(&None), None);
    }

    #[test]
    fn set_options_are_not_trimmed() {
        assert_eq!(configured(&Some(" resv ".into())), Some(" resv "));
    }
}
