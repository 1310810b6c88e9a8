use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use exl_core::errors::LaunchError;
use exl_core::to_canonical_json_bytes;
use serde::{Deserialize, Serialize};

/// Where a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Invoke the experiment in this process, once per seed.
    Local,
    /// Write submission scripts and hand them to the scheduler.
    Cluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationStatus {
    Completed,
    Failed,
    /// Printed only (dry run).
    Planned,
}

/// One local call of the experiment entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub experiment: String,
    pub seed: u64,
    pub status: InvocationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LaunchError>,
}

/// One generated submission script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub experiment: String,
    pub index: u32,
    pub path: PathBuf,
    /// SHA-256 of the script text.
    pub sha256: String,
    pub command_line: String,
    pub submit_command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Summary of a single [`crate::Launcher::run`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub launcher: String,
    pub mode: RunMode,
    pub dry_run: bool,
    pub created_at: String,
    #[serde(default)]
    pub invocations: Vec<InvocationRecord>,
    #[serde(default)]
    pub scripts: Vec<ScriptRecord>,
}

impl RunReport {
    pub fn new(launcher: impl Into<String>, mode: RunMode, dry_run: bool) -> Self {
        Self {
            launcher: launcher.into(),
            mode,
            dry_run,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            invocations: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Local invocations that raised an error or panicked.
    pub fn failures(&self) -> impl Iterator<Item = &InvocationRecord> {
        self.invocations
            .iter()
            .filter(|record| record.status == InvocationStatus::Failed)
    }

    /// Persists the report as canonical JSON.
    pub fn write_manifest(&self, path: &Path) -> Result<(), LaunchError> {
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(path, bytes).map_err(|err| LaunchError::io("manifest.write", path, err))
    }
}
