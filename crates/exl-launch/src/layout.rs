use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use exl_core::errors::LaunchError;
use exl_script::script_file_name;

const SCRIPTS_DIR: &str = "slurm_files";
const LOGS_DIR: &str = "slurm_logs";
const MANIFEST: &str = "manifest.json";

/// On-disk layout of one launcher:
///
/// ```text
/// {log_dir}/{launcher}/manifest.json
/// {log_dir}/{launcher}/{experiment}/slurm_files/slurm_{experiment}_{index}.sh
/// {log_dir}/{launcher}/{experiment}/slurm_logs/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchLayout {
    root: PathBuf,
}

impl LaunchLayout {
    /// Anchors relative log directories at the current working directory.
    pub fn resolve(log_dir: &Path, launcher: &str) -> Result<Self, LaunchError> {
        let log_dir = if log_dir.is_absolute() {
            log_dir.to_path_buf()
        } else {
            let cwd = env::current_dir().map_err(|err| LaunchError::io("layout.cwd", log_dir, err))?;
            cwd.join(log_dir)
        };
        Ok(Self {
            root: log_dir.join(launcher),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn experiment_dir(&self, experiment: &str) -> PathBuf {
        self.root.join(experiment)
    }

    pub fn scripts_dir(&self, experiment: &str) -> PathBuf {
        self.experiment_dir(experiment).join(SCRIPTS_DIR)
    }

    pub fn logs_dir(&self, experiment: &str) -> PathBuf {
        self.experiment_dir(experiment).join(LOGS_DIR)
    }

    pub fn script_path(&self, experiment: &str, index: Option<u32>) -> PathBuf {
        self.scripts_dir(experiment)
            .join(script_file_name(experiment, index))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST)
    }

    /// Creates the launcher directory holding the manifest.
    pub fn ensure_root(&self) -> Result<(), LaunchError> {
        fs::create_dir_all(&self.root).map_err(|err| LaunchError::io("layout.create_dir", &self.root, err))
    }

    /// Creates the scripts and logs directories of an experiment.
    pub fn ensure(&self, experiment: &str) -> Result<(), LaunchError> {
        for dir in [self.scripts_dir(experiment), self.logs_dir(experiment)] {
            fs::create_dir_all(&dir).map_err(|err| LaunchError::io("layout.create_dir", &dir, err))?;
        }
        Ok(())
    }
}
