use std::fs;
use std::path::{Path, PathBuf};

use exl_core::errors::{ErrorInfo, LaunchError};
use exl_core::ParameterSet;
use exl_script::{Program, ResourceSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Launcher description loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchConfig {
    /// Launcher name, also the directory under `log_dir` holding its runs.
    pub name: String,
    pub log_dir: PathBuf,
    pub program: Program,
    #[serde(default)]
    pub resources: ResourceSpec,
    #[serde(default = "LaunchConfig::default_submit_command")]
    pub submit_command: String,
    /// Parameter sets keyed by experiment name, in file order.
    #[serde(default)]
    pub experiments: IndexMap<String, Option<IndexMap<String, Value>>>,
}

impl LaunchConfig {
    fn default_submit_command() -> String {
        "sbatch".to_string()
    }

    /// Converts the raw experiment tables into typed parameter sets.
    pub fn parameter_sets(&self) -> Result<Vec<(String, ParameterSet)>, LaunchError> {
        self.experiments
            .iter()
            .map(|(name, table)| {
                let params = match table {
                    Some(table) => ParameterSet::from_json_map(table.clone()).map_err(|err| {
                        match err {
                            LaunchError::InvalidParameterType(info) => {
                                LaunchError::InvalidParameterType(
                                    info.with_context("experiment", name.clone()),
                                )
                            }
                            other => other,
                        }
                    })?,
                    None => ParameterSet::new(),
                };
                Ok((name.clone(), params))
            })
            .collect()
    }
}

/// Reads and parses a [`LaunchConfig`] from a YAML file.
pub fn load_config(path: &Path) -> Result<LaunchConfig, LaunchError> {
    let text = fs::read_to_string(path).map_err(|err| LaunchError::io("config.read", path, err))?;
    serde_yaml::from_str(&text).map_err(|err| {
        LaunchError::Serde(
            ErrorInfo::new("config.parse", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

/// Names end up in directory and file names, so they must be single path components.
pub fn validate_name(kind: &str, name: &str) -> Result<(), LaunchError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| c == '/' || c == '\\' || c.is_whitespace());
    if invalid {
        return Err(LaunchError::Configuration(
            ErrorInfo::new(
                format!("{kind}.invalid_name"),
                format!("{kind} name `{name}` cannot be used as a file name"),
            )
            .with_context(kind, name)
            .with_hint("use a non-empty name without slashes or whitespace"),
        ));
    }
    Ok(())
}
