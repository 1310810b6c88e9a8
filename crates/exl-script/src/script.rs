use std::fs;
use std::path::{Path, PathBuf};

use exl_core::errors::LaunchError;
use exl_core::{to_command_line, ParameterSet};
use tracing::debug;

use crate::resources::{Program, ResourceSpec};
use crate::sections::{RenderContext, SECTIONS};
use crate::shell::ShellResolver;

/// File name for an experiment's script: `slurm_{experiment}[_{index}].sh`.
pub fn script_file_name(experiment: &str, index: Option<u32>) -> String {
    match index {
        Some(index) => format!("slurm_{experiment}_{index}.sh"),
        None => format!("slurm_{experiment}.sh"),
    }
}

/// Assembles a submission script from its ordered sections.
#[derive(Debug, Clone)]
pub struct ScriptBuilder<'a> {
    resources: &'a ResourceSpec,
    program: &'a Program,
    command_line: String,
    index: Option<u32>,
    logs_dir: PathBuf,
}

impl<'a> ScriptBuilder<'a> {
    pub fn new(resources: &'a ResourceSpec, program: &'a Program) -> Self {
        Self {
            resources,
            program,
            command_line: String::new(),
            index: None,
            logs_dir: PathBuf::from("."),
        }
    }

    /// Uses an already serialized argument string.
    pub fn command_line(mut self, command_line: impl Into<String>) -> Self {
        self.command_line = command_line.into();
        self
    }

    /// Serializes `params` as the experiment arguments.
    pub fn params(self, params: &ParameterSet) -> Self {
        self.command_line(to_command_line(params))
    }

    /// Script index driving the stagger delay.
    pub fn index(mut self, index: Option<u32>) -> Self {
        self.index = index;
        self
    }

    pub fn logs_dir(mut self, logs_dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = logs_dir.into();
        self
    }

    /// Renders the script text.
    ///
    /// Resources are validated and the shell resolved before any text is
    /// produced, so a failure here never leaves a partial script behind.
    pub fn render(&self, resolver: &dyn ShellResolver) -> Result<String, LaunchError> {
        self.resources.validate()?;
        let shell_path = resolver.resolve(&self.resources.shell)?;
        let ctx = RenderContext {
            resources: self.resources,
            program: self.program,
            shell_path: &shell_path,
            logs_dir: &self.logs_dir,
            command_line: &self.command_line,
            index: self.index,
        };
        let mut text = String::new();
        for &(name, section) in SECTIONS {
            match section(&ctx) {
                Some(block) => text.push_str(&block),
                None => debug!(section = name, "section omitted"),
            }
        }
        Ok(text)
    }
}

/// Rendered script paired with its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionScript {
    pub path: PathBuf,
    pub text: String,
}

impl SubmissionScript {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Writes the script, creating its parent directory when missing.
    pub fn write(&self) -> Result<&Path, LaunchError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| LaunchError::io("script.create_dir", parent, err))?;
        }
        fs::write(&self.path, self.text.as_bytes())
            .map_err(|err| LaunchError::io("script.write", &self.path, err))?;
        Ok(&self.path)
    }
}
