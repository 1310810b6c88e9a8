//! Structured error types shared across exlauncher crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`LaunchError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (experiment names, paths, seeds).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum LaunchError {
    /// Invalid resource or launcher configuration (seed count, wall time, ...).
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// The configured shell could not be resolved to an interpreter path.
    #[error("shell resolution error: {0}")]
    ShellResolution(ErrorInfo),
    /// A parameter value outside {scalar, sequence of scalars}.
    #[error("invalid parameter type: {0}")]
    InvalidParameterType(ErrorInfo),
    /// A failure raised by the experiment entry point during a local run.
    #[error("experiment invocation error: {0}")]
    ExperimentInvocation(ErrorInfo),
    /// The scheduler submission command failed.
    #[error("submission error: {0}")]
    Submission(ErrorInfo),
    /// Filesystem failures while writing scripts or manifests.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl LaunchError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            LaunchError::Configuration(info)
            | LaunchError::ShellResolution(info)
            | LaunchError::InvalidParameterType(info)
            | LaunchError::ExperimentInvocation(info)
            | LaunchError::Submission(info)
            | LaunchError::Io(info)
            | LaunchError::Serde(info) => info,
        }
    }

    /// Whether the error is isolated to a single local invocation.
    ///
    /// Every other family aborts the current run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LaunchError::ExperimentInvocation(_))
    }

    /// Wraps an [`std::io::Error`] with a stable code and the offending path.
    pub fn io(code: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        LaunchError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}
