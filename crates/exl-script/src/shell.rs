//! Resolution of the configured shell to an absolute interpreter path.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use exl_core::errors::{ErrorInfo, LaunchError};

/// Maps a shell name to the absolute path written into the `#!` line.
pub trait ShellResolver {
    fn resolve(&self, shell: &str) -> Result<PathBuf, LaunchError>;
}

impl<F> ShellResolver for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn resolve(&self, shell: &str) -> Result<PathBuf, LaunchError> {
        let path = self(shell).ok_or_else(|| not_found(shell))?;
        ensure_absolute(shell, path)
    }
}

/// Looks shells up on a `PATH`-style search list.
#[derive(Debug, Clone, Default)]
pub struct PathLookup {
    search: Option<OsString>,
}

impl PathLookup {
    /// Searches the process `PATH`.
    pub fn from_env() -> Self {
        Self {
            search: env::var_os("PATH"),
        }
    }

    /// Searches an explicit list of directories.
    pub fn with_search_path(search: impl Into<OsString>) -> Self {
        Self {
            search: Some(search.into()),
        }
    }
}

impl ShellResolver for PathLookup {
    fn resolve(&self, shell: &str) -> Result<PathBuf, LaunchError> {
        let shell = shell.trim();
        if shell.is_empty() {
            return Err(LaunchError::ShellResolution(
                ErrorInfo::new("shell.empty", "no shell configured")
                    .with_hint("set resources.shell, e.g. `zsh` or `/bin/bash`"),
            ));
        }
        if shell.contains('/') {
            let path = Path::new(shell);
            if is_executable(path) {
                return ensure_absolute(shell, path.to_path_buf());
            }
            return Err(not_found(shell));
        }
        let search = self.search.as_ref().ok_or_else(|| {
            LaunchError::ShellResolution(
                ErrorInfo::new("shell.no_search_path", "PATH is not set")
                    .with_context("shell", shell),
            )
        })?;
        env::split_paths(search)
            .map(|dir| dir.join(shell))
            .find(|candidate| is_executable(candidate))
            .ok_or_else(|| not_found(shell))
            .and_then(|path| ensure_absolute(shell, path))
    }
}

fn ensure_absolute(shell: &str, path: PathBuf) -> Result<PathBuf, LaunchError> {
    if path.is_absolute() {
        return Ok(path);
    }
    path.canonicalize().map_err(|err| {
        LaunchError::ShellResolution(
            ErrorInfo::new("shell.relative", "shell path is not absolute")
                .with_context("shell", shell)
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}

fn not_found(shell: &str) -> LaunchError {
    LaunchError::ShellResolution(
        ErrorInfo::new("shell.not_found", format!("shell `{shell}` not found"))
            .with_context("shell", shell)
            .with_hint("install the shell or point resources.shell at an absolute path"),
    )
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
