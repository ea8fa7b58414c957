//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use fc_core::{Config, CoreError};
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: main.rs turns this into the process exit status and
        // nothing should reach stderr from it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit status for usage and configuration errors
pub(crate) const USAGE_ERROR: i32 = 2;

/// Load the project configuration.
///
/// An explicit `--config` must exist. Without one, the project directory
/// is searched; a missing config falls back to defaults only when the
/// caller was given explicit paths to check.
pub(crate) fn load_config(global: &GlobalArgs, has_explicit_paths: bool) -> Result<Config> {
    if let Some(path) = &global.config {
        return Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config '{}'", path));
    }

    let project_dir = Path::new(&global.project_dir);
    match Config::load_from_dir(project_dir) {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigNotFound { path }) if has_explicit_paths => {
            if global.verbose {
                eprintln!("[verbose] No config at {}, using defaults", path);
            }
            Ok(Config::default())
        }
        Err(err) => Err(err).context("Failed to load project config"),
    }
}

/// Print an error and convert it into a usage exit code
pub(crate) fn usage_error(err: anyhow::Error) -> anyhow::Error {
    eprintln!("Error: {:#}", err);
    ExitCode(USAGE_ERROR).into()
}
