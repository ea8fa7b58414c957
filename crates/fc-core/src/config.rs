//! Configuration types and parsing for framecheck.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names searched in a project directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["framecheck.yml", "framecheck.yaml"];

/// Project configuration from framecheck.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directories or files containing program documents
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,

    /// File extensions treated as program documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Treat advisories (e.g. missing aggregation aliases) as failures
    #[serde(default)]
    pub strict: bool,

    /// Report inferred schemas of returns that have no declaration
    #[serde(default = "default_true")]
    pub report_inferred: bool,
}

fn default_paths() -> Vec<String> {
    vec!["pipelines".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec!["yml".to_string(), "yaml".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "framecheck".to_string(),
            paths: default_paths(),
            extensions: default_extensions(),
            strict: false,
            report_inferred: true,
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for framecheck.yml or framecheck.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one paths entry must be specified".to_string(),
            });
        }

        if self.extensions.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one extensions entry must be specified".to_string(),
            });
        }

        if let Some(ext) = self.extensions.iter().find(|e| e.starts_with('.')) {
            return Err(CoreError::ConfigInvalid {
                message: format!("Extension '{}' must not start with '.'", ext),
            });
        }

        Ok(())
    }

    /// Configured paths resolved against the project root
    pub fn paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.paths.iter().map(|p| root.join(p)).collect()
    }

    /// Whether a file has one of the configured extensions
    pub fn is_program_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
