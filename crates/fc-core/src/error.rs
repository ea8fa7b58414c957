//! Error types for fc-core

use thiserror::Error;

/// Core error type for framecheck
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Program path not found
    #[error("[E003] Path not found: {path}")]
    PathNotFound { path: String },

    /// E004: Program document could not be parsed
    #[error("[E004] Failed to parse program {path}: {message}")]
    ProgramParse { path: String, message: String },

    /// E005: Two functions with the same name in one document
    #[error("[E005] Duplicate function name: {name}")]
    DuplicateFunction { name: String },

    /// E006: Function or parameter with an empty name
    #[error("[E006] Empty name in {context}")]
    EmptyName { context: String },

    /// E007: Duplicate parameter within one function
    #[error("[E007] Duplicate parameter '{param}' in function '{function}'")]
    DuplicateParameter { function: String, param: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
