//! Error types for Codelens

use thiserror::Error;

/// Main error type for Codelens operations
#[derive(Debug, Error)]
pub enum CodelensError {
    #[error("Unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scanning pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Analysis error: {message}")]
    Analysis { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

/// Result type alias for Codelens operations
pub type Result<T> = std::result::Result<T, CodelensError>;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {message}")]
    InvalidFormat { message: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Function not found: {name}")]
    FunctionNotFound { name: String },

    #[error("Workspace root is not a directory: {path}")]
    InvalidWorkspace { path: String },
}

impl From<ConfigError> for CodelensError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::FileNotFound { path } => CodelensError::NotFound { resource: path },
            other => CodelensError::Config {
                message: other.to_string(),
            },
        }
    }
}

impl From<AnalysisError> for CodelensError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::FunctionNotFound { name } => CodelensError::NotFound {
                resource: format!("function `{}`", name),
            },
            other => CodelensError::Analysis {
                message: other.to_string(),
            },
        }
    }
}

impl From<config::ConfigError> for CodelensError {
    fn from(error: config::ConfigError) -> Self {
        CodelensError::Config {
            message: error.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CodelensError {
    fn from(error: toml::ser::Error) -> Self {
        CodelensError::Config {
            message: error.to_string(),
        }
    }
}
