//! Error types for ovc-core

use thiserror::Error;

/// Why a line typed at the shell prompt was not accepted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid action")]
    InvalidAction,

    #[error("Public port should be a number")]
    PublicPortNotNumber,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ovc_config::ConfigError),

    #[error(transparent)]
    Api(#[from] ovc_api::ApiError),

    #[error("Could not find item with filter {0}")]
    NoMatch(String),

    #[error("Nothing to select for: {0}")]
    NoItems(String),

    #[error("Selection cancelled")]
    Cancelled,

    #[error(transparent)]
    Input(#[from] InputError),

    /// Malformed arguments to a structured sub-command
    #[error("{0}")]
    Grammar(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
