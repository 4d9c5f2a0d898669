use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the agenda
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(ecran_agenda::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ecran_agenda::config))]
    Config(String),

    #[error("Feed fetch error: {0}")]
    #[diagnostic(code(ecran_agenda::fetch))]
    Fetch(String),

    #[error("Feed cache error: {0}")]
    #[diagnostic(code(ecran_agenda::cache))]
    Cache(String),

    #[error(transparent)]
    #[diagnostic(code(ecran_agenda::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(ecran_agenda::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(ecran_agenda::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Cache(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AgendaResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create cache errors
pub fn cache_error(message: &str) -> Error {
    Error::Cache(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
