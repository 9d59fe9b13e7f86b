//! Common error types for Reels2Vec

use thiserror::Error;

/// Common result type for Reels2Vec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while bootstrapping the service
#[derive(Error, Debug)]
pub enum Error {
    /// TOML configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
