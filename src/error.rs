//! Error types for the Arelia session core

use thiserror::Error;

/// Result type alias for Arelia operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the session core
///
/// Nothing here is fatal: every failure path returns the session to a
/// stable idle state with the user-facing affordances re-enabled.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport error (request rejected, bad status, network failure)
    #[error("transport error: {0}")]
    Transport(String),

    /// Wire protocol error (response body does not match the contract)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Speech recognition engine error
    #[error("recognition error: {0}")]
    Recognition(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
