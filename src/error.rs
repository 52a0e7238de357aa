//! Error types for the pairing core

use thiserror::Error;

/// Result type alias for pairing core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the pairing core
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Device type not present in the registry
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    /// Discovery failed (network, timeout, or backend-reported error)
    #[error("scan error: {0}")]
    Scan(String),

    /// Pairing failed (rejected, timed out, or execution error)
    #[error("pairing error: {0}")]
    Pairing(String),

    /// HTTP error from the device backend
    #[error("backend error: {0}")]
    Backend(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
