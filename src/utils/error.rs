//! Error types for the beacon crate.

use thiserror::Error;

/// Crate-wide error enumeration.
#[derive(Error, Debug)]
pub enum BeaconError {
    /// A caller supplied a bad argument, e.g. the reserved listener stub or
    /// a stub that collides with a live listener.
    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    /// The targeted event ID or listener stub is unknown to the manager.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A removal was issued while the manager is firing. The removal is
    /// queued and takes effect when the firing depth returns to zero.
    #[error("Operation pending until firing completes")]
    Pending,

    /// Registry configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON (de)serialization failure.
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// YAML (de)serialization failure.
    #[error("YAML serialization error: {0}")]
    YamlSerialization(#[from] serde_yaml::Error),

    /// Underlying IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, BeaconError>;
