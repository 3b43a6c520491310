//! Error types shared across the cart crate.
//!
//! Most cart operations degrade to an empty cart or a no-op instead of
//! failing; these errors cover the few places where a caller can still
//! observe a failure (writing the store, reading configuration).

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading from or writing to a [`KeyValueStore`](crate::store::KeyValueStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure decoding a persisted cart payload.
///
/// [`CartStore::load`](crate::store::CartStore::load) never returns this; it
/// logs it and falls back to an empty cart.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cart payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cart payload must be a JSON array")]
    NotAnArray,
}

/// Failure loading a [`CartConfig`](crate::config::CartConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
