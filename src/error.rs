//! Errors from the on-disk stores (settings, high scores)
//!
//! The engine itself never fails; only the persistence boundary does, and
//! callers there log and carry on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine a config directory")]
    NoDirectory,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid toml: {0}")]
    TomlRead(#[from] toml::de::Error),
    #[error("could not write toml: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}
