//! Error types raised at the crate's collaborator boundaries.

use thiserror::Error;

/// Errors surfaced by high-score stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted high score record: {0:?}")]
    Corrupted(String),

    #[error("no data directory available on this platform")]
    NoDataDir,
}

/// Errors surfaced by coaching providers. Never escape `coach::request_feedback`.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("coach endpoint answered with status {0}")]
    Status(u16),

    #[error("malformed coach response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("coach did not answer within {0} ms")]
    Timeout(u64),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
