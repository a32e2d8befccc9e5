//! Error types raised by the script loading layer.

use thiserror::Error;

/// Errors surfaced while fetching, validating, or compiling scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script not found: {0}")]
    NotFound(String),

    #[error("invalid script {id}: {reason}")]
    Invalid { id: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {id}: {reason}")]
    Parse { id: String, reason: String },

    #[error("script repository lock was poisoned")]
    LockPoisoned,

    #[error("script load task was dropped before completing")]
    TaskDropped,
}

pub type Result<T> = std::result::Result<T, ScriptError>;
