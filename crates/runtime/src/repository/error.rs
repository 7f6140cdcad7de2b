//! Error types raised by repository implementations.

use tactics_core::{ErrorSeverity, GameError, LogError};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid save slot name '{0}'")]
    InvalidSlot(String),

    #[error("unsupported save version {found} (expected {expected})")]
    Version { expected: u32, found: u32 },

    #[error("checksum mismatch: recorded {recorded}, computed {computed}")]
    ChecksumMismatch { recorded: String, computed: String },

    #[error("saved action log rejected: {0}")]
    Log(#[from] LogError),
}

impl GameError for RepositoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RepositoryError::Io(_) => ErrorSeverity::Recoverable,
            RepositoryError::InvalidSlot(_) | RepositoryError::Version { .. } => {
                ErrorSeverity::Validation
            }
            RepositoryError::LockPoisoned => ErrorSeverity::Internal,
            RepositoryError::Json(_)
            | RepositoryError::ChecksumMismatch { .. }
            | RepositoryError::Log(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RepositoryError::LockPoisoned => "REPOSITORY_LOCK_POISONED",
            RepositoryError::Io(_) => "REPOSITORY_IO",
            RepositoryError::Json(_) => "REPOSITORY_JSON",
            RepositoryError::InvalidSlot(_) => "REPOSITORY_INVALID_SLOT",
            RepositoryError::Version { .. } => "REPOSITORY_VERSION",
            RepositoryError::ChecksumMismatch { .. } => "REPOSITORY_CHECKSUM",
            RepositoryError::Log(e) => e.error_code(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
