use tactics_core::{CombatError, ErrorSeverity, GameError, LogError};

use crate::repository::RepositoryError;

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Time travel and saving only happen between combats.
    #[error("a combat is in progress")]
    CombatInProgress,

    #[error("no combat in progress")]
    NoActiveCombat,
}

impl GameError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SessionError::Combat(e) => e.severity(),
            SessionError::Log(e) => e.severity(),
            SessionError::Repository(e) => e.severity(),
            SessionError::CombatInProgress | SessionError::NoActiveCombat => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::Combat(e) => e.error_code(),
            SessionError::Log(e) => e.error_code(),
            SessionError::Repository(e) => e.error_code(),
            SessionError::CombatInProgress => "SESSION_COMBAT_IN_PROGRESS",
            SessionError::NoActiveCombat => "SESSION_NO_ACTIVE_COMBAT",
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
