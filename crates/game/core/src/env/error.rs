//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{ItemId, UnitId};

/// Errors that occur when the board or oracles cannot supply referenced data.
///
/// These are validation errors: a combat was set up (or replayed) against
/// references the board does not know.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// Item definition id unknown to the component oracle.
    #[error("item definition '{0}' not found")]
    DefinitionNotFound(String),

    #[error("skill '{0}' not found")]
    SkillNotFound(String),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            UnitNotFound(_) => "ORACLE_UNIT_NOT_FOUND",
            ItemNotFound(_) => "ORACLE_ITEM_NOT_FOUND",
            DefinitionNotFound(_) => "ORACLE_DEFINITION_NOT_FOUND",
            SkillNotFound(_) => "ORACLE_SKILL_NOT_FOUND",
        }
    }
}
