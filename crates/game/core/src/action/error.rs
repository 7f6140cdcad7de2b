//! Action and action-log errors.

use crate::env::RngSnapshot;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ItemId, UnitId};

/// Errors raised when an action does not line up with the state it is applied
/// to. During normal play these indicate a bug; during replay they indicate a
/// log that does not belong to the loaded state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error("{unit} hp is {found}, expected {expected}")]
    HpMismatch {
        unit: UnitId,
        expected: u32,
        found: u32,
    },

    #[error("{item} uses are {found:?}, expected {expected:?}")]
    UsesMismatch {
        item: ItemId,
        expected: Option<u32>,
        found: Option<u32>,
    },

    #[error("combat stream is at {found:?}, expected {expected:?}")]
    StreamMismatch {
        expected: RngSnapshot,
        found: RngSnapshot,
    },

    /// (level, exp) pair did not match.
    #[error("{unit} progress is {found:?}, expected {expected:?}")]
    ProgressMismatch {
        unit: UnitId,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("{unit} {weapon_type} weapon exp is {found}, expected {expected}")]
    WeaponExpMismatch {
        unit: UnitId,
        weapon_type: String,
        expected: u32,
        found: u32,
    },

    #[error("{unit} already has status '{status}'")]
    StatusPresent { unit: UnitId, status: String },

    #[error("{unit} does not have status '{status}'")]
    StatusMissing { unit: UnitId, status: String },
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            UnitNotFound(_) | ItemNotFound(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            UnitNotFound(_) => "ACTION_UNIT_NOT_FOUND",
            ItemNotFound(_) => "ACTION_ITEM_NOT_FOUND",
            HpMismatch { .. } => "ACTION_HP_MISMATCH",
            UsesMismatch { .. } => "ACTION_USES_MISMATCH",
            StreamMismatch { .. } => "ACTION_STREAM_MISMATCH",
            ProgressMismatch { .. } => "ACTION_PROGRESS_MISMATCH",
            WeaponExpMismatch { .. } => "ACTION_WEAPON_EXP_MISMATCH",
            StatusPresent { .. } => "ACTION_STATUS_PRESENT",
            StatusMissing { .. } => "ACTION_STATUS_MISSING",
        }
    }
}

/// Identifies which direction of the action lifecycle produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    /// First-time application while combat runs.
    Perform,
    /// Re-application during forward replay.
    Execute,
    Reverse,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::Perform => "perform",
            TransitionPhase::Execute => "execute",
            TransitionPhase::Reverse => "reverse",
        }
    }
}

/// Errors surfaced by [`super::ActionLog`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("action #{index} ({action}) failed during {phase}: {source}")]
    Transition {
        index: usize,
        action: &'static str,
        phase: TransitionPhase,
        #[source]
        source: ActionError,
    },

    #[error("unsupported action log version {found} (expected {expected})")]
    Version { expected: u32, found: u32 },

    #[error("action log is inconsistent: {0}")]
    Corrupt(&'static str),
}

impl GameError for LogError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            LogError::Transition { source, .. } => source.severity(),
            LogError::Version { .. } => ErrorSeverity::Validation,
            LogError::Corrupt(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            LogError::Transition { source, .. } => source.error_code(),
            LogError::Version { .. } => "LOG_VERSION",
            LogError::Corrupt(_) => "LOG_CORRUPT",
        }
    }
}
