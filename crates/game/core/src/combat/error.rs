use super::ScriptError;
use crate::action::LogError;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::formula::FormulaError;
use crate::state::{ItemId, Position, UnitId};

/// Errors raised while setting up or stepping a combat.
///
/// Setup problems (range, targets, usability) are rejected before any action
/// is recorded. Formula and log errors mid-combat are data bugs and propagate
/// unchanged to the caller of `step`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("{0} cannot fight")]
    AttackerDown(UnitId),

    #[error("{item} is not usable by {unit}")]
    ItemUnusable { unit: UnitId, item: ItemId },

    #[error("combat needs at least one target position")]
    NoTargets,

    #[error("{position} is outside range {min}..={max}")]
    OutOfRange {
        position: Position,
        min: u32,
        max: u32,
    },

    #[error("{position} is not a valid target")]
    InvalidTarget { position: Position },

    #[error("combat already finished")]
    AlreadyTerminal,

    #[error("combat has not finished yet")]
    NotTerminal,
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        use CombatError::*;
        match self {
            Oracle(e) => e.severity(),
            Formula(e) => e.severity(),
            Log(e) => e.severity(),
            Script(e) => e.severity(),
            ItemUnusable { .. } | OutOfRange { .. } | InvalidTarget { .. } => {
                ErrorSeverity::Recoverable
            }
            AttackerDown(_) | NoTargets => ErrorSeverity::Validation,
            AlreadyTerminal | NotTerminal => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use CombatError::*;
        match self {
            Oracle(e) => e.error_code(),
            Formula(e) => e.error_code(),
            Log(e) => e.error_code(),
            Script(e) => e.error_code(),
            AttackerDown(_) => "COMBAT_ATTACKER_DOWN",
            ItemUnusable { .. } => "COMBAT_ITEM_UNUSABLE",
            NoTargets => "COMBAT_NO_TARGETS",
            OutOfRange { .. } => "COMBAT_OUT_OF_RANGE",
            InvalidTarget { .. } => "COMBAT_INVALID_TARGET",
            AlreadyTerminal => "COMBAT_ALREADY_TERMINAL",
            NotTerminal => "COMBAT_NOT_TERMINAL",
        }
    }
}
