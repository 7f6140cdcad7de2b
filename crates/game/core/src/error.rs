//! Shared error classification for tactics-core.
//!
//! Each subsystem keeps its own `thiserror` enum next to the code that raises
//! it (`ActionError`, `FormulaError`, `CombatError`, ...). They all implement
//! [`GameError`] so callers can decide how to react without matching on every
//! variant.
//!
//! Formula and transition errors surface to whoever called `step()`. Only
//! designer-authored conditions are swallowed, inside `aggregate`.

/// How the caller should treat an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The request was fine in shape but not now: a target out of range, a
    /// broken item, a combat already running.
    Recoverable,

    /// The input is wrong and retrying it unchanged will fail again: unknown
    /// units, unknown script tokens, bad condition text.
    Validation,

    /// Something the core assumed did not hold, e.g. replaying an action
    /// against a state it was not recorded on. Indicates a bug.
    Internal,

    /// Combat data is unusable: recursive equations, inconsistent logs,
    /// tampered saves.
    Fatal,
}

impl ErrorSeverity {
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// True for errors that point at a bug or corrupt data rather than at
    /// the request.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Implemented by every error enum in the workspace.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for logs and tooling, e.g. `COMBAT_OUT_OF_RANGE`.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Internal.to_string(), "internal");
    }
}
