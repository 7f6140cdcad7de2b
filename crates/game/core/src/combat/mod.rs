//! Combat resolution.
//!
//! A combat is set up from a [`CombatSetup`], then driven by repeated calls to
//! [`CombatPhaseSolver::step`] until the solver reaches
//! [`SolverState::Terminal`]. Outcomes depend only on the starting state, the
//! combat stream position and the script, so stepping with or without
//! animation pacing produces the same actions and playback.
//!
//! # Module Structure
//!
//! - `setup`: target resolution, splash and counter eligibility
//! - `solver`: the phase state machine and per-exchange resolution
//! - `script`: scripted-outcome directives
//! - `playback`: immutable combat history
//! - `records`: per-unit statistics and experience
mod error;
pub mod playback;
pub mod records;
pub mod script;
pub mod setup;
pub mod solver;

pub use error::CombatError;
pub use playback::{PlaybackEntry, PlaybackKind};
pub use records::{CombatRecords, UnitRecord};
pub use script::{Outcome, ScriptDirective, ScriptError, ScriptQueue};
pub use setup::{CombatSetup, Engagement, ResolvedSetup};
pub use solver::{CombatPhaseSolver, SolverState, StepOutput};

/// Participant role within one combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Attacker,
    Defender,
}
