//! Deterministic combat resolution for grid tactics.
//!
//! `tactics-core` owns the rules of a single engagement: how items and skills
//! contribute to a formula ([`aggregate`]), how the formulas themselves are
//! computed ([`formula`]), and how one combat steps through its phases
//! ([`combat`]). Every change the solver makes to [`CombatState`] goes through
//! a reversible [`Action`] recorded in an [`ActionLog`], which is what makes
//! undo, replay and save files possible.
//!
//! Content (item definitions, equation tables) reaches the core only through
//! the oracles in [`env`], so the rules stay independent of any data format.
pub mod action;
pub mod aggregate;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod expr;
pub mod formula;
pub mod state;

#[cfg(test)]
mod testing;

pub use action::{
    Action, ActionError, ActionLog, ActionTransition, LogError, TransitionPhase,
};
pub use aggregate::{
    Aggregation, Aggregator, Component, ComponentOracle, Hook, HookContext, HookValue, Layers,
};
pub use combat::{
    CombatError, CombatPhaseSolver, CombatRecords, CombatSetup, Outcome, PlaybackEntry,
    PlaybackKind, ScriptDirective, Side, SolverState, StepOutput, UnitRecord,
};
pub use config::{CombatConfig, RngMode};
pub use env::{
    CombatEnv, OracleError, PcgStream, RandomStream, RngSnapshot, StaticTables, TablesOracle,
};
pub use error::{ErrorSeverity, GameError};
pub use expr::{Expr, ExprError, Value};
pub use formula::{CombatMode, EquationSlot, FormulaEngine, FormulaError, FormulaStat};
pub use state::{
    BoardQuery, CombatState, ItemId, ItemState, Position, Stat, SupportPair, SupportRank, Team,
    UnitId, UnitState, UnitStats,
};
