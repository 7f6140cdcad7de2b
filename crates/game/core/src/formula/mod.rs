//! Layered numeric formula engine.
//!
//! Every combat number is built by the same pipeline. The order fixes the
//! integer truncation points, so it must not be rearranged:
//!
//! 1. item base value (exclusive hook; absence means "cannot do this")
//! 2. + configured equation over live stats
//! 3. + weapon-rank bonus, + summed `Modify` contributions
//! 4. + support bonuses of nearby bonded allies (fractional)
//! 5. truncate
//! 6. + weapon triangle, both directions, scaled by the triangle modifier
//! 7. - the opposing side's defensive value (steps 1-6 for the other unit)
//! 8. + summed `Dynamic` contributions of the acting unit
//! 9. clamp hit/crit to `[0, 100]`, floor damage at the configured minimum
mod engine;
mod equation;

pub use engine::FormulaEngine;

use crate::aggregate::{Hook, HookContext};
use crate::error::{ErrorSeverity, GameError};
use crate::expr::ExprError;

/// Side a formula is evaluated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombatMode {
    Attack,
    Defense,
    Splash,
}

impl CombatMode {
    /// Mode of the unit on the receiving end.
    pub const fn opposing(self) -> Self {
        match self {
            CombatMode::Attack | CombatMode::Splash => CombatMode::Defense,
            CombatMode::Defense => CombatMode::Attack,
        }
    }
}

/// Formula categories; also the keys of bonus tables and `Modify`/`Dynamic` hooks.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FormulaStat {
    Accuracy,
    Avoid,
    CritAccuracy,
    CritAvoid,
    Damage,
    Defense,
    AttackSpeed,
    DefenseSpeed,
}

impl FormulaStat {
    /// Exclusive item hook supplying the base value. Stats without one start
    /// at zero and apply even without an item.
    pub const fn base_hook(self) -> Option<Hook> {
        match self {
            FormulaStat::Accuracy => Some(Hook::BaseHit),
            FormulaStat::CritAccuracy => Some(Hook::BaseCrit),
            FormulaStat::Damage => Some(Hook::BaseDamage),
            _ => None,
        }
    }

    /// Defensive stat the opposing unit subtracts from this one.
    pub const fn counterpart(self) -> Option<FormulaStat> {
        match self {
            FormulaStat::Accuracy => Some(FormulaStat::Avoid),
            FormulaStat::CritAccuracy => Some(FormulaStat::CritAvoid),
            FormulaStat::Damage => Some(FormulaStat::Defense),
            FormulaStat::AttackSpeed => Some(FormulaStat::DefenseSpeed),
            _ => None,
        }
    }
}

/// Equation slots an item or skill may retarget with `Hook::Equation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EquationSlot {
    Hit,
    Avoid,
    Crit,
    CritAvoid,
    Damage,
    Defense,
    AttackSpeed,
    DefenseSpeed,
    Heal,
}

impl EquationSlot {
    /// Rule-table equation used when nothing overrides the slot.
    pub const fn default_name(self) -> &'static str {
        match self {
            EquationSlot::Hit => "HIT",
            EquationSlot::Avoid => "AVOID",
            EquationSlot::Crit => "CRIT_HIT",
            EquationSlot::CritAvoid => "CRIT_AVOID",
            EquationSlot::Damage => "DAMAGE",
            EquationSlot::Defense => "DEFENSE",
            EquationSlot::AttackSpeed => "ATTACK_SPEED",
            EquationSlot::DefenseSpeed => "DEFENSE_SPEED",
            EquationSlot::Heal => "HEAL",
        }
    }

    pub const fn for_stat(stat: FormulaStat) -> Self {
        match stat {
            FormulaStat::Accuracy => EquationSlot::Hit,
            FormulaStat::Avoid => EquationSlot::Avoid,
            FormulaStat::CritAccuracy => EquationSlot::Crit,
            FormulaStat::CritAvoid => EquationSlot::CritAvoid,
            FormulaStat::Damage => EquationSlot::Damage,
            FormulaStat::Defense => EquationSlot::Defense,
            FormulaStat::AttackSpeed => EquationSlot::AttackSpeed,
            FormulaStat::DefenseSpeed => EquationSlot::DefenseSpeed,
        }
    }
}

/// (unit, item, target, defending item, mode) tuple every formula takes.
///
/// The same value doubles as the context components are probed with.
pub type FormulaInputs<'a> = HookContext<'a>;

/// Errors in the formula pipeline itself. These are data bugs and propagate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("unknown equation `{0}`")]
    UnknownEquation(String),

    #[error("equation `{equation}` failed: {source}")]
    Equation {
        equation: String,
        #[source]
        source: ExprError,
    },
}

impl GameError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            FormulaError::UnknownEquation(_) => "FORMULA_UNKNOWN_EQUATION",
            FormulaError::Equation { .. } => "FORMULA_EQUATION_FAILED",
        }
    }
}
