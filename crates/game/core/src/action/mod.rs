//! Reversible state changes.
//!
//! Combat never writes to [`CombatState`] directly. Every change is an
//! [`Action`] that carries both its old and new values, so it can be applied
//! for the first time ([`ActionTransition::perform`]), replayed during forward
//! time travel ([`ActionTransition::execute`]) and undone
//! ([`ActionTransition::reverse`]). [`ActionLog`] records actions in order and
//! moves a cursor across them.
//!
//! # Module Structure
//!
//! - `kinds`: concrete actions (hp, item uses, status, stream position, experience)
//! - `log`: ordered history with exchange marks
//! - `error`: action and log errors
pub mod error;
pub mod kinds;
pub mod log;

pub use error::{ActionError, LogError, TransitionPhase};
pub use kinds::{
    AddStatusAction, GainExpAction, GainWeaponExpAction, RandomStateAction, SetHpAction,
    SetItemUsesAction,
};
pub use log::ActionLog;

use crate::state::CombatState;

/// Defines how a concrete action moves the state forward and back.
///
/// Actions record absolute old and new values rather than deltas. Applying or
/// reversing an action against a state that does not hold the expected value
/// fails, which is how a mismatched log is detected.
pub trait ActionTransition {
    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &CombatState) -> Result<(), ActionError> {
        Ok(())
    }

    /// Writes the new value. Called only after `pre_validate` succeeded.
    fn apply(&self, state: &mut CombatState) -> Result<(), ActionError>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &CombatState) -> Result<(), ActionError> {
        Ok(())
    }

    /// Restores the old value. The state must currently hold the new one.
    fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError>;

    /// First-time application while combat resolves.
    fn perform(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.pre_validate(state)?;
        self.apply(state)?;
        self.post_validate(state)
    }

    /// Re-application after the action was reversed.
    fn execute(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.pre_validate(state)?;
        self.apply(state)?;
        self.post_validate(state)
    }
}

/// Every state change combat can produce.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "fields", rename_all = "snake_case")
)]
pub enum Action {
    SetHp(SetHpAction),
    SetItemUses(SetItemUsesAction),
    AddStatus(AddStatusAction),
    RandomState(RandomStateAction),
    GainExp(GainExpAction),
    GainWeaponExp(GainWeaponExpAction),
}

impl Action {
    /// Stable snake_case name used in logs and errors.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    fn transition(&self) -> &dyn ActionTransition {
        match self {
            Action::SetHp(action) => action,
            Action::SetItemUses(action) => action,
            Action::AddStatus(action) => action,
            Action::RandomState(action) => action,
            Action::GainExp(action) => action,
            Action::GainWeaponExp(action) => action,
        }
    }

    pub fn perform(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.transition().perform(state)
    }

    pub fn execute(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.transition().execute(state)
    }

    pub fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.transition().reverse(state)
    }
}

impl From<SetHpAction> for Action {
    fn from(action: SetHpAction) -> Self {
        Action::SetHp(action)
    }
}

impl From<SetItemUsesAction> for Action {
    fn from(action: SetItemUsesAction) -> Self {
        Action::SetItemUses(action)
    }
}

impl From<AddStatusAction> for Action {
    fn from(action: AddStatusAction) -> Self {
        Action::AddStatus(action)
    }
}

impl From<RandomStateAction> for Action {
    fn from(action: RandomStateAction) -> Self {
        Action::RandomState(action)
    }
}

impl From<GainExpAction> for Action {
    fn from(action: GainExpAction) -> Self {
        Action::GainExp(action)
    }
}

impl From<GainWeaponExpAction> for Action {
    fn from(action: GainWeaponExpAction) -> Self {
        Action::GainWeaponExp(action)
    }
}
