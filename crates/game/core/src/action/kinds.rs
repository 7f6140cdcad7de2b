//! Concrete actions.
//!
//! Each action carries absolute before/after values. `pre_validate` checks the
//! state holds the before value, `reverse` checks it holds the after value.

use super::{ActionError, ActionTransition};
use crate::env::{RandomStream, RngSnapshot};
use crate::state::{CombatState, ItemId, UnitId, UnitState};

fn unit(state: &CombatState, id: UnitId) -> Result<&UnitState, ActionError> {
    state.units.get(&id).ok_or(ActionError::UnitNotFound(id))
}

fn unit_mut(state: &mut CombatState, id: UnitId) -> Result<&mut UnitState, ActionError> {
    state.unit_mut(id).ok_or(ActionError::UnitNotFound(id))
}

// ============================================================================
// Hit points
// ============================================================================

/// Sets a unit's current HP.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetHpAction {
    pub unit: UnitId,
    pub old: u32,
    pub new: u32,
}

impl SetHpAction {
    pub fn new(unit: UnitId, old: u32, new: u32) -> Self {
        Self { unit, old, new }
    }

    fn expect(&self, state: &CombatState, expected: u32) -> Result<(), ActionError> {
        let found = unit(state, self.unit)?.hp;
        if found != expected {
            return Err(ActionError::HpMismatch {
                unit: self.unit,
                expected,
                found,
            });
        }
        Ok(())
    }
}

impl ActionTransition for SetHpAction {
    fn pre_validate(&self, state: &CombatState) -> Result<(), ActionError> {
        self.expect(state, self.old)
    }

    fn apply(&self, state: &mut CombatState) -> Result<(), ActionError> {
        unit_mut(state, self.unit)?.hp = self.new;
        Ok(())
    }

    fn post_validate(&self, state: &CombatState) -> Result<(), ActionError> {
        let unit = unit(state, self.unit)?;
        debug_assert!(unit.hp <= unit.max_hp, "hp must not exceed max hp");
        Ok(())
    }

    fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.expect(state, self.new)?;
        unit_mut(state, self.unit)?.hp = self.old;
        Ok(())
    }
}

// ============================================================================
// Item uses
// ============================================================================

/// Sets an item's remaining uses.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetItemUsesAction {
    pub item: ItemId,
    pub old: Option<u32>,
    pub new: Option<u32>,
}

impl SetItemUsesAction {
    pub fn new(item: ItemId, old: Option<u32>, new: Option<u32>) -> Self {
        Self { item, old, new }
    }

    fn set(
        &self,
        state: &mut CombatState,
        expected: Option<u32>,
        value: Option<u32>,
    ) -> Result<(), ActionError> {
        let item = state
            .item_mut(self.item)
            .ok_or(ActionError::ItemNotFound(self.item))?;
        if item.uses != expected {
            return Err(ActionError::UsesMismatch {
                item: self.item,
                expected,
                found: item.uses,
            });
        }
        item.uses = value;
        Ok(())
    }
}

impl ActionTransition for SetItemUsesAction {
    fn apply(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.set(state, self.old, self.new)
    }

    fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.set(state, self.new, self.old)
    }
}

// ============================================================================
// Status
// ============================================================================

/// Inflicts a status that the unit did not already have.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddStatusAction {
    pub unit: UnitId,
    pub status: String,
}

impl AddStatusAction {
    pub fn new(unit: UnitId, status: impl Into<String>) -> Self {
        Self {
            unit,
            status: status.into(),
        }
    }
}

impl ActionTransition for AddStatusAction {
    fn pre_validate(&self, state: &CombatState) -> Result<(), ActionError> {
        if unit(state, self.unit)?.statuses.contains(&self.status) {
            return Err(ActionError::StatusPresent {
                unit: self.unit,
                status: self.status.clone(),
            });
        }
        Ok(())
    }

    fn apply(&self, state: &mut CombatState) -> Result<(), ActionError> {
        unit_mut(state, self.unit)?
            .statuses
            .insert(self.status.clone());
        Ok(())
    }

    fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError> {
        if !unit_mut(state, self.unit)?.statuses.remove(&self.status) {
            return Err(ActionError::StatusMissing {
                unit: self.unit,
                status: self.status.clone(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Random stream position
// ============================================================================

/// Brackets the draws of one resolution.
///
/// The solver draws from the live stream and then records this action, so
/// `perform` only confirms the stream already sits at `after`. Replay and undo
/// move the stream between the two recorded positions without drawing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomStateAction {
    pub before: RngSnapshot,
    pub after: RngSnapshot,
}

impl RandomStateAction {
    pub fn new(before: RngSnapshot, after: RngSnapshot) -> Self {
        Self { before, after }
    }

    fn expect(state: &CombatState, expected: RngSnapshot) -> Result<(), ActionError> {
        let found = state.rng.snapshot();
        if found != expected {
            return Err(ActionError::StreamMismatch { expected, found });
        }
        Ok(())
    }
}

impl ActionTransition for RandomStateAction {
    fn pre_validate(&self, state: &CombatState) -> Result<(), ActionError> {
        Self::expect(state, self.before)
    }

    fn apply(&self, state: &mut CombatState) -> Result<(), ActionError> {
        state.rng.restore(self.after);
        Ok(())
    }

    fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError> {
        Self::expect(state, self.after)?;
        state.rng.restore(self.before);
        Ok(())
    }

    fn perform(&self, state: &mut CombatState) -> Result<(), ActionError> {
        Self::expect(state, self.after)
    }
}

// ============================================================================
// Experience
// ============================================================================

/// Moves a unit's (level, exp) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainExpAction {
    pub unit: UnitId,
    pub old_level: u32,
    pub old_exp: u32,
    pub new_level: u32,
    pub new_exp: u32,
}

impl GainExpAction {
    fn set(
        &self,
        state: &mut CombatState,
        expected: (u32, u32),
        value: (u32, u32),
    ) -> Result<(), ActionError> {
        let unit = unit_mut(state, self.unit)?;
        let found = (unit.level, unit.exp);
        if found != expected {
            return Err(ActionError::ProgressMismatch {
                unit: self.unit,
                expected,
                found,
            });
        }
        (unit.level, unit.exp) = value;
        Ok(())
    }
}

impl ActionTransition for GainExpAction {
    fn apply(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.set(
            state,
            (self.old_level, self.old_exp),
            (self.new_level, self.new_exp),
        )
    }

    fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError> {
        self.set(
            state,
            (self.new_level, self.new_exp),
            (self.old_level, self.old_exp),
        )
    }
}

/// Moves a unit's experience with one weapon type.
///
/// `old` is `None` when the unit had no entry for the type yet; reversing
/// removes the entry again so the state matches exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainWeaponExpAction {
    pub unit: UnitId,
    pub weapon_type: String,
    pub old: Option<u32>,
    pub new: u32,
}

impl ActionTransition for GainWeaponExpAction {
    fn apply(&self, state: &mut CombatState) -> Result<(), ActionError> {
        let unit = unit_mut(state, self.unit)?;
        let found = unit.weapon_exp.get(&self.weapon_type).copied();
        if found != self.old {
            return Err(ActionError::WeaponExpMismatch {
                unit: self.unit,
                weapon_type: self.weapon_type.clone(),
                expected: self.old.unwrap_or(0),
                found: found.unwrap_or(0),
            });
        }
        unit.weapon_exp.insert(self.weapon_type.clone(), self.new);
        Ok(())
    }

    fn reverse(&self, state: &mut CombatState) -> Result<(), ActionError> {
        let unit = unit_mut(state, self.unit)?;
        let found = unit.weapon_exp_for(&self.weapon_type);
        if found != self.new {
            return Err(ActionError::WeaponExpMismatch {
                unit: self.unit,
                weapon_type: self.weapon_type.clone(),
                expected: self.new,
                found,
            });
        }
        match self.old {
            Some(old) => unit.weapon_exp.insert(self.weapon_type.clone(), old),
            None => unit.weapon_exp.remove(&self.weapon_type),
        };
        Ok(())
    }
}
