//! Ordered action history with a cursor.
//!
//! `actions[..cursor]` are applied to the state; `actions[cursor..]` were
//! reversed and can be replayed. Marks record the indices at which each
//! exchange began, which is the granularity of rewind and forward.
use tracing::debug;

use super::{Action, LogError, TransitionPhase};
use crate::state::CombatState;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionLog {
    version: u32,
    actions: Vec<Action>,
    cursor: usize,
    marks: Vec<usize>,
}

impl ActionLog {
    /// Serialized layout version. Bump when [`Action`] changes shape.
    pub const FORMAT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::FORMAT_VERSION,
            actions: Vec::new(),
            cursor: 0,
            marks: Vec::new(),
        }
    }

    /// Applies `action` for the first time and appends it.
    ///
    /// Any reversed tail is discarded first: recording after a rewind starts a
    /// new timeline.
    pub fn record(
        &mut self,
        action: impl Into<Action>,
        state: &mut CombatState,
    ) -> Result<(), LogError> {
        let action = action.into();
        self.truncate_redo();
        action
            .perform(state)
            .map_err(|source| {
                Self::transition_error(self.cursor, &action, TransitionPhase::Perform, source)
            })?;
        self.actions.push(action);
        self.cursor += 1;
        Ok(())
    }

    /// Marks the start of an exchange at the current cursor.
    pub fn mark(&mut self) {
        self.truncate_redo();
        if self.marks.last() != Some(&self.cursor) {
            self.marks.push(self.cursor);
        }
    }

    /// Reverses actions back to the start of the previous exchange.
    ///
    /// Returns `false` when nothing was applied.
    pub fn rewind(&mut self, state: &mut CombatState) -> Result<bool, LogError> {
        if !self.can_rewind() {
            return Ok(false);
        }
        let target = self
            .marks
            .iter()
            .rev()
            .find(|mark| **mark < self.cursor)
            .copied()
            .unwrap_or(0);
        self.reverse_to(target, state)?;
        debug!(cursor = self.cursor, "rewound action log");
        Ok(true)
    }

    /// Replays reversed actions up to the start of the next exchange.
    ///
    /// Returns `false` when there is nothing to replay.
    pub fn forward(&mut self, state: &mut CombatState) -> Result<bool, LogError> {
        if !self.can_forward() {
            return Ok(false);
        }
        let target = self
            .marks
            .iter()
            .find(|mark| **mark > self.cursor)
            .copied()
            .unwrap_or(self.actions.len());
        while self.cursor < target {
            let index = self.cursor;
            let action = &self.actions[index];
            action
                .execute(state)
                .map_err(|source| {
                    Self::transition_error(index, action, TransitionPhase::Execute, source)
                })?;
            self.cursor += 1;
        }
        debug!(cursor = self.cursor, "replayed action log");
        Ok(true)
    }

    /// Reverses every applied action, newest first.
    pub fn reverse_all(&mut self, state: &mut CombatState) -> Result<(), LogError> {
        self.reverse_to(0, state)
    }

    /// Replays every reversed action.
    pub fn replay_all(&mut self, state: &mut CombatState) -> Result<(), LogError> {
        while self.forward(state)? {}
        Ok(())
    }

    /// Drops the history and hands back the applied actions.
    pub fn finalize(&mut self) -> Vec<Action> {
        self.truncate_redo();
        self.marks.clear();
        self.cursor = 0;
        std::mem::take(&mut self.actions)
    }

    /// Checks a deserialized log before it is trusted.
    pub fn validate(&self) -> Result<(), LogError> {
        if self.version != Self::FORMAT_VERSION {
            return Err(LogError::Version {
                expected: Self::FORMAT_VERSION,
                found: self.version,
            });
        }
        if self.cursor > self.actions.len() {
            return Err(LogError::Corrupt("cursor past the end of the log"));
        }
        if self.marks.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(LogError::Corrupt("marks are not strictly increasing"));
        }
        if self.marks.last().is_some_and(|mark| *mark > self.actions.len()) {
            return Err(LogError::Corrupt("mark past the end of the log"));
        }
        Ok(())
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Actions currently reflected in the state.
    pub fn applied(&self) -> &[Action] {
        &self.actions[..self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn marks(&self) -> &[usize] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn can_rewind(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_forward(&self) -> bool {
        self.cursor < self.actions.len()
    }

    fn reverse_to(&mut self, target: usize, state: &mut CombatState) -> Result<(), LogError> {
        while self.cursor > target {
            let index = self.cursor - 1;
            let action = &self.actions[index];
            action
                .reverse(state)
                .map_err(|source| {
                    Self::transition_error(index, action, TransitionPhase::Reverse, source)
                })?;
            self.cursor = index;
        }
        Ok(())
    }

    fn truncate_redo(&mut self) {
        if self.cursor < self.actions.len() {
            self.actions.truncate(self.cursor);
            let cursor = self.cursor;
            self.marks.retain(|mark| *mark <= cursor);
        }
    }

    fn transition_error(
        index: usize,
        action: &Action,
        phase: TransitionPhase,
        source: super::ActionError,
    ) -> LogError {
        LogError::Transition {
            index,
            action: action.name(),
            phase,
            source,
        }
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{AddStatusAction, RandomStateAction, SetHpAction};
    use crate::env::RandomStream;
    use crate::state::{Position, Team, UnitId, UnitState};

    fn board() -> CombatState {
        let mut state = CombatState::with_seed(11);
        state.insert_unit(
            UnitState::new(UnitId(1), "Ross", Team::Player, Position::ORIGIN).with_hp(20),
        );
        state
    }

    /// Two exchanges: hp 20 -> 15 with a draw, then 15 -> 9 plus a status.
    fn two_exchanges(state: &mut CombatState) -> ActionLog {
        let mut log = ActionLog::new();
        for (old, new) in [(20, 15), (15, 9)] {
            log.mark();
            let before = state.rng.snapshot();
            state.rng.roll_percent();
            let after = state.rng.snapshot();
            log.record(RandomStateAction::new(before, after), state).unwrap();
            log.record(SetHpAction::new(UnitId(1), old, new), state).unwrap();
        }
        log.record(AddStatusAction::new(UnitId(1), "poison"), state).unwrap();
        log
    }

    #[test]
    fn reverse_all_restores_the_initial_state() {
        let initial = board();
        let mut state = initial.clone();
        let mut log = two_exchanges(&mut state);
        assert_eq!(log.len(), 5);
        log.reverse_all(&mut state).unwrap();
        assert_eq!(state, initial);
        log.replay_all(&mut state).unwrap();
        assert_eq!(state.units[&UnitId(1)].hp, 9);
        assert!(state.units[&UnitId(1)].statuses.contains("poison"));
    }

    #[test]
    fn rewind_and_forward_move_one_exchange() {
        let mut state = board();
        let mut log = two_exchanges(&mut state);
        assert_eq!(log.marks(), &[0, 2]);

        assert!(log.rewind(&mut state).unwrap());
        assert_eq!(log.cursor(), 2);
        assert_eq!(state.units[&UnitId(1)].hp, 15);
        assert!(log.rewind(&mut state).unwrap());
        assert_eq!(log.cursor(), 0);
        assert!(!log.can_rewind());
        assert!(!log.rewind(&mut state).unwrap());

        assert!(log.forward(&mut state).unwrap());
        assert_eq!(log.cursor(), 2);
        assert!(log.forward(&mut state).unwrap());
        assert_eq!(log.cursor(), 5);
        assert!(!log.forward(&mut state).unwrap());
    }

    #[test]
    fn recording_after_rewind_discards_the_redo_tail() {
        let mut state = board();
        let mut log = two_exchanges(&mut state);
        log.rewind(&mut state).unwrap();
        log.mark();
        log.record(SetHpAction::new(UnitId(1), 15, 1), &mut state).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.marks(), &[0, 2]);
        assert!(!log.can_forward());
    }

    #[test]
    fn failed_record_leaves_log_untouched() {
        let mut state = board();
        let mut log = ActionLog::new();
        let err = log
            .record(SetHpAction::new(UnitId(1), 3, 0), &mut state)
            .unwrap_err();
        assert!(matches!(
            err,
            LogError::Transition {
                index: 0,
                action: "set_hp",
                phase: TransitionPhase::Perform,
                ..
            }
        ));
        assert!(log.is_empty());
    }

    #[test]
    fn finalize_drops_history() {
        let mut state = board();
        let mut log = two_exchanges(&mut state);
        log.rewind(&mut state).unwrap();
        let applied = log.finalize();
        assert_eq!(applied.len(), 2);
        assert!(log.is_empty());
        assert!(log.marks().is_empty());
    }

    #[test]
    fn validate_rejects_foreign_versions() {
        let log = ActionLog {
            version: 99,
            ..ActionLog::new()
        };
        assert_eq!(
            log.validate(),
            Err(LogError::Version {
                expected: ActionLog::FORMAT_VERSION,
                found: 99
            })
        );
        assert!(ActionLog::new().validate().is_ok());
        assert!(ActionLog::default().validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialized_actions_are_tagged() {
        let mut state = board();
        let log = two_exchanges(&mut state);
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["actions"][1]["type"], "set_hp");
        assert_eq!(json["actions"][1]["fields"]["new"], 15);
        let restored: ActionLog = serde_json::from_value(json).unwrap();
        assert_eq!(restored, log);
    }
}
