//! Per-unit combat statistics and experience accounting.
//!
//! Records are derived from playback only, so they can be recomputed for any
//! finished combat without touching the state.
use std::collections::BTreeMap;

use super::PlaybackEntry;
use crate::config::CombatConfig;
use crate::state::UnitId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitRecord {
    pub hits: u32,
    pub crits: u32,
    pub misses: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub healing_done: u32,
    pub kills: u32,
}

impl UnitRecord {
    /// Exchanges this unit resolved as the acting side.
    pub fn exchanges(&self) -> u32 {
        self.hits + self.crits + self.misses
    }

    pub fn landed(&self) -> u32 {
        self.hits + self.crits
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatRecords {
    units: BTreeMap<UnitId, UnitRecord>,
}

impl CombatRecords {
    pub fn from_playback<'p>(playback: impl IntoIterator<Item = &'p PlaybackEntry>) -> Self {
        let mut records = Self::default();
        for entry in playback {
            records.observe(entry);
        }
        records
    }

    fn observe(&mut self, entry: &PlaybackEntry) {
        match entry {
            PlaybackEntry::Hit { attacker, .. } => self.entry(*attacker).hits += 1,
            PlaybackEntry::Crit { attacker, .. } => self.entry(*attacker).crits += 1,
            PlaybackEntry::Miss { attacker, .. } => self.entry(*attacker).misses += 1,
            PlaybackEntry::Damage {
                source,
                target,
                dealt,
                ..
            } => {
                self.entry(*source).damage_dealt += dealt;
                self.entry(*target).damage_taken += dealt;
            }
            PlaybackEntry::Heal {
                source, restored, ..
            } => self.entry(*source).healing_done += restored,
            PlaybackEntry::Death { killer, .. } => self.entry(*killer).kills += 1,
            PlaybackEntry::PhaseStart { .. } | PlaybackEntry::Status { .. } => {}
        }
    }

    fn entry(&mut self, unit: UnitId) -> &mut UnitRecord {
        self.units.entry(unit).or_default()
    }

    pub fn get(&self, unit: UnitId) -> UnitRecord {
        self.units.get(&unit).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &UnitRecord)> {
        self.units.iter().map(|(id, record)| (*id, record))
    }
}

/// Experience earned in one combat.
///
/// Landing any hit (or healing) earns `exp_per_hit` shifted by the level gap;
/// only missing earns `exp_per_miss`. Each kill adds the kill bonus, also
/// shifted by the level gap. `bonus` is the summed `ModifyExp` contribution.
/// The result is clamped to `[0, max_exp_per_combat]`.
pub fn combat_exp(
    config: &CombatConfig,
    record: &UnitRecord,
    level: u32,
    opponent_level: u32,
    bonus: i32,
) -> u32 {
    if record.exchanges() == 0 && record.healing_done == 0 {
        return 0;
    }
    let gap = i64::from(opponent_level) - i64::from(level);
    let scaled = |base: i32| (i64::from(base) + gap * i64::from(config.exp_level_scale)).max(0);

    let mut exp = if record.landed() > 0 || record.healing_done > 0 {
        scaled(config.exp_per_hit)
    } else {
        i64::from(config.exp_per_miss)
    };
    exp += i64::from(record.kills) * scaled(config.exp_kill_bonus);
    exp += i64::from(bonus);

    let cap = i64::from(config.max_exp_per_combat.max(0));
    u32::try_from(exp.clamp(0, cap)).unwrap_or(0)
}

/// Adds `gain` to a (level, exp) pair, levelling up every
/// [`CombatConfig::EXP_PER_LEVEL`] points. Experience stops accruing at
/// [`CombatConfig::MAX_LEVEL`].
pub fn apply_exp(level: u32, exp: u32, gain: u32) -> (u32, u32) {
    if level >= CombatConfig::MAX_LEVEL {
        return (level, 0);
    }
    let mut level = level;
    let mut exp = exp.saturating_add(gain);
    while exp >= CombatConfig::EXP_PER_LEVEL && level < CombatConfig::MAX_LEVEL {
        exp -= CombatConfig::EXP_PER_LEVEL;
        level += 1;
    }
    if level == CombatConfig::MAX_LEVEL {
        exp = 0;
    }
    (level, exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playback() -> Vec<PlaybackEntry> {
        vec![
            PlaybackEntry::Hit {
                attacker: UnitId(1),
                defender: UnitId(2),
            },
            PlaybackEntry::Damage {
                source: UnitId(1),
                target: UnitId(2),
                amount: 12,
                dealt: 8,
            },
            PlaybackEntry::Death {
                unit: UnitId(2),
                killer: UnitId(1),
            },
            PlaybackEntry::Miss {
                attacker: UnitId(2),
                defender: UnitId(1),
            },
        ]
    }

    #[test]
    fn records_accumulate_from_playback() {
        let records = CombatRecords::from_playback(&playback());
        let attacker = records.get(UnitId(1));
        assert_eq!(attacker.hits, 1);
        assert_eq!(attacker.damage_dealt, 8);
        assert_eq!(attacker.kills, 1);
        assert_eq!(records.get(UnitId(2)).damage_taken, 8);
        assert_eq!(records.get(UnitId(2)).misses, 1);
        assert_eq!(records.get(UnitId(9)), UnitRecord::default());
    }

    #[test]
    fn exp_scales_with_level_gap() {
        let config = CombatConfig::default();
        let records = CombatRecords::from_playback(&playback());
        // 10 + 2*3 for the hit, 20 + 2*3 for the kill
        assert_eq!(combat_exp(&config, &records.get(UnitId(1)), 3, 5, 0), 42);
        // Missing only earns the flat miss value
        assert_eq!(combat_exp(&config, &records.get(UnitId(2)), 5, 3, 0), 1);
        // Idle units earn nothing
        assert_eq!(combat_exp(&config, &UnitRecord::default(), 1, 1, 50), 0);
        // Capped
        assert_eq!(combat_exp(&config, &records.get(UnitId(1)), 1, 20, 0), 100);
    }

    #[test]
    fn levelling_carries_remainder_and_stops_at_cap() {
        assert_eq!(apply_exp(1, 90, 25), (2, 15));
        assert_eq!(apply_exp(1, 0, 250), (3, 50));
        assert_eq!(apply_exp(19, 99, 100), (20, 0));
        assert_eq!(apply_exp(20, 0, 40), (20, 0));
    }
}
