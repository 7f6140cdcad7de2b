//! Playback entries: the immutable history of a combat.
//!
//! Entries are never reversed. They feed experience accounting, combat
//! records and presentation cues.
use super::Side;
use crate::state::UnitId;

#[derive(Clone, Debug, PartialEq, Eq, strum::EnumDiscriminants)]
#[strum_discriminants(name(PlaybackKind), derive(Hash, PartialOrd, Ord, strum::Display))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PlaybackEntry {
    /// A side begins a new full phase.
    PhaseStart { side: Side, unit: UnitId },
    Hit { attacker: UnitId, defender: UnitId },
    Crit { attacker: UnitId, defender: UnitId },
    Miss { attacker: UnitId, defender: UnitId },
    /// `amount` is the computed damage, `dealt` what the target actually lost.
    Damage {
        source: UnitId,
        target: UnitId,
        amount: i32,
        dealt: u32,
    },
    Heal {
        source: UnitId,
        target: UnitId,
        amount: i32,
        restored: u32,
    },
    Status {
        source: UnitId,
        target: UnitId,
        status: String,
    },
    Death { unit: UnitId, killer: UnitId },
}

impl PlaybackEntry {
    pub fn kind(&self) -> PlaybackKind {
        self.into()
    }

    /// True for hit, crit and miss: the resolved outcome of one exchange.
    pub fn is_outcome(&self) -> bool {
        matches!(
            self.kind(),
            PlaybackKind::Hit | PlaybackKind::Crit | PlaybackKind::Miss
        )
    }

    /// Acting unit of an outcome entry.
    pub fn actor(&self) -> Option<UnitId> {
        match self {
            PlaybackEntry::Hit { attacker, .. }
            | PlaybackEntry::Crit { attacker, .. }
            | PlaybackEntry::Miss { attacker, .. } => Some(*attacker),
            PlaybackEntry::Damage { source, .. }
            | PlaybackEntry::Heal { source, .. }
            | PlaybackEntry::Status { source, .. } => Some(*source),
            PlaybackEntry::PhaseStart { unit, .. } => Some(*unit),
            PlaybackEntry::Death { .. } => None,
        }
    }
}
