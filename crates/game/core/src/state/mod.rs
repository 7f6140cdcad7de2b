//! Authoritative combat state representation.
//!
//! This module owns the unit and item registries, support bonds and the
//! combat-only random stream. The phase solver reads it through
//! [`BoardQuery`] and mutates it exclusively through recorded actions.
pub mod types;

use std::collections::BTreeMap;

use crate::env::PcgStream;
pub use types::{
    ItemId, ItemState, Position, Stat, SupportPair, SupportRank, Team, UnitId, UnitState,
    UnitStats,
};

/// Canonical snapshot of everything combat can observe or change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub units: BTreeMap<UnitId, UnitState>,
    pub items: BTreeMap<ItemId, ItemState>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub supports: Vec<SupportPair>,

    /// Combat-only random stream.
    ///
    /// Only the phase solver draws from it, and every draw is bracketed by a
    /// recorded snapshot pair so undo never re-invokes the generator.
    pub rng: PcgStream,
}

impl CombatState {
    /// Creates an empty board whose combat stream is derived from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            units: BTreeMap::new(),
            items: BTreeMap::new(),
            supports: Vec::new(),
            rng: PcgStream::from_seed(seed),
        }
    }

    pub fn insert_unit(&mut self, unit: UnitState) {
        self.units.insert(unit.id, unit);
    }

    pub fn insert_item(&mut self, item: ItemState) {
        self.items.insert(item.id, item);
    }

    pub fn add_support(&mut self, pair: SupportPair) {
        self.supports.push(pair);
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.units.get_mut(&id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut ItemState> {
        self.items.get_mut(&id)
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

/// Narrow read-only board interface consumed by the formula engine and the
/// solver setup.
pub trait BoardQuery {
    fn unit(&self, id: UnitId) -> Option<&UnitState>;

    fn item(&self, id: ItemId) -> Option<&ItemState>;

    /// Living unit standing on `position`, if any.
    fn unit_at(&self, position: Position) -> Option<&UnitState>;

    /// Living units within `radius` (Manhattan) of `center`, ordered by id.
    fn units_within(&self, center: Position, radius: u32) -> Vec<&UnitState>;

    /// Support rank between two distinct units, if they share a bond.
    fn support_rank(&self, a: UnitId, b: UnitId) -> Option<SupportRank>;

    /// Bond partners of `unit` with their ranks.
    fn support_partners(&self, unit: UnitId) -> Vec<(UnitId, SupportRank)>;

    fn are_allies(&self, a: UnitId, b: UnitId) -> bool {
        match (self.unit(a), self.unit(b)) {
            (Some(a), Some(b)) => a.team.is_allied_with(b.team),
            _ => false,
        }
    }
}

impl BoardQuery for CombatState {
    fn unit(&self, id: UnitId) -> Option<&UnitState> {
        self.units.get(&id)
    }

    fn item(&self, id: ItemId) -> Option<&ItemState> {
        self.items.get(&id)
    }

    fn unit_at(&self, position: Position) -> Option<&UnitState> {
        self.units
            .values()
            .find(|unit| unit.is_alive() && unit.position == position)
    }

    fn units_within(&self, center: Position, radius: u32) -> Vec<&UnitState> {
        self.units
            .values()
            .filter(|unit| unit.is_alive() && unit.position.manhattan(center) <= radius)
            .collect()
    }

    fn support_rank(&self, a: UnitId, b: UnitId) -> Option<SupportRank> {
        if a == b {
            return None;
        }
        self.supports
            .iter()
            .find(|pair| pair.partner_of(a) == Some(b))
            .map(|pair| pair.rank)
    }

    fn support_partners(&self, unit: UnitId) -> Vec<(UnitId, SupportRank)> {
        self.supports
            .iter()
            .filter_map(|pair| pair.partner_of(unit).map(|partner| (partner, pair.rank)))
            .collect()
    }
}
