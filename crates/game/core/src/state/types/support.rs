use super::common::UnitId;

/// Bond level between two units. Higher ranks sort later.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SupportRank {
    C,
    B,
    A,
    S,
}

/// An unordered support bond.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportPair {
    pub a: UnitId,
    pub b: UnitId,
    pub rank: SupportRank,
}

impl SupportPair {
    pub const fn new(a: UnitId, b: UnitId, rank: SupportRank) -> Self {
        Self { a, b, rank }
    }

    /// Returns the partner of `unit` when the pair involves it.
    pub fn partner_of(&self, unit: UnitId) -> Option<UnitId> {
        if self.a == unit {
            Some(self.b)
        } else if self.b == unit {
            Some(self.a)
        } else {
            None
        }
    }
}
