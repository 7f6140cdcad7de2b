use std::collections::BTreeMap;

use crate::expr::{Expr, ExprError};
use crate::formula::FormulaStat;
use crate::state::SupportRank;

/// Oracle providing combat rule tables.
///
/// Tables hold balance data only: named equations, the weapon triangle,
/// weapon-rank tiers and support bonuses. Item and skill behavior comes from
/// the component oracle.
pub trait TablesOracle {
    /// Parsed equation registered under `name`.
    fn equation(&self, name: &str) -> Option<&Expr>;

    /// Every triangle entry declared for `attacker_type` against
    /// `defender_type`. Entries are not exclusive; callers add all of them.
    fn triangle(&self, attacker_type: &str, defender_type: &str) -> Vec<&TriangleEntry>;

    /// Bonus of the first rank tier that `exp` qualifies for.
    fn rank_bonus(&self, weapon_type: &str, exp: u32) -> Option<&BonusLine<i32>>;

    /// Bonus a single supporting ally of `rank` grants.
    fn support_bonus(&self, rank: SupportRank) -> Option<&BonusLine<f32>>;
}

/// One value per formula category.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(default, bound(deserialize = "T: serde::Deserialize<'de> + Default"))
)]
pub struct BonusLine<T> {
    pub accuracy: T,
    pub avoid: T,
    pub crit_accuracy: T,
    pub crit_avoid: T,
    pub damage: T,
    pub defense: T,
    pub attack_speed: T,
    pub defense_speed: T,
}

impl<T: Copy> BonusLine<T> {
    pub fn get(&self, stat: FormulaStat) -> T {
        match stat {
            FormulaStat::Accuracy => self.accuracy,
            FormulaStat::Avoid => self.avoid,
            FormulaStat::CritAccuracy => self.crit_accuracy,
            FormulaStat::CritAvoid => self.crit_avoid,
            FormulaStat::Damage => self.damage,
            FormulaStat::Defense => self.defense,
            FormulaStat::AttackSpeed => self.attack_speed,
            FormulaStat::DefenseSpeed => self.defense_speed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriangleKind {
    Advantage,
    Disadvantage,
}

/// Weapon-type matchup bonus, seen from the attacker's weapon type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleEntry {
    pub attacker: String,
    pub defender: String,
    pub kind: TriangleKind,
    pub bonus: BonusLine<i32>,
}

/// Weapon-rank tier. `weapon_type: None` applies to every type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankBonus {
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon_type: Option<String>,
    pub requirement: u32,
    pub bonus: BonusLine<i32>,
}

impl RankBonus {
    fn qualifies(&self, weapon_type: &str, exp: u32) -> bool {
        self.weapon_type
            .as_deref()
            .is_none_or(|required| required == weapon_type)
            && exp >= self.requirement
    }
}

/// In-memory rule tables.
///
/// Rank tiers are checked in insertion order, so list the highest tier first.
#[derive(Clone, Debug, Default)]
pub struct StaticTables {
    equations: BTreeMap<String, Expr>,
    triangle: Vec<TriangleEntry>,
    ranks: Vec<RankBonus>,
    supports: BTreeMap<SupportRank, BonusLine<f32>>,
}

impl StaticTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and registers an equation. Re-registering a name replaces it.
    pub fn with_equation(mut self, name: impl Into<String>, text: &str) -> Result<Self, ExprError> {
        self.insert_equation(name, text)?;
        Ok(self)
    }

    pub fn insert_equation(&mut self, name: impl Into<String>, text: &str) -> Result<(), ExprError> {
        let expr = text.parse::<Expr>()?;
        self.equations.insert(name.into(), expr);
        Ok(())
    }

    pub fn with_triangle(mut self, entry: TriangleEntry) -> Self {
        self.triangle.push(entry);
        self
    }

    pub fn with_rank(mut self, rank: RankBonus) -> Self {
        self.ranks.push(rank);
        self
    }

    pub fn with_support(mut self, rank: SupportRank, bonus: BonusLine<f32>) -> Self {
        self.supports.insert(rank, bonus);
        self
    }

    pub fn equation_names(&self) -> impl Iterator<Item = &str> {
        self.equations.keys().map(String::as_str)
    }
}

impl TablesOracle for StaticTables {
    fn equation(&self, name: &str) -> Option<&Expr> {
        self.equations.get(name)
    }

    fn triangle(&self, attacker_type: &str, defender_type: &str) -> Vec<&TriangleEntry> {
        self.triangle
            .iter()
            .filter(|entry| entry.attacker == attacker_type && entry.defender == defender_type)
            .collect()
    }

    fn rank_bonus(&self, weapon_type: &str, exp: u32) -> Option<&BonusLine<i32>> {
        self.ranks
            .iter()
            .find(|tier| tier.qualifies(weapon_type, exp))
            .map(|tier| &tier.bonus)
    }

    fn support_bonus(&self, rank: SupportRank) -> Option<&BonusLine<f32>> {
        self.supports.get(&rank)
    }
}
