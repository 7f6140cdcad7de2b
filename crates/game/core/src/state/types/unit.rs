use std::collections::{BTreeMap, BTreeSet};

use super::common::{ItemId, Position, Team, UnitId};

/// Primary unit stats readable by equations.
///
/// The upper-case names double as equation identifiers (`STR + SKL / 2`).
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
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Stat {
    Str,
    Mag,
    Skl,
    Spd,
    Lck,
    Def,
    Res,
    Con,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitStats {
    pub str: i32,
    pub mag: i32,
    pub skl: i32,
    pub spd: i32,
    pub lck: i32,
    pub def: i32,
    pub res: i32,
    pub con: i32,
}

impl UnitStats {
    pub const fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Str => self.str,
            Stat::Mag => self.mag,
            Stat::Skl => self.skl,
            Stat::Spd => self.spd,
            Stat::Lck => self.lck,
            Stat::Def => self.def,
            Stat::Res => self.res,
            Stat::Con => self.con,
        }
    }
}

/// Board-resident unit as seen by the combat core.
///
/// Combat only mutates `hp`, `exp`, `level`, `weapon_exp` and `statuses`, and
/// only through actions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitState {
    pub id: UnitId,
    pub name: String,
    pub team: Team,
    pub position: Position,
    pub level: u32,
    pub exp: u32,
    pub stats: UnitStats,
    pub hp: u32,
    pub max_hp: u32,
    /// Accumulated weapon experience keyed by weapon type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon_exp: BTreeMap<String, u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<ItemId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipped: Option<ItemId>,
    /// Skill identifiers resolved to components by the component oracle.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<String>,
    /// Designer tags (`armored`, `flying`, ...) readable by conditions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: BTreeSet<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub statuses: BTreeSet<String>,
}

impl UnitState {
    pub fn new(id: UnitId, name: impl Into<String>, team: Team, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            position,
            level: 1,
            exp: 0,
            stats: UnitStats::default(),
            hp: 1,
            max_hp: 1,
            weapon_exp: BTreeMap::new(),
            items: Vec::new(),
            equipped: None,
            skills: Vec::new(),
            tags: BTreeSet::new(),
            statuses: BTreeSet::new(),
        }
    }

    pub fn with_stats(mut self, stats: UnitStats) -> Self {
        self.stats = stats;
        self
    }

    /// Sets both current and maximum HP.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp;
        self.max_hp = hp;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Adds an item to the inventory and equips it when nothing is equipped yet.
    pub fn with_item(mut self, item: ItemId) -> Self {
        self.items.push(item);
        if self.equipped.is_none() {
            self.equipped = Some(item);
        }
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_weapon_exp(mut self, weapon_type: impl Into<String>, exp: u32) -> Self {
        self.weapon_exp.insert(weapon_type.into(), exp);
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Current HP as a percentage of max HP, truncated.
    pub fn hp_percent(&self) -> i64 {
        if self.max_hp == 0 {
            return 0;
        }
        i64::from(self.hp) * 100 / i64::from(self.max_hp)
    }

    pub fn weapon_exp_for(&self, weapon_type: &str) -> u32 {
        self.weapon_exp.get(weapon_type).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_names_parse_from_equation_identifiers() {
        assert_eq!("STR".parse::<Stat>(), Ok(Stat::Str));
        assert_eq!("skl".parse::<Stat>(), Ok(Stat::Skl));
        assert!("HP".parse::<Stat>().is_err());
        assert_eq!(Stat::Con.to_string(), "CON");
    }

    #[test]
    fn hp_percent_truncates() {
        let mut unit = UnitState::new(UnitId(1), "Ike", Team::Player, Position::ORIGIN).with_hp(30);
        unit.hp = 10;
        assert_eq!(unit.hp_percent(), 33);
        unit.hp = 0;
        assert!(!unit.is_alive());
    }

    #[test]
    fn first_item_is_equipped() {
        let unit = UnitState::new(UnitId(1), "Ike", Team::Player, Position::ORIGIN)
            .with_item(ItemId(4))
            .with_item(ItemId(5));
        assert_eq!(unit.equipped, Some(ItemId(4)));
        assert_eq!(unit.items, vec![ItemId(4), ItemId(5)]);
    }
}
