//! Scenario loader: a starting board plus the combats to fight on it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tactics_core::combat::CombatSetup;
use tactics_core::state::{
    CombatState, ItemId, ItemState, Position, SupportPair, Team, UnitId, UnitState, UnitStats,
};

use crate::catalog::Catalog;
use crate::error::ContentError;
use crate::loaders::{LoadResult, read_file};

fn first_level() -> u32 {
    1
}

/// Item instance carried by a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: ItemId,
    pub nid: String,
    /// Overrides the definition's starting uses.
    #[serde(default)]
    pub uses: Option<u32>,
    /// Sub-items of a sequence item, fired one after another.
    #[serde(default)]
    pub subitems: Vec<ItemSpec>,
}

/// Unit as authored; omitted fields take sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: UnitId,
    pub name: String,
    pub team: Team,
    pub position: Position,
    #[serde(default = "first_level")]
    pub level: u32,
    #[serde(default)]
    pub exp: u32,
    pub max_hp: u32,
    /// Current HP; defaults to `max_hp`.
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub stats: UnitStats,
    #[serde(default)]
    pub weapon_exp: BTreeMap<String, u32>,
    /// The first item is equipped.
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub supports: Vec<SupportPair>,
    /// Combats fought in order.
    #[serde(default)]
    pub combats: Vec<CombatSetup>,
}

impl Scenario {
    /// Builds the starting board, filling item uses from the catalog.
    pub fn build_state(&self, catalog: &Catalog) -> Result<CombatState, ContentError> {
        let mut state = CombatState::with_seed(self.seed);
        for spec in &self.units {
            if state.units.contains_key(&spec.id) {
                return Err(ContentError::DuplicateId(spec.id.to_string()));
            }
            let mut unit = UnitState::new(spec.id, spec.name.clone(), spec.team, spec.position)
                .with_level(spec.level)
                .with_stats(spec.stats)
                .with_hp(spec.max_hp);
            unit.hp = spec.hp.unwrap_or(spec.max_hp).min(spec.max_hp);
            unit.exp = spec.exp;
            unit.weapon_exp = spec.weapon_exp.clone();
            unit.skills = spec.skills.clone();
            unit.tags = spec.tags.clone();

            for item in &spec.items {
                register_item(&mut state, catalog, spec.id, item)?;
                unit = unit.with_item(item.id);
            }
            state.insert_unit(unit);
        }
        for pair in &self.supports {
            state.add_support(*pair);
        }
        catalog.validate(&state)?;
        Ok(state)
    }
}

fn register_item(
    state: &mut CombatState,
    catalog: &Catalog,
    owner: UnitId,
    spec: &ItemSpec,
) -> Result<(), ContentError> {
    if state.items.contains_key(&spec.id) {
        return Err(ContentError::DuplicateId(spec.id.to_string()));
    }
    let definition = catalog.item(&spec.nid).ok_or_else(|| ContentError::UnknownItem {
        item: spec.id,
        nid: spec.nid.clone(),
    })?;

    let mut item = ItemState::new(spec.id, spec.nid.clone()).owned_by(owner);
    if let Some(uses) = spec.uses.or(definition.uses) {
        item = item.with_uses(uses);
    }
    if !spec.subitems.is_empty() {
        item = item.with_subitems(spec.subitems.iter().map(|sub| sub.id).collect());
    }
    state.insert_item(item);

    for sub in &spec.subitems {
        register_item(state, catalog, owner, sub)?;
    }
    Ok(())
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let scenario: Scenario = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON at {:?}: {}", path, e))?;
        Ok(scenario)
    }
}
