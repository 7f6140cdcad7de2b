//! Item and skill catalog: the component oracle backed by content data.
use std::collections::BTreeMap;

use tactics_core::aggregate::{Component, ComponentOracle};
use tactics_core::state::{CombatState, ItemState, UnitState};
use tracing::debug;

use crate::components::{ComponentSpec, StandardComponent};
use crate::error::ContentError;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub nid: String,
    pub name: String,
    /// Starting uses for new instances; `None` is unlimited.
    #[cfg_attr(feature = "serde", serde(default))]
    pub uses: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub components: Vec<ComponentSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub nid: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub components: Vec<ComponentSpec>,
}

#[derive(Clone, Debug)]
struct Compiled<D> {
    definition: D,
    components: Vec<StandardComponent>,
}

fn compile_all(owner: &str, specs: &[ComponentSpec]) -> Result<Vec<StandardComponent>, ContentError> {
    specs
        .iter()
        .map(|spec| StandardComponent::compile(owner, spec))
        .collect()
}

fn as_components(components: &[StandardComponent]) -> impl Iterator<Item = &dyn Component> {
    components.iter().map(|c| c as &dyn Component)
}

/// Compiled item and skill definitions keyed by nid.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: BTreeMap<String, Compiled<ItemDefinition>>,
    skills: BTreeMap<String, Compiled<SkillDefinition>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(
        items: impl IntoIterator<Item = ItemDefinition>,
        skills: impl IntoIterator<Item = SkillDefinition>,
    ) -> Result<Self, ContentError> {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert_item(item)?;
        }
        for skill in skills {
            catalog.insert_skill(skill)?;
        }
        debug!(
            items = catalog.items.len(),
            skills = catalog.skills.len(),
            "catalog compiled"
        );
        Ok(catalog)
    }

    pub fn insert_item(&mut self, definition: ItemDefinition) -> Result<(), ContentError> {
        if self.items.contains_key(&definition.nid) {
            return Err(ContentError::DuplicateItem(definition.nid));
        }
        let components = compile_all(&definition.nid, &definition.components)?;
        self.items.insert(
            definition.nid.clone(),
            Compiled {
                definition,
                components,
            },
        );
        Ok(())
    }

    pub fn insert_skill(&mut self, definition: SkillDefinition) -> Result<(), ContentError> {
        if self.skills.contains_key(&definition.nid) {
            return Err(ContentError::DuplicateSkill(definition.nid));
        }
        let components = compile_all(&definition.nid, &definition.components)?;
        self.skills.insert(
            definition.nid.clone(),
            Compiled {
                definition,
                components,
            },
        );
        Ok(())
    }

    pub fn item(&self, nid: &str) -> Option<&ItemDefinition> {
        self.items.get(nid).map(|entry| &entry.definition)
    }

    pub fn skill(&self, nid: &str) -> Option<&SkillDefinition> {
        self.skills.get(nid).map(|entry| &entry.definition)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values().map(|entry| &entry.definition)
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values().map(|entry| &entry.definition)
    }

    /// Checks that every item and skill on the board resolves. The oracle
    /// itself treats unknown nids as component-less.
    pub fn validate(&self, state: &CombatState) -> Result<(), ContentError> {
        for item in state.items.values() {
            if !self.items.contains_key(&item.nid) {
                return Err(ContentError::UnknownItem {
                    item: item.id,
                    nid: item.nid.clone(),
                });
            }
        }
        for unit in state.units.values() {
            if let Some(skill) = unit.skills.iter().find(|s| !self.skills.contains_key(*s)) {
                return Err(ContentError::UnknownSkill {
                    unit: unit.id,
                    skill: skill.clone(),
                });
            }
        }
        Ok(())
    }
}

impl ComponentOracle for Catalog {
    fn item_components<'s>(&'s self, item: &ItemState) -> Vec<&'s dyn Component> {
        self.items
            .get(&item.nid)
            .map(|entry| as_components(&entry.components).collect())
            .unwrap_or_default()
    }

    fn skill_components<'s>(&'s self, unit: &UnitState) -> Vec<&'s dyn Component> {
        unit.skills
            .iter()
            .filter_map(|skill| self.skills.get(skill))
            .flat_map(|entry| as_components(&entry.components))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::state::{ItemId, Position, Team, UnitId};

    use super::*;

    fn sword() -> ItemDefinition {
        ItemDefinition {
            nid: "iron_sword".into(),
            name: "Iron Sword".into(),
            uses: Some(46),
            components: vec![
                ComponentSpec::WeaponType("sword".into()),
                ComponentSpec::Damage(5),
            ],
        }
    }

    fn vantage() -> SkillDefinition {
        SkillDefinition {
            nid: "vantage".into(),
            name: "Vantage".into(),
            components: vec![ComponentSpec::Vantage],
        }
    }

    #[test]
    fn components_come_back_in_declaration_order() {
        let catalog = Catalog::from_definitions([sword()], [vantage()]).unwrap();
        let item = ItemState::new(ItemId(1), "iron_sword");
        let names: Vec<_> = catalog
            .item_components(&item)
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["weapon_type", "damage"]);

        let unit = UnitState::new(UnitId(1), "Eirika", Team::Player, Position::ORIGIN)
            .with_skill("vantage")
            .with_skill("missing");
        assert_eq!(catalog.skill_components(&unit).len(), 1);
    }

    #[test]
    fn duplicates_are_rejected() {
        assert_eq!(
            Catalog::from_definitions([sword(), sword()], []).unwrap_err(),
            ContentError::DuplicateItem("iron_sword".into())
        );
    }

    #[test]
    fn validation_reports_unknown_references() {
        let catalog = Catalog::from_definitions([sword()], [vantage()]).unwrap();
        let mut state = CombatState::with_seed(1);
        state.insert_unit(
            UnitState::new(UnitId(1), "Seth", Team::Player, Position::ORIGIN).with_skill("luna"),
        );
        state.insert_item(ItemState::new(ItemId(1), "iron_sword"));
        assert_eq!(
            catalog.validate(&state),
            Err(ContentError::UnknownSkill {
                unit: UnitId(1),
                skill: "luna".into(),
            })
        );

        state.insert_item(ItemState::new(ItemId(2), "silver_lance"));
        assert!(matches!(
            catalog.validate(&state),
            Err(ContentError::UnknownItem { item: ItemId(2), .. })
        ));
    }
}
