//! In-crate fixtures: fixed-value components and a minimal component oracle.

use std::collections::BTreeMap;

use crate::aggregate::{Component, ComponentOracle, Hook, HookContext, HookValue};
use crate::env::StaticTables;
use crate::expr::ExprError;
use crate::state::{ItemState, UnitState};

/// Component answering a fixed set of hooks with constant values.
#[derive(Debug, Clone)]
pub struct Fixed {
    name: &'static str,
    values: Vec<(Hook, HookValue)>,
}

impl Fixed {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            values: Vec::new(),
        }
    }

    pub fn with(mut self, hook: Hook, value: HookValue) -> Self {
        self.values.push((hook, value));
        self
    }

    pub fn boxed(self) -> Box<dyn Component> {
        Box::new(self)
    }
}

impl Component for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn probe(&self, hook: Hook, _ctx: &HookContext<'_>) -> Result<Option<HookValue>, ExprError> {
        Ok(self
            .values
            .iter()
            .find(|(defined, _)| *defined == hook)
            .map(|(_, value)| value.clone()))
    }
}

/// Component whose every probe fails, standing in for a broken designer condition.
#[derive(Debug)]
pub struct Failing;

impl Component for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn probe(&self, _hook: Hook, _ctx: &HookContext<'_>) -> Result<Option<HookValue>, ExprError> {
        Err(ExprError::DivisionByZero)
    }
}

#[derive(Default)]
pub struct TestCatalog {
    items: BTreeMap<String, Vec<Box<dyn Component>>>,
    skills: BTreeMap<String, Vec<Box<dyn Component>>>,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, nid: &str, components: Vec<Box<dyn Component>>) -> Self {
        self.items.insert(nid.to_string(), components);
        self
    }

    pub fn skill(mut self, nid: &str, components: Vec<Box<dyn Component>>) -> Self {
        self.skills.insert(nid.to_string(), components);
        self
    }
}

impl ComponentOracle for TestCatalog {
    fn item_components<'s>(&'s self, item: &ItemState) -> Vec<&'s dyn Component> {
        self.items
            .get(&item.nid)
            .map(|components| components.iter().map(|c| &**c as &'s dyn Component).collect())
            .unwrap_or_default()
    }

    fn skill_components<'s>(&'s self, unit: &UnitState) -> Vec<&'s dyn Component> {
        unit.skills
            .iter()
            .filter_map(|skill| self.skills.get(skill))
            .flat_map(|components| components.iter().map(|c| &**c as &'s dyn Component))
            .collect()
    }
}

/// Equations with small, readable coefficients.
pub fn standard_tables() -> StaticTables {
    [
        ("HIT", "SKL * 2 + LCK / 2"),
        ("AVOID", "SPD * 2 + LCK"),
        ("CRIT_HIT", "SKL / 2"),
        ("CRIT_AVOID", "LCK"),
        ("DAMAGE", "STR"),
        ("DEFENSE", "DEF"),
        ("ATTACK_SPEED", "SPD"),
        ("DEFENSE_SPEED", "SPD"),
        ("HEAL", "MAG"),
    ]
    .into_iter()
    .fold(StaticTables::new(), |mut tables, (name, text)| {
        tables
            .insert_equation(name, text)
            .expect("fixture equations parse");
        tables
    })
}
