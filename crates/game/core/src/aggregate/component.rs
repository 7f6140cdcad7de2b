use super::hook::{Hook, HookValue};
use crate::expr::ExprError;
use crate::formula::CombatMode;
use crate::state::{ItemState, UnitState};

/// Everything a component may inspect while answering a probe.
#[derive(Clone, Copy, Debug)]
pub struct HookContext<'a> {
    pub unit: &'a UnitState,
    pub item: Option<&'a ItemState>,
    pub target: Option<&'a UnitState>,
    pub def_item: Option<&'a ItemState>,
    pub mode: CombatMode,
}

impl<'a> HookContext<'a> {
    pub fn new(unit: &'a UnitState, item: Option<&'a ItemState>) -> Self {
        Self {
            unit,
            item,
            target: None,
            def_item: None,
            mode: CombatMode::Attack,
        }
    }

    pub fn against(mut self, target: Option<&'a UnitState>, def_item: Option<&'a ItemState>) -> Self {
        self.target = target;
        self.def_item = def_item;
        self
    }

    pub fn in_mode(mut self, mode: CombatMode) -> Self {
        self.mode = mode;
        self
    }

    /// Context seen from the other side of the same exchange.
    pub fn reversed(&self) -> Option<HookContext<'a>> {
        let target = self.target?;
        Some(HookContext {
            unit: target,
            item: self.def_item,
            target: Some(self.unit),
            def_item: self.item,
            mode: self.mode.opposing(),
        })
    }
}

/// A single item or skill behavior.
///
/// Components answer capability probes: `Ok(None)` means "this component does
/// not define the hook", which is distinct from defining it as zero or false.
/// Errors come from designer-authored conditions and are treated as neutral by
/// the aggregator.
pub trait Component: core::fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn probe(&self, hook: Hook, ctx: &HookContext<'_>) -> Result<Option<HookValue>, ExprError>;
}

/// Resolves items and units to their ordered component lists.
pub trait ComponentOracle {
    /// Components of the item's definition, in declaration order.
    fn item_components<'s>(&'s self, item: &ItemState) -> Vec<&'s dyn Component>;

    /// Components of every skill the unit carries, skill by skill.
    fn skill_components<'s>(&'s self, unit: &UnitState) -> Vec<&'s dyn Component>;
}
