use bitflags::bitflags;
use tracing::warn;

use super::component::{Component, ComponentOracle, HookContext};
use super::hook::{Hook, HookValue};

bitflags! {
    /// Component layers an aggregation walks, item layer first.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Layers: u8 {
        const ITEM  = 1 << 0;
        const SKILL = 1 << 1;
        const ALL   = Self::ITEM.bits() | Self::SKILL.bits();
    }
}

/// Generic fold over the ordered component list of a (unit, item) pair.
///
/// Probe failures are logged and skipped, which leaves the hook's neutral
/// value in place (zero for sums, true for all-of, false for any-of).
#[derive(Clone, Copy)]
pub struct Aggregator<'a> {
    components: &'a dyn ComponentOracle,
}

impl<'a> Aggregator<'a> {
    pub fn new(components: &'a dyn ComponentOracle) -> Self {
        Self { components }
    }

    /// Folds every defined value of `hook` under its declared policy.
    pub fn collect(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> Option<HookValue> {
        let mut values = Vec::new();
        if let (true, Some(item)) = (layers.contains(Layers::ITEM), ctx.item) {
            for component in self.components.item_components(item) {
                values.extend(Self::probe(component, hook, ctx));
            }
        }
        if layers.contains(Layers::SKILL) {
            for component in self.components.skill_components(ctx.unit) {
                values.extend(Self::probe(component, hook, ctx));
            }
        }
        hook.policy().fold(values)
    }

    fn probe(component: &dyn Component, hook: Hook, ctx: &HookContext<'_>) -> Option<HookValue> {
        match component.probe(hook, ctx) {
            Ok(value) => value,
            Err(error) => {
                warn!(
                    component = component.name(),
                    unit = %ctx.unit.id,
                    ?hook,
                    %error,
                    "component probe failed, treating as neutral"
                );
                None
            }
        }
    }

    pub fn int(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> Option<i32> {
        self.collect(hook, layers, ctx).and_then(|v| v.as_int())
    }

    pub fn sum(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> i32 {
        self.int(hook, layers, ctx).unwrap_or(0)
    }

    pub fn product(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> i32 {
        self.int(hook, layers, ctx).unwrap_or(1)
    }

    /// Exclusive boolean, `None` when undefined.
    pub fn flag(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> Option<bool> {
        self.collect(hook, layers, ctx).and_then(|v| v.as_bool())
    }

    pub fn any(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> bool {
        self.flag(hook, layers, ctx).unwrap_or(false)
    }

    pub fn all(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> bool {
        self.flag(hook, layers, ctx).unwrap_or(true)
    }

    pub fn text(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> Option<String> {
        match self.collect(hook, layers, ctx) {
            Some(HookValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn range(&self, hook: Hook, layers: Layers, ctx: &HookContext<'_>) -> Option<(u32, u32)> {
        self.collect(hook, layers, ctx).and_then(|v| v.as_range())
    }
}
