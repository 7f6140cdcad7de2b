//! Standard component vocabulary.
//!
//! Designers write items and skills as lists of [`ComponentSpec`]s. A spec is
//! compiled once into a [`StandardComponent`], which parses any designer
//! conditions up front and then answers hook probes during combat.
//!
//! ```ron
//! components: [
//!     WeaponType("sword"),
//!     Damage(5), Hit(90), Crit(0),
//!     Effective(tag: "armored", damage: 9),
//!     Conditional(when: "unit.hp_percent < 50", then: Modify(crit_accuracy, 15)),
//! ]
//! ```
use tactics_core::aggregate::{Component, Hook, HookContext, HookValue, evaluate_condition};
use tactics_core::expr::{Expr, ExprError};
use tactics_core::formula::{EquationSlot, FormulaStat};

use crate::error::ContentError;

/// Authored form of a component.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentSpec {
    WeaponType(String),
    Damage(i32),
    Hit(i32),
    Crit(i32),
    Heal(i32),
    /// Replaces the rule-table equation used for one formula slot.
    Equation(EquationSlot, String),
    /// Equation the target defends with instead of `DEFENSE`.
    ResistEquation(String),
    Range(u32, u32),
    Blast(u32),
    Usable(bool),
    Modify(FormulaStat, i32),
    Dynamic(FormulaStat, i32),
    /// Extra damage against targets carrying `tag`.
    Effective { tag: String, damage: i32 },
    /// One extra strike per phase.
    Brave,
    /// Inverts the weapon triangle.
    Reaver,
    TriangleModifier(i32),
    NoDouble,
    Vantage,
    CannotCounter,
    Uncounterable,
    TargetsEnemies,
    TargetsAllies,
    /// Only the unit with this name may use the item.
    PersonalWeapon(String),
    InflictStatus(String),
    ExpBonus(i32),
    /// Gates `then` behind a designer condition.
    Conditional {
        when: String,
        then: Box<ComponentSpec>,
    },
}

/// Compiled component: the innermost spec plus every condition gating it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandardComponent {
    effect: ComponentSpec,
    conditions: Vec<Expr>,
}

impl StandardComponent {
    /// Flattens nested `Conditional`s and parses their conditions. `owner`
    /// names the item or skill in error messages.
    pub fn compile(owner: &str, spec: &ComponentSpec) -> Result<Self, ContentError> {
        let mut conditions = Vec::new();
        let mut current = spec;
        while let ComponentSpec::Conditional { when, then } = current {
            let condition = when.parse::<Expr>().map_err(|source| ContentError::Condition {
                owner: owner.to_string(),
                text: when.clone(),
                source,
            })?;
            conditions.push(condition);
            current = then;
        }
        Ok(Self {
            effect: current.clone(),
            conditions,
        })
    }

    pub fn effect(&self) -> &ComponentSpec {
        &self.effect
    }

    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Value the effect gives `hook`, ignoring conditions.
    fn answer(&self, hook: Hook, ctx: &HookContext<'_>) -> Option<HookValue> {
        use ComponentSpec as S;
        let int = |v: i32| Some(HookValue::Int(v));
        let text = |v: &String| Some(HookValue::Text(v.clone()));

        match (&self.effect, hook) {
            (S::WeaponType(kind), Hook::WeaponType) => text(kind),
            (S::Damage(v), Hook::BaseDamage) => int(*v),
            (S::Hit(v), Hook::BaseHit) => int(*v),
            (S::Crit(v), Hook::BaseCrit) => int(*v),
            (S::Heal(v), Hook::BaseHeal) => int(*v),
            (S::Equation(slot, name), Hook::Equation(probed)) if *slot == probed => text(name),
            (S::ResistEquation(name), Hook::ResistEquation) => text(name),
            (S::Range(min, max), Hook::Range) => Some(HookValue::Range {
                min: *min,
                max: *max,
            }),
            (S::Blast(radius), Hook::Blast) => int(i32::try_from(*radius).unwrap_or(i32::MAX)),
            (S::Usable(usable), Hook::Usable) => Some(HookValue::Bool(*usable)),
            (S::PersonalWeapon(owner), Hook::Usable) => {
                Some(HookValue::Bool(ctx.unit.name == *owner))
            }
            (S::Modify(stat, v), Hook::Modify(probed)) if *stat == probed => int(*v),
            (S::Dynamic(stat, v), Hook::Dynamic(probed)) if *stat == probed => int(*v),
            (S::Effective { tag, damage }, Hook::Dynamic(FormulaStat::Damage)) => ctx
                .target
                .filter(|target| target.tags.contains(tag))
                .and_then(|_| int(*damage)),
            (S::Brave, Hook::DynamicMultiattacks) => int(1),
            (S::Reaver, Hook::TriangleModifier) => int(-1),
            (S::TriangleModifier(v), Hook::TriangleModifier) => int(*v),
            (S::NoDouble, Hook::NoDouble)
            | (S::Vantage, Hook::Vantage)
            | (S::CannotCounter, Hook::CannotCounter)
            | (S::Uncounterable, Hook::Uncounterable) => Some(HookValue::Bool(true)),
            (S::TargetsEnemies, Hook::TargetRestrict) => ctx
                .target
                .map(|target| HookValue::Bool(!target.team.is_allied_with(ctx.unit.team))),
            (S::TargetsAllies, Hook::TargetRestrict) => ctx
                .target
                .map(|target| HookValue::Bool(target.team.is_allied_with(ctx.unit.team))),
            (S::InflictStatus(status), Hook::InflictStatus) => text(status),
            (S::ExpBonus(v), Hook::ModifyExp) => int(*v),
            _ => None,
        }
    }
}

impl Component for StandardComponent {
    fn name(&self) -> &str {
        (&self.effect).into()
    }

    fn probe(&self, hook: Hook, ctx: &HookContext<'_>) -> Result<Option<HookValue>, ExprError> {
        let Some(value) = self.answer(hook, ctx) else {
            return Ok(None);
        };
        // Conditions are only evaluated for hooks the effect defines.
        for condition in &self.conditions {
            if !evaluate_condition(condition, ctx)? {
                return Ok(None);
            }
        }
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::formula::CombatMode;
    use tactics_core::state::{Position, Team, UnitId, UnitState};

    use super::*;

    fn unit(id: u32, team: Team) -> UnitState {
        UnitState::new(UnitId(id), format!("unit{id}"), team, Position::ORIGIN).with_hp(20)
    }

    fn compile(spec: ComponentSpec) -> StandardComponent {
        StandardComponent::compile("test", &spec).unwrap()
    }

    #[test]
    fn undefined_hooks_are_not_answered() {
        let me = unit(1, Team::Player);
        let ctx = HookContext::new(&me, None);
        let damage = compile(ComponentSpec::Damage(5));
        assert_eq!(damage.probe(Hook::BaseDamage, &ctx), Ok(Some(HookValue::Int(5))));
        assert_eq!(damage.probe(Hook::BaseHit, &ctx), Ok(None));
        assert_eq!(
            compile(ComponentSpec::Modify(FormulaStat::Avoid, 10))
                .probe(Hook::Modify(FormulaStat::Accuracy), &ctx),
            Ok(None)
        );
    }

    #[test]
    fn effectiveness_depends_on_target_tags() {
        let me = unit(1, Team::Player);
        let knight = unit(2, Team::Enemy).with_tag("armored");
        let cavalier = unit(3, Team::Enemy);
        let rapier = compile(ComponentSpec::Effective {
            tag: "armored".into(),
            damage: 9,
        });
        let hook = Hook::Dynamic(FormulaStat::Damage);

        let ctx = HookContext::new(&me, None).against(Some(&knight), None);
        assert_eq!(rapier.probe(hook, &ctx), Ok(Some(HookValue::Int(9))));
        let ctx = HookContext::new(&me, None).against(Some(&cavalier), None);
        assert_eq!(rapier.probe(hook, &ctx), Ok(None));
    }

    #[test]
    fn target_restrictions_follow_alliances() {
        let me = unit(1, Team::Player);
        let friend = unit(2, Team::Ally);
        let foe = unit(3, Team::Enemy);
        let enemies = compile(ComponentSpec::TargetsEnemies);
        let allies = compile(ComponentSpec::TargetsAllies);

        let vs_friend = HookContext::new(&me, None).against(Some(&friend), None);
        let vs_foe = HookContext::new(&me, None).against(Some(&foe), None);
        assert_eq!(enemies.probe(Hook::TargetRestrict, &vs_friend), Ok(Some(HookValue::Bool(false))));
        assert_eq!(enemies.probe(Hook::TargetRestrict, &vs_foe), Ok(Some(HookValue::Bool(true))));
        assert_eq!(allies.probe(Hook::TargetRestrict, &vs_friend), Ok(Some(HookValue::Bool(true))));
    }

    #[test]
    fn nested_conditions_all_gate_the_effect() {
        let mut me = unit(1, Team::Player);
        let spec = ComponentSpec::Conditional {
            when: "is_defense".into(),
            then: Box::new(ComponentSpec::Conditional {
                when: "unit.hp_percent <= 50".into(),
                then: Box::new(ComponentSpec::Modify(FormulaStat::Avoid, 30)),
            }),
        };
        let component = compile(spec);
        assert!(component.is_conditional());
        assert_eq!(component.name(), "modify");
        let hook = Hook::Modify(FormulaStat::Avoid);

        let ctx = HookContext::new(&me, None).in_mode(CombatMode::Defense);
        assert_eq!(component.probe(hook, &ctx), Ok(None));

        me.hp = 10;
        let ctx = HookContext::new(&me, None).in_mode(CombatMode::Defense);
        assert_eq!(component.probe(hook, &ctx), Ok(Some(HookValue::Int(30))));
        let ctx = HookContext::new(&me, None);
        assert_eq!(component.probe(hook, &ctx), Ok(None));
    }

    #[test]
    fn broken_conditions_fail_at_compile_or_probe_time() {
        let bad = ComponentSpec::Conditional {
            when: "unit.hp <".into(),
            then: Box::new(ComponentSpec::Vantage),
        };
        assert!(matches!(
            StandardComponent::compile("wary", &bad),
            Err(ContentError::Condition { owner, .. }) if owner == "wary"
        ));

        // Parses, but `target` is absent outside an exchange.
        let me = unit(1, Team::Player);
        let component = compile(ComponentSpec::Conditional {
            when: "target.hp > 0".into(),
            then: Box::new(ComponentSpec::Vantage),
        });
        assert!(component.probe(Hook::Vantage, &HookContext::new(&me, None)).is_err());
        // Hooks the effect does not define never evaluate the condition.
        assert_eq!(component.probe(Hook::NoDouble, &HookContext::new(&me, None)), Ok(None));
    }

    #[test]
    fn personal_weapons_check_the_wielder() {
        let me = unit(1, Team::Player);
        let component = compile(ComponentSpec::PersonalWeapon("unit1".into()));
        let ctx = HookContext::new(&me, None);
        assert_eq!(component.probe(Hook::Usable, &ctx), Ok(Some(HookValue::Bool(true))));
        let other = unit(2, Team::Player);
        let ctx = HookContext::new(&other, None);
        assert_eq!(component.probe(Hook::Usable, &ctx), Ok(Some(HookValue::Bool(false))));
    }
}
