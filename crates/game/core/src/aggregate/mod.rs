//! Modifier aggregation contract.
//!
//! Items and skills are made of components. The combat core never knows what a
//! component is; it only probes hooks through [`Component::probe`] and folds the
//! answers with the policy each [`Hook`] declares. Implementations live outside
//! the core (see the content crate).
mod aggregator;
mod component;
mod condition;
mod hook;

pub use aggregator::{Aggregator, Layers};
pub use component::{Component, ComponentOracle, HookContext};
pub use condition::evaluate_condition;
pub use hook::{Aggregation, Hook, HookValue};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::FormulaStat;
    use crate::state::{ItemId, ItemState, Position, Team, UnitId, UnitState};
    use crate::testing::{Fixed, Failing, TestCatalog};

    fn unit() -> UnitState {
        UnitState::new(UnitId(1), "Lyn", Team::Player, Position::ORIGIN)
            .with_hp(20)
            .with_skill("focus")
    }

    fn catalog() -> TestCatalog {
        TestCatalog::new()
            .item(
                "killing_edge",
                vec![
                    Fixed::new("damage").with(Hook::BaseDamage, HookValue::Int(9)).boxed(),
                    Fixed::new("crit")
                        .with(Hook::Modify(FormulaStat::CritAccuracy), HookValue::Int(30))
                        .boxed(),
                    Fixed::new("damage_again").with(Hook::BaseDamage, HookValue::Int(99)).boxed(),
                ],
            )
            .skill(
                "focus",
                vec![
                    Fixed::new("focus")
                        .with(Hook::Modify(FormulaStat::CritAccuracy), HookValue::Int(10))
                        .boxed(),
                    Fixed::new("broken").with(Hook::IsBroken, HookValue::Bool(false)).boxed(),
                ],
            )
    }

    #[test]
    fn item_layer_precedes_skill_layer() {
        let catalog = catalog();
        let agg = Aggregator::new(&catalog);
        let unit = unit();
        let item = ItemState::new(ItemId(1), "killing_edge");
        let ctx = HookContext::new(&unit, Some(&item));

        assert_eq!(agg.int(Hook::BaseDamage, Layers::ALL, &ctx), Some(9));
        assert_eq!(agg.sum(Hook::Modify(FormulaStat::CritAccuracy), Layers::ALL, &ctx), 40);
        assert_eq!(agg.sum(Hook::Modify(FormulaStat::CritAccuracy), Layers::SKILL, &ctx), 10);
        assert!(!agg.any(Hook::IsBroken, Layers::ALL, &ctx));
        assert!(agg.all(Hook::TargetRestrict, Layers::ALL, &ctx));
        assert_eq!(agg.product(Hook::TriangleModifier, Layers::ALL, &ctx), 1);
    }

    #[test]
    fn item_layer_is_skipped_without_item() {
        let catalog = catalog();
        let agg = Aggregator::new(&catalog);
        let unit = unit();
        let ctx = HookContext::new(&unit, None);
        assert_eq!(agg.int(Hook::BaseDamage, Layers::ALL, &ctx), None);
    }

    #[test]
    fn failing_probe_is_neutral() {
        let catalog = TestCatalog::new().skill(
            "focus",
            vec![
                Box::new(Failing) as Box<dyn Component>,
                Fixed::new("bonus")
                    .with(Hook::Dynamic(FormulaStat::Damage), HookValue::Int(3))
                    .boxed(),
            ],
        );
        let agg = Aggregator::new(&catalog);
        let unit = unit();
        let ctx = HookContext::new(&unit, None);
        assert_eq!(agg.sum(Hook::Dynamic(FormulaStat::Damage), Layers::ALL, &ctx), 3);
        assert!(agg.all(Hook::TargetRestrict, Layers::ALL, &ctx));
    }
}
