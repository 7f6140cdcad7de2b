//! Combat setup: turns a start request into validated engagements.
//!
//! Everything here is read-only. A setup that fails validation never reaches
//! the solver, so no action is recorded for it.
use super::CombatError;
use crate::aggregate::{Aggregator, Hook, HookContext, Layers};
use crate::env::{CombatEnv, OracleError};
use crate::formula::CombatMode;
use crate::state::{BoardQuery, ItemId, ItemState, Position, UnitId, UnitState};

/// Range used by items that declare none: adjacent only.
const DEFAULT_RANGE: (u32, u32) = (1, 1);

/// Start-combat request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSetup {
    pub attacker: UnitId,
    pub item: ItemId,
    pub targets: Vec<Position>,
    /// Directive tokens for authored combats.
    #[cfg_attr(feature = "serde", serde(default))]
    pub script: Vec<String>,
}

impl CombatSetup {
    pub fn new(attacker: UnitId, item: ItemId) -> Self {
        Self {
            attacker,
            item,
            targets: Vec::new(),
            script: Vec::new(),
        }
    }

    pub fn targeting(mut self, position: Position) -> Self {
        self.targets.push(position);
        self
    }

    pub fn with_script<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script = tokens.into_iter().map(Into::into).collect();
        self
    }
}

/// One (item, target position) pair the attacker resolves each exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Engagement {
    pub item: ItemId,
    pub position: Position,
    /// Unit standing on `position`, if any.
    pub defender: Option<UnitId>,
    /// Other units caught in the item's blast, ordered by id.
    pub splash: Vec<UnitId>,
}

/// Validated combat layout.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedSetup {
    pub attacker: UnitId,
    pub item: ItemId,
    pub engagements: Vec<Engagement>,
    /// Opponent of a one-on-one combat. Multi-engagement combats have none.
    pub defender: Option<UnitId>,
    /// Item the defender fights back with.
    pub def_item: Option<ItemId>,
    /// Whether the defender met every counter requirement at setup.
    pub can_counter: bool,
}

impl ResolvedSetup {
    /// Item driving phase logic (doubling, multiattacks) for the attacker.
    pub fn primary_item(&self) -> ItemId {
        self.engagements
            .first()
            .map_or(self.item, |engagement| engagement.item)
    }
}

/// Validates `setup` against the board.
pub fn resolve(
    env: CombatEnv<'_>,
    board: &dyn BoardQuery,
    setup: &CombatSetup,
) -> Result<ResolvedSetup, CombatError> {
    let agg = Aggregator::new(env.components);
    let attacker = board
        .unit(setup.attacker)
        .ok_or(OracleError::UnitNotFound(setup.attacker))?;
    if !attacker.is_alive() {
        return Err(CombatError::AttackerDown(attacker.id));
    }
    let item = board
        .item(setup.item)
        .ok_or(OracleError::ItemNotFound(setup.item))?;
    if setup.targets.is_empty() {
        return Err(CombatError::NoTargets);
    }

    // Sequence items resolve one engagement per sub-item, reusing the last
    // position once positions run out.
    let plan: Vec<(&ItemState, Position)> = if item.is_sequence() {
        item.subitems
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let sub = board.item(*id).ok_or(OracleError::ItemNotFound(*id))?;
                let position = setup
                    .targets
                    .get(index)
                    .or(setup.targets.last())
                    .copied()
                    .ok_or(CombatError::NoTargets)?;
                Ok((sub, position))
            })
            .collect::<Result<_, CombatError>>()?
    } else {
        setup.targets.iter().map(|position| (item, *position)).collect()
    };

    let engagements = plan
        .into_iter()
        .map(|(item, position)| engage(&agg, board, attacker, item, position))
        .collect::<Result<Vec<_>, _>>()?;

    let (defender, def_item, can_counter) = match engagements.as_slice() {
        [single] => match single.defender.and_then(|id| board.unit(id)) {
            Some(defender) if defender.id != attacker.id => {
                let def_item = defender.equipped.and_then(|id| board.item(id));
                let attacking = board.item(single.item);
                let can_counter = match (attacking, def_item) {
                    (Some(attacking), Some(def_item)) => {
                        !board.are_allies(attacker.id, defender.id)
                            && counter_allowed(&agg, attacker, attacking, defender, def_item)
                    }
                    _ => false,
                };
                (Some(defender.id), def_item.map(|item| item.id), can_counter)
            }
            _ => (None, None, false),
        },
        _ => (None, None, false),
    };

    Ok(ResolvedSetup {
        attacker: attacker.id,
        item: setup.item,
        engagements,
        defender,
        def_item,
        can_counter,
    })
}

fn engage(
    agg: &Aggregator<'_>,
    board: &dyn BoardQuery,
    attacker: &UnitState,
    item: &ItemState,
    position: Position,
) -> Result<Engagement, CombatError> {
    if !item_usable(agg, attacker, item) {
        return Err(CombatError::ItemUnusable {
            unit: attacker.id,
            item: item.id,
        });
    }
    let ctx = HookContext::new(attacker, Some(item));
    let (min, max) = range_of(agg, &ctx);
    if !(min..=max).contains(&attacker.position.manhattan(position)) {
        return Err(CombatError::OutOfRange { position, min, max });
    }

    let defender = board.unit_at(position);
    if let Some(defender) = defender {
        if !target_allowed(agg, board, attacker, item, defender) {
            return Err(CombatError::InvalidTarget { position });
        }
    }

    let splash: Vec<UnitId> = match agg.int(Hook::Blast, Layers::ITEM, &ctx) {
        Some(radius) => board
            .units_within(position, u32::try_from(radius).unwrap_or(0))
            .into_iter()
            .filter(|unit| unit.id != attacker.id && Some(unit.id) != defender.map(|d| d.id))
            .filter(|unit| target_allowed(agg, board, attacker, item, unit))
            .map(|unit| unit.id)
            .collect(),
        None => Vec::new(),
    };

    if defender.is_none() && splash.is_empty() {
        return Err(CombatError::InvalidTarget { position });
    }
    Ok(Engagement {
        item: item.id,
        position,
        defender: defender.map(|unit| unit.id),
        splash,
    })
}

/// `[min, max]` Manhattan range of the item in `ctx`.
pub(super) fn range_of(agg: &Aggregator<'_>, ctx: &HookContext<'_>) -> (u32, u32) {
    agg.range(Hook::Range, Layers::ITEM, ctx).unwrap_or(DEFAULT_RANGE)
}

/// Living wielder, uses left, not broken, and no component forbids it.
pub(super) fn item_usable(agg: &Aggregator<'_>, unit: &UnitState, item: &ItemState) -> bool {
    let ctx = HookContext::new(unit, Some(item));
    unit.is_alive()
        && !item.is_depleted()
        && !agg.any(Hook::IsBroken, Layers::ITEM, &ctx)
        && agg.flag(Hook::Usable, Layers::ALL, &ctx).unwrap_or(true)
}

fn target_allowed(
    agg: &Aggregator<'_>,
    board: &dyn BoardQuery,
    attacker: &UnitState,
    item: &ItemState,
    target: &UnitState,
) -> bool {
    let def_item = target.equipped.and_then(|id| board.item(id));
    let ctx = HookContext::new(attacker, Some(item)).against(Some(target), def_item);
    agg.all(Hook::TargetRestrict, Layers::ITEM, &ctx)
}

/// Counter requirements that depend on components and positions.
fn counter_allowed(
    agg: &Aggregator<'_>,
    attacker: &UnitState,
    attacking: &ItemState,
    defender: &UnitState,
    def_item: &ItemState,
) -> bool {
    let attack_ctx =
        HookContext::new(attacker, Some(attacking)).against(Some(defender), Some(def_item));
    if agg.any(Hook::Uncounterable, Layers::ALL, &attack_ctx) {
        return false;
    }
    let def_ctx = HookContext::new(defender, Some(def_item))
        .against(Some(attacker), Some(attacking))
        .in_mode(CombatMode::Defense);
    let (min, max) = range_of(agg, &def_ctx);
    item_usable(agg, defender, def_item)
        && agg.int(Hook::BaseDamage, Layers::ITEM, &def_ctx).is_some()
        && !agg.any(Hook::CannotCounter, Layers::ALL, &def_ctx)
        && agg.all(Hook::TargetRestrict, Layers::ITEM, &def_ctx)
        && (min..=max).contains(&defender.position.manhattan(attacker.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::HookValue;
    use crate::config::CombatConfig;
    use crate::state::{CombatState, Team};
    use crate::testing::{Fixed, TestCatalog, standard_tables};

    fn board() -> CombatState {
        let mut state = CombatState::with_seed(5);
        let units = [
            (1, Team::Player, Position::new(0, 0), 1),
            (2, Team::Enemy, Position::new(1, 0), 2),
            (3, Team::Enemy, Position::new(2, 0), 3),
            (4, Team::Player, Position::new(0, 1), 4),
        ];
        for (id, team, position, item) in units {
            state.insert_unit(
                UnitState::new(UnitId(id), "u", team, position)
                    .with_hp(20)
                    .with_item(ItemId(item)),
            );
            state.insert_item(ItemState::new(ItemId(item), "lance").owned_by(UnitId(id)));
        }
        state.insert_item(ItemState::new(ItemId(10), "javelin").owned_by(UnitId(1)));
        state.insert_item(ItemState::new(ItemId(11), "bolting").owned_by(UnitId(1)));
        state
    }

    fn catalog() -> TestCatalog {
        let enemies_only = Fixed::new("enemies")
            .with(Hook::TargetRestrict, HookValue::Bool(false))
            .boxed();
        TestCatalog::new()
            .item(
                "lance",
                vec![Fixed::new("damage").with(Hook::BaseDamage, HookValue::Int(7)).boxed()],
            )
            .item(
                "javelin",
                vec![
                    Fixed::new("damage").with(Hook::BaseDamage, HookValue::Int(6)).boxed(),
                    Fixed::new("range")
                        .with(Hook::Range, HookValue::Range { min: 1, max: 2 })
                        .with(Hook::Uncounterable, HookValue::Bool(true))
                        .boxed(),
                ],
            )
            .item(
                "bolting",
                vec![
                    Fixed::new("range")
                        .with(Hook::Range, HookValue::Range { min: 1, max: 5 })
                        .with(Hook::Blast, HookValue::Int(1))
                        .boxed(),
                    enemies_only,
                ],
            )
    }

    #[test]
    fn single_adjacent_target_can_counter() {
        let state = board();
        let catalog = catalog();
        let tables = standard_tables();
        let config = CombatConfig::default();
        let env = CombatEnv::new(&catalog, &tables, &config);
        let setup = CombatSetup::new(UnitId(1), ItemId(1)).targeting(Position::new(1, 0));

        let resolved = resolve(env, &state, &setup).unwrap();
        assert_eq!(resolved.defender, Some(UnitId(2)));
        assert_eq!(resolved.def_item, Some(ItemId(2)));
        assert!(resolved.can_counter);
        assert!(resolved.engagements[0].splash.is_empty());
    }

    #[test]
    fn uncounterable_and_out_of_counter_range() {
        let state = board();
        let catalog = catalog();
        let tables = standard_tables();
        let config = CombatConfig::default();
        let env = CombatEnv::new(&catalog, &tables, &config);

        let setup = CombatSetup::new(UnitId(1), ItemId(10)).targeting(Position::new(2, 0));
        let resolved = resolve(env, &state, &setup).unwrap();
        assert_eq!(resolved.defender, Some(UnitId(3)));
        assert!(!resolved.can_counter);

        let setup = CombatSetup::new(UnitId(1), ItemId(1)).targeting(Position::new(2, 0));
        assert_eq!(
            resolve(env, &state, &setup),
            Err(CombatError::OutOfRange {
                position: Position::new(2, 0),
                min: 1,
                max: 1
            })
        );
    }

    #[test]
    fn target_restrictions_reject_and_filter() {
        let state = board();
        let catalog = catalog();
        let tables = standard_tables();
        let config = CombatConfig::default();
        let env = CombatEnv::new(&catalog, &tables, &config);

        // Every target fails the restriction, so the populated tile is rejected.
        let setup = CombatSetup::new(UnitId(1), ItemId(11)).targeting(Position::new(1, 0));
        assert_eq!(
            resolve(env, &state, &setup),
            Err(CombatError::InvalidTarget {
                position: Position::new(1, 0)
            })
        );
        // An empty tile with nobody valid in the blast is rejected as well.
        let setup = CombatSetup::new(UnitId(1), ItemId(11)).targeting(Position::new(2, 2));
        assert!(matches!(
            resolve(env, &state, &setup),
            Err(CombatError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn blast_collects_splash_targets() {
        let state = board();
        let catalog = TestCatalog::new().item(
            "bolting",
            vec![
                Fixed::new("range")
                    .with(Hook::Range, HookValue::Range { min: 1, max: 5 })
                    .with(Hook::Blast, HookValue::Int(1))
                    .boxed(),
            ],
        );
        let tables = standard_tables();
        let config = CombatConfig::default();
        let env = CombatEnv::new(&catalog, &tables, &config);

        let setup = CombatSetup::new(UnitId(1), ItemId(11)).targeting(Position::new(2, 0));
        let resolved = resolve(env, &state, &setup).unwrap();
        let engagement = &resolved.engagements[0];
        assert_eq!(engagement.defender, Some(UnitId(3)));
        // Unit 2 is within one tile of (2, 0); the attacker is excluded.
        assert_eq!(engagement.splash, vec![UnitId(2)]);
    }

    #[test]
    fn sequence_items_reuse_the_last_position() {
        let mut state = board();
        state.insert_item(
            ItemState::new(ItemId(20), "combo").with_subitems(vec![ItemId(1), ItemId(1)]),
        );
        let catalog = catalog();
        let tables = standard_tables();
        let config = CombatConfig::default();
        let env = CombatEnv::new(&catalog, &tables, &config);

        let setup = CombatSetup::new(UnitId(1), ItemId(20)).targeting(Position::new(1, 0));
        let resolved = resolve(env, &state, &setup).unwrap();
        assert_eq!(resolved.engagements.len(), 2);
        assert!(resolved.engagements.iter().all(|e| e.position == Position::new(1, 0)));
        // Two engagements: no one-on-one counter.
        assert_eq!(resolved.defender, None);
        assert!(!resolved.can_counter);
    }

    #[test]
    fn depleted_items_and_missing_targets() {
        let mut state = board();
        state.item_mut(ItemId(1)).unwrap().uses = Some(0);
        let catalog = catalog();
        let tables = standard_tables();
        let config = CombatConfig::default();
        let env = CombatEnv::new(&catalog, &tables, &config);

        let setup = CombatSetup::new(UnitId(1), ItemId(1)).targeting(Position::new(1, 0));
        assert_eq!(
            resolve(env, &state, &setup),
            Err(CombatError::ItemUnusable {
                unit: UnitId(1),
                item: ItemId(1)
            })
        );
        assert_eq!(
            resolve(env, &state, &CombatSetup::new(UnitId(1), ItemId(2))),
            Err(CombatError::NoTargets)
        );
    }
}
