use tracing::trace;

use super::equation::EquationScope;
use super::{EquationSlot, FormulaError, FormulaInputs, FormulaStat};
use crate::aggregate::{Aggregator, Hook, Layers};
use crate::env::CombatEnv;
use crate::expr::ExprError;
use crate::state::{BoardQuery, SupportRank, UnitState};

/// Pure formula evaluation over a read-only board.
#[derive(Clone, Copy)]
pub struct FormulaEngine<'a> {
    env: CombatEnv<'a>,
    board: &'a dyn BoardQuery,
    agg: Aggregator<'a>,
}

impl<'a> FormulaEngine<'a> {
    pub fn new(env: CombatEnv<'a>, board: &'a dyn BoardQuery) -> Self {
        Self {
            env,
            board,
            agg: Aggregator::new(env.components),
        }
    }

    pub fn aggregator(&self) -> Aggregator<'a> {
        self.agg
    }

    // ===== single-side formulas (steps 1-6) =====

    pub fn accuracy(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::Accuracy, inputs)
    }

    pub fn avoid(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::Avoid, inputs)
    }

    pub fn crit_accuracy(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::CritAccuracy, inputs)
    }

    pub fn crit_avoid(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::CritAvoid, inputs)
    }

    pub fn damage(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::Damage, inputs)
    }

    pub fn defense(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::Defense, inputs)
    }

    pub fn attack_speed(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::AttackSpeed, inputs)
    }

    pub fn defense_speed(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        self.stat(FormulaStat::DefenseSpeed, inputs)
    }

    /// Runs pipeline steps 1-6 for one formula category.
    ///
    /// Returns `None` when the item lacks the base hook the category needs.
    pub fn stat(
        &self,
        stat: FormulaStat,
        inputs: &FormulaInputs<'_>,
    ) -> Result<Option<i32>, FormulaError> {
        let base = match stat.base_hook() {
            Some(hook) => match self.agg.int(hook, Layers::ITEM, inputs) {
                Some(base) => base,
                None => return Ok(None),
            },
            None => 0,
        };

        let name = self.equation_name(EquationSlot::for_stat(stat), inputs);
        let equation = self.equation(&name, inputs.unit)?;
        let rank = self.rank_bonus(stat, inputs);
        let modify = self.agg.sum(Hook::Modify(stat), Layers::ALL, inputs);
        let support = self.support_bonus(stat, inputs.unit);

        let subtotal = base
            .saturating_add(equation)
            .saturating_add(rank)
            .saturating_add(modify);
        let truncated = (f64::from(subtotal) + f64::from(support)).trunc() as i32;
        let triangle = self.triangle(stat, inputs);

        trace!(
            unit = %inputs.unit.id,
            %stat,
            base,
            equation,
            rank,
            modify,
            support,
            triangle,
            "formula breakdown"
        );
        Ok(Some(truncated.saturating_add(triangle)))
    }

    /// Evaluates a named rule-table equation against a unit's live stats.
    pub fn equation(&self, name: &str, unit: &UnitState) -> Result<i32, FormulaError> {
        if self.env.tables.equation(name).is_none() {
            return Err(FormulaError::UnknownEquation(name.to_string()));
        }
        let to_error = |source| FormulaError::Equation {
            equation: name.to_string(),
            source,
        };
        let value = EquationScope::new(self.env.tables, unit)
            .evaluate(name)
            .map_err(to_error)?;
        i32::try_from(value).map_err(|_| to_error(ExprError::Overflow))
    }

    fn equation_name(&self, slot: EquationSlot, inputs: &FormulaInputs<'_>) -> String {
        if let Some(name) = self.agg.text(Hook::Equation(slot), Layers::ALL, inputs) {
            return name;
        }
        if slot == EquationSlot::Defense {
            // The incoming item decides which stat resists it.
            if let Some(resist) = inputs
                .reversed()
                .and_then(|attacker| self.agg.text(Hook::ResistEquation, Layers::ITEM, &attacker))
            {
                return resist;
            }
        }
        slot.default_name().to_string()
    }

    fn weapon_type(&self, inputs: &FormulaInputs<'_>) -> Option<String> {
        self.agg.text(Hook::WeaponType, Layers::ITEM, inputs)
    }

    fn rank_bonus(&self, stat: FormulaStat, inputs: &FormulaInputs<'_>) -> i32 {
        let Some(weapon_type) = self.weapon_type(inputs) else {
            return 0;
        };
        let exp = inputs.unit.weapon_exp_for(&weapon_type);
        self.env
            .tables
            .rank_bonus(&weapon_type, exp)
            .map_or(0, |bonus| bonus.get(stat))
    }

    /// Sum of bonuses from bonded, living allies within support range.
    ///
    /// When more allies qualify than the cap allows, the highest ranks win.
    fn support_bonus(&self, stat: FormulaStat, unit: &UnitState) -> f32 {
        let config = self.env.config;
        let mut ranks: Vec<SupportRank> = self
            .board
            .support_partners(unit.id)
            .into_iter()
            .filter_map(|(partner, rank)| {
                let ally = self.board.unit(partner)?;
                let in_range = ally.position.manhattan(unit.position) <= config.support_range;
                (ally.is_alive() && in_range && ally.team.is_allied_with(unit.team))
                    .then_some(rank)
            })
            .collect();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        ranks.truncate(config.support_cap);

        ranks
            .into_iter()
            .filter_map(|rank| self.env.tables.support_bonus(rank))
            .map(|bonus| bonus.get(stat))
            .sum()
    }

    /// Weapon-triangle contribution for `inputs.unit`.
    ///
    /// Entries declared for (mine vs theirs) add; entries declared for
    /// (theirs vs mine) subtract. Every matching entry counts. The total is
    /// scaled by `sign(a) * sign(d) * max(|a|, |d|)` where `a` and `d` are the
    /// two sides' triangle modifiers.
    pub fn triangle(&self, stat: FormulaStat, inputs: &FormulaInputs<'_>) -> i32 {
        let Some(opponent) = inputs.reversed() else {
            return 0;
        };
        let (Some(mine), Some(theirs)) = (self.weapon_type(inputs), self.weapon_type(&opponent))
        else {
            return 0;
        };

        let tables = self.env.tables;
        let forward: i32 = tables
            .triangle(&mine, &theirs)
            .iter()
            .map(|entry| entry.bonus.get(stat))
            .sum();
        let backward: i32 = tables
            .triangle(&theirs, &mine)
            .iter()
            .map(|entry| entry.bonus.get(stat))
            .sum();
        if forward == 0 && backward == 0 {
            return 0;
        }

        let a = self.agg.product(Hook::TriangleModifier, Layers::ALL, inputs);
        let d = self.agg.product(Hook::TriangleModifier, Layers::ALL, &opponent);
        let factor = a.signum() * d.signum() * a.abs().max(d.abs());
        (forward - backward).saturating_mul(factor)
    }

    // ===== composites (steps 7-9) =====

    /// Steps 7 and 8: subtracts the defender's counterpart stat and adds the
    /// acting unit's `Dynamic` contributions.
    fn opposed(
        &self,
        stat: FormulaStat,
        inputs: &FormulaInputs<'_>,
    ) -> Result<Option<i32>, FormulaError> {
        let Some(mut value) = self.stat(stat, inputs)? else {
            return Ok(None);
        };
        if let (Some(counterpart), Some(defender)) = (stat.counterpart(), inputs.reversed()) {
            value = value.saturating_sub(self.stat(counterpart, &defender)?.unwrap_or(0));
        }
        Ok(Some(value.saturating_add(self.dynamic(stat, inputs))))
    }

    /// Chance to hit in `[0, 100]`. Items without a hit hook always hit.
    pub fn compute_hit(&self, inputs: &FormulaInputs<'_>) -> Result<i32, FormulaError> {
        Ok(self
            .opposed(FormulaStat::Accuracy, inputs)?
            .map_or(100, |hit| hit.clamp(0, 100)))
    }

    /// Chance to crit in `[0, 100]`, `None` when the item cannot crit.
    pub fn compute_crit(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        Ok(self
            .opposed(FormulaStat::CritAccuracy, inputs)?
            .map(|crit| crit.clamp(0, 100)))
    }

    /// Damage dealt, floored at the configured minimum; `None` when the item
    /// does no damage.
    pub fn compute_damage(
        &self,
        inputs: &FormulaInputs<'_>,
        crit: bool,
    ) -> Result<Option<i32>, FormulaError> {
        let config = self.env.config;
        Ok(self.opposed(FormulaStat::Damage, inputs)?.map(|damage| {
            let damage = if crit {
                damage.saturating_mul(config.crit_multiplier)
            } else {
                damage
            };
            damage.max(config.min_damage)
        }))
    }

    /// Healing restored by the item, `None` when the item does not heal.
    pub fn compute_heal(&self, inputs: &FormulaInputs<'_>) -> Result<Option<i32>, FormulaError> {
        let Some(base) = self.agg.int(Hook::BaseHeal, Layers::ITEM, inputs) else {
            return Ok(None);
        };
        let name = self.equation_name(EquationSlot::Heal, inputs);
        let heal = base.saturating_add(self.equation(&name, inputs.unit)?);
        Ok(Some(heal.max(0)))
    }

    /// Number of full phases the acting unit gets: `2` when it outspeeds the
    /// target by at least the doubling threshold, otherwise `1`.
    pub fn outspeed(&self, inputs: &FormulaInputs<'_>) -> Result<u32, FormulaError> {
        if inputs.item.is_none() {
            return Ok(1);
        }
        let Some(defender) = inputs.reversed() else {
            return Ok(1);
        };
        if self.agg.any(Hook::NoDouble, Layers::ALL, inputs)
            || self.agg.any(Hook::NoDouble, Layers::SKILL, &defender)
        {
            return Ok(1);
        }

        let speed = self.attack_speed(inputs)?.unwrap_or(0)
            + self.dynamic(FormulaStat::AttackSpeed, inputs);
        let resist = self.defense_speed(&defender)?.unwrap_or(0)
            + self.dynamic(FormulaStat::DefenseSpeed, &defender);

        let doubles = speed - resist >= self.env.config.speed_to_double;
        Ok(if doubles { 2 } else { 1 })
    }

    /// Strikes per phase: one plus summed multiattack contributions.
    pub fn compute_multiattacks(&self, inputs: &FormulaInputs<'_>) -> u32 {
        let extra = self.agg.sum(Hook::DynamicMultiattacks, Layers::ALL, inputs);
        u32::try_from(1 + extra).unwrap_or(1).max(1)
    }

    fn dynamic(&self, stat: FormulaStat, inputs: &FormulaInputs<'_>) -> i32 {
        self.agg.sum(Hook::Dynamic(stat), Layers::ALL, inputs)
    }
}
