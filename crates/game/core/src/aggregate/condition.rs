//! Designer conditions evaluated against a hook context.
//!
//! Identifiers:
//! - `unit.<field>` / `target.<field>` where field is a stat (`str`, `skl`,
//!   ...), `hp`, `max_hp`, `hp_percent`, `level`, `tag.<name>` or
//!   `status.<name>`
//! - `is_attack`, `is_defense`, `is_splash`

use super::component::HookContext;
use crate::expr::{Expr, ExprError, Scope, Value};
use crate::formula::CombatMode;
use crate::state::{Stat, UnitState};

struct ConditionScope<'c, 'a> {
    ctx: &'c HookContext<'a>,
}

impl Scope for ConditionScope<'_, '_> {
    fn lookup(&self, name: &str) -> Result<Option<Value>, ExprError> {
        let value = match name {
            "is_attack" => Some(Value::Bool(self.ctx.mode == CombatMode::Attack)),
            "is_defense" => Some(Value::Bool(self.ctx.mode == CombatMode::Defense)),
            "is_splash" => Some(Value::Bool(self.ctx.mode == CombatMode::Splash)),
            _ => match name.split_once('.') {
                Some(("unit", field)) => unit_field(self.ctx.unit, field),
                Some(("target", field)) => self.ctx.target.and_then(|t| unit_field(t, field)),
                _ => None,
            },
        };
        Ok(value)
    }
}

fn unit_field(unit: &UnitState, field: &str) -> Option<Value> {
    if let Some(tag) = field.strip_prefix("tag.") {
        return Some(Value::Bool(unit.tags.contains(tag)));
    }
    if let Some(status) = field.strip_prefix("status.") {
        return Some(Value::Bool(unit.statuses.contains(status)));
    }
    let value = match field {
        "hp" => i64::from(unit.hp),
        "max_hp" => i64::from(unit.max_hp),
        "hp_percent" => unit.hp_percent(),
        "level" => i64::from(unit.level),
        other => i64::from(unit.stats.get(other.parse::<Stat>().ok()?)),
    };
    Some(Value::Int(value))
}

/// Evaluates a parsed condition; the result must be boolean.
pub fn evaluate_condition(condition: &Expr, ctx: &HookContext<'_>) -> Result<bool, ExprError> {
    condition.eval_bool(&ConditionScope { ctx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Position, Team, UnitId, UnitStats};

    fn unit(id: u32, hp: u32) -> UnitState {
        let mut unit = UnitState::new(UnitId(id), "u", Team::Player, Position::ORIGIN)
            .with_hp(40)
            .with_stats(UnitStats {
                str: 12,
                ..UnitStats::default()
            })
            .with_tag("armored");
        unit.hp = hp;
        unit
    }

    fn check(text: &str, ctx: &HookContext<'_>) -> Result<bool, ExprError> {
        evaluate_condition(&text.parse::<Expr>()?, ctx)
    }

    #[test]
    fn reads_unit_and_target_fields() {
        let me = unit(1, 10);
        let foe = unit(2, 40);
        let ctx = HookContext::new(&me, None).against(Some(&foe), None);
        assert_eq!(check("unit.hp_percent < 50 && target.tag.armored", &ctx), Ok(true));
        assert_eq!(check("unit.str == 12 && !unit.tag.flying", &ctx), Ok(true));
        assert_eq!(check("is_attack && !is_splash", &ctx), Ok(true));
        assert_eq!(
            check("is_defense", &ctx.in_mode(CombatMode::Defense)),
            Ok(true)
        );
    }

    #[test]
    fn missing_target_is_an_error() {
        let me = unit(1, 10);
        let ctx = HookContext::new(&me, None);
        assert_eq!(
            check("target.hp > 0", &ctx),
            Err(ExprError::UnknownIdentifier("target.hp".into()))
        );
    }

    #[test]
    fn non_boolean_condition_is_an_error() {
        let me = unit(1, 10);
        let ctx = HookContext::new(&me, None);
        assert!(matches!(
            check("unit.hp + 1", &ctx),
            Err(ExprError::TypeMismatch { .. })
        ));
    }
}
