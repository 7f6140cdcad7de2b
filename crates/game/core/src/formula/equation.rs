use crate::env::TablesOracle;
use crate::expr::{ExprError, Scope, Value};
use crate::state::{Stat, UnitState};

/// Resolves equation identifiers: unit stats first, then other equations.
///
/// `chain` holds the equations currently being evaluated so that recursion is
/// reported instead of overflowing the stack.
pub(super) struct EquationScope<'a> {
    tables: &'a dyn TablesOracle,
    unit: &'a UnitState,
    chain: Vec<String>,
}

impl<'a> EquationScope<'a> {
    pub(super) fn new(tables: &'a dyn TablesOracle, unit: &'a UnitState) -> Self {
        Self {
            tables,
            unit,
            chain: Vec::new(),
        }
    }

    pub(super) fn evaluate(&self, name: &str) -> Result<i64, ExprError> {
        if self.chain.iter().any(|entry| entry == name) {
            return Err(ExprError::Cycle(name.to_string()));
        }
        let expr = self
            .tables
            .equation(name)
            .ok_or_else(|| ExprError::UnknownIdentifier(name.to_string()))?;

        let mut chain = self.chain.clone();
        chain.push(name.to_string());
        let nested = EquationScope {
            tables: self.tables,
            unit: self.unit,
            chain,
        };
        expr.eval_int(&nested)
    }
}

impl Scope for EquationScope<'_> {
    fn lookup(&self, name: &str) -> Result<Option<Value>, ExprError> {
        let unit = self.unit;
        let value = match name {
            "LVL" => i64::from(unit.level),
            "HP" => i64::from(unit.hp),
            "MAXHP" => i64::from(unit.max_hp),
            _ => match name.parse::<Stat>() {
                Ok(stat) => i64::from(unit.stats.get(stat)),
                Err(_) if self.tables.equation(name).is_some() => self.evaluate(name)?,
                Err(_) => return Ok(None),
            },
        };
        Ok(Some(Value::Int(value)))
    }
}
