use super::{BinaryOp, Expr, ExprError, UnaryOp, Value};

/// Identifier resolution for expression evaluation.
///
/// Returning `Ok(None)` means the identifier is unknown in this scope.
/// Scopes that resolve identifiers by evaluating further expressions (named
/// equations) propagate their errors through `Err`.
pub trait Scope {
    fn lookup(&self, name: &str) -> Result<Option<Value>, ExprError>;
}

pub(super) fn eval(expr: &Expr, scope: &dyn Scope) -> Result<Value, ExprError> {
    match expr {
        Expr::Int(v) => Ok(Value::Int(*v)),
        Expr::Bool(v) => Ok(Value::Bool(*v)),
        Expr::Var(name) => scope
            .lookup(name)?
            .ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
        Expr::Unary(op, inner) => {
            let value = eval(inner, scope)?;
            match op {
                UnaryOp::Neg => value
                    .as_int()?
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or(ExprError::Overflow),
                UnaryOp::Not => Ok(Value::Bool(!value.as_bool()?)),
            }
        }
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            if !eval(lhs, scope)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(rhs, scope)?.as_bool()?))
        }
        Expr::Binary(BinaryOp::Or, lhs, rhs) => {
            if eval(lhs, scope)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(rhs, scope)?.as_bool()?))
        }
        Expr::Binary(op, lhs, rhs) => binary(*op, eval(lhs, scope)?, eval(rhs, scope)?),
        Expr::Call(name, args) => call(name, args, scope),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ExprError> {
    use BinaryOp::*;

    match (op, lhs, rhs) {
        (And, _, _) => return Ok(Value::Bool(lhs.as_bool()? && rhs.as_bool()?)),
        (Or, _, _) => return Ok(Value::Bool(lhs.as_bool()? || rhs.as_bool()?)),
        (Eq | Ne, Value::Bool(a), Value::Bool(b)) => {
            return Ok(Value::Bool((a == b) == (op == Eq)));
        }
        _ => {}
    }

    let (a, b) = (lhs.as_int()?, rhs.as_int()?);
    let value = match op {
        Add => Value::Int(a.checked_add(b).ok_or(ExprError::Overflow)?),
        Sub => Value::Int(a.checked_sub(b).ok_or(ExprError::Overflow)?),
        Mul => Value::Int(a.checked_mul(b).ok_or(ExprError::Overflow)?),
        // Integer division truncates toward zero.
        Div => {
            if b == 0 {
                return Err(ExprError::DivisionByZero);
            }
            Value::Int(a.checked_div(b).ok_or(ExprError::Overflow)?)
        }
        Rem => {
            if b == 0 {
                return Err(ExprError::DivisionByZero);
            }
            Value::Int(a.checked_rem(b).ok_or(ExprError::Overflow)?)
        }
        Lt => Value::Bool(a < b),
        Le => Value::Bool(a <= b),
        Gt => Value::Bool(a > b),
        Ge => Value::Bool(a >= b),
        Eq => Value::Bool(a == b),
        Ne => Value::Bool(a != b),
        And | Or => {
            return Err(ExprError::TypeMismatch {
                expected: "bool",
                found: "int",
            });
        }
    };
    Ok(value)
}

fn call(name: &str, args: &[Expr], scope: &dyn Scope) -> Result<Value, ExprError> {
    let expected = match name {
        "min" | "max" => 2,
        "clamp" => 3,
        "abs" => 1,
        _ => return Err(ExprError::UnknownFunction(name.to_string())),
    };
    if args.len() != expected {
        return Err(ExprError::Arity {
            name: name.to_string(),
            expected,
            found: args.len(),
        });
    }

    let values = args
        .iter()
        .map(|arg| eval(arg, scope)?.as_int())
        .collect::<Result<Vec<_>, _>>()?;

    let result = match (name, values.as_slice()) {
        ("min", [a, b]) => *a.min(b),
        ("max", [a, b]) => *a.max(b),
        ("clamp", [x, lo, hi]) => (*x).max(*lo).min(*hi),
        ("abs", [x]) => x.checked_abs().ok_or(ExprError::Overflow)?,
        _ => return Err(ExprError::UnknownFunction(name.to_string())),
    };
    Ok(Value::Int(result))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::parse;
    use super::*;

    struct MapScope(BTreeMap<&'static str, Value>);

    impl Scope for MapScope {
        fn lookup(&self, name: &str) -> Result<Option<Value>, ExprError> {
            Ok(self.0.get(name).copied())
        }
    }

    fn scope() -> MapScope {
        MapScope(BTreeMap::from([
            ("STR", Value::Int(7)),
            ("SKL", Value::Int(9)),
            ("target.tag.armored", Value::Bool(true)),
        ]))
    }

    fn run(text: &str) -> Result<Value, ExprError> {
        parse(text)?.eval(&scope())
    }

    #[test]
    fn arithmetic_with_truncating_division() {
        assert_eq!(run("STR + SKL / 2"), Ok(Value::Int(11)));
        assert_eq!(run("-7 / 2"), Ok(Value::Int(-3)));
        assert_eq!(run("-7 % 2"), Ok(Value::Int(-1)));
        assert_eq!(run("(STR + 1) * 2"), Ok(Value::Int(16)));
    }

    #[test]
    fn functions() {
        assert_eq!(run("min(STR, SKL)"), Ok(Value::Int(7)));
        assert_eq!(run("max(STR, SKL)"), Ok(Value::Int(9)));
        assert_eq!(run("clamp(SKL * 20, 0, 100)"), Ok(Value::Int(100)));
        assert_eq!(run("abs(STR - SKL)"), Ok(Value::Int(2)));
        assert!(matches!(run("min(1)"), Err(ExprError::Arity { .. })));
        assert!(matches!(run("sqrt(4)"), Err(ExprError::UnknownFunction(_))));
    }

    #[test]
    fn boolean_logic_short_circuits() {
        assert_eq!(run("target.tag.armored && STR > 5"), Ok(Value::Bool(true)));
        // The right-hand side would fail, but is never evaluated.
        assert_eq!(run("false && missing > 1"), Ok(Value::Bool(false)));
        assert_eq!(run("true || missing > 1"), Ok(Value::Bool(true)));
        assert_eq!(run("!target.tag.armored == false"), Ok(Value::Bool(true)));
    }

    #[test]
    fn evaluation_errors() {
        assert_eq!(run("STR / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(
            run("LUCK + 1"),
            Err(ExprError::UnknownIdentifier("LUCK".into()))
        );
        assert!(matches!(
            run("STR && true"),
            Err(ExprError::TypeMismatch { .. })
        ));
        assert_eq!(run("9223372036854775807 + 1"), Err(ExprError::Overflow));
    }
}
