//! Designer expression language.
//!
//! Rule-table equations (`STR + SKL / 2`) and dynamic-hook conditions
//! (`target.tag.armored && unit.hp_percent < 50`) share one small grammar:
//! integers, booleans, dotted identifiers, arithmetic, comparisons, boolean
//! connectives and a handful of functions. Expressions are parsed once and
//! evaluated against a [`Scope`] that resolves identifiers.
mod eval;
mod parser;

pub use eval::Scope;
pub use parser::parse;

use std::fmt;

use crate::error::{ErrorSeverity, GameError};

/// Evaluated expression value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }

    pub fn as_int(self) -> Result<i64, ExprError> {
        match self {
            Value::Int(v) => Ok(v),
            other => Err(ExprError::TypeMismatch {
                expected: "int",
                found: other.type_name(),
            }),
        }
    }

    pub fn as_bool(self) -> Result<bool, ExprError> {
        match self {
            Value::Bool(v) => Ok(v),
            other => Err(ExprError::TypeMismatch {
                expected: "bool",
                found: other.type_name(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Parsed expression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    /// Evaluates this expression against `scope`.
    pub fn eval(&self, scope: &dyn Scope) -> Result<Value, ExprError> {
        eval::eval(self, scope)
    }

    pub fn eval_int(&self, scope: &dyn Scope) -> Result<i64, ExprError> {
        self.eval(scope)?.as_int()
    }

    pub fn eval_bool(&self, scope: &dyn Scope) -> Result<bool, ExprError> {
        self.eval(scope)?.as_bool()
    }
}

impl std::str::FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Errors raised while parsing or evaluating an expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("cannot parse expression `{input}` near `{near}`")]
    Parse { input: String, near: String },

    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("function `{name}` expects {expected} arguments, got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    /// An equation referenced itself, directly or through other equations.
    #[error("equation `{0}` is recursive")]
    Cycle(String),
}

impl GameError for ExprError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ExprError::Cycle(_) => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ExprError::Parse { .. } => "EXPR_PARSE",
            ExprError::UnknownIdentifier(_) => "EXPR_UNKNOWN_IDENTIFIER",
            ExprError::UnknownFunction(_) => "EXPR_UNKNOWN_FUNCTION",
            ExprError::Arity { .. } => "EXPR_ARITY",
            ExprError::TypeMismatch { .. } => "EXPR_TYPE_MISMATCH",
            ExprError::DivisionByZero => "EXPR_DIVISION_BY_ZERO",
            ExprError::Overflow => "EXPR_OVERFLOW",
            ExprError::Cycle(_) => "EXPR_CYCLE",
        }
    }
}
