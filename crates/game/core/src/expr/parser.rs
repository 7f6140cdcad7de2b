//! `nom` grammar for designer expressions.
//!
//! Precedence, loosest first: `||`, `&&`, comparisons (non-associative),
//! `+ -`, `* / %`, unary `! -`, atoms. Binary operators associate left.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::{many0, many0_count, separated_list0},
    sequence::{delimited, pair, preceded},
};

use super::{BinaryOp, Expr, ExprError, UnaryOp};

type Res<'a, T> = IResult<&'a str, T>;

/// Parses a complete expression; trailing input is an error.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    match all_consuming(ws(or_expr)).parse(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => Err(ExprError::Parse {
            input: input.to_string(),
            near: err.input.to_string(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(ExprError::Parse {
            input: input.to_string(),
            near: String::new(),
        }),
    }
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn binary_chain<'a>(
    input: &'a str,
    operand: fn(&'a str) -> Res<'a, Expr>,
    operator: fn(&'a str) -> Res<'a, BinaryOp>,
) -> Res<'a, Expr> {
    let (input, first) = operand(input)?;
    let (input, rest) = many0(pair(ws(operator), operand)).parse(input)?;
    let expr = rest.into_iter().fold(first, |lhs, (op, rhs)| {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    });
    Ok((input, expr))
}

fn or_expr(input: &str) -> Res<'_, Expr> {
    binary_chain(input, and_expr, or_op)
}

fn and_expr(input: &str) -> Res<'_, Expr> {
    binary_chain(input, comparison, and_op)
}

fn comparison(input: &str) -> Res<'_, Expr> {
    let (input, lhs) = sum(input)?;
    let (input, rhs) = opt(pair(ws(comparison_op), sum)).parse(input)?;
    let expr = match rhs {
        Some((op, rhs)) => Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
        None => lhs,
    };
    Ok((input, expr))
}

fn sum(input: &str) -> Res<'_, Expr> {
    binary_chain(input, term, sum_op)
}

fn term(input: &str) -> Res<'_, Expr> {
    binary_chain(input, unary, term_op)
}

fn unary(input: &str) -> Res<'_, Expr> {
    alt((
        map(preceded(ws(char('!')), unary), |e| {
            Expr::Unary(UnaryOp::Not, Box::new(e))
        }),
        map(preceded(ws(char('-')), unary), |e| {
            Expr::Unary(UnaryOp::Neg, Box::new(e))
        }),
        atom,
    ))
    .parse(input)
}

fn atom(input: &str) -> Res<'_, Expr> {
    ws(alt((
        map(map_res(digit1, str::parse::<i64>), Expr::Int),
        call_or_var,
        delimited(char('('), ws(or_expr), char(')')),
    )))
    .parse(input)
}

fn identifier(input: &str) -> Res<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag(".")))),
    ))
    .parse(input)
}

fn call_or_var(input: &str) -> Res<'_, Expr> {
    let (input, name) = identifier(input)?;
    let (input, args) = opt(delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), or_expr),
        char(')'),
    ))
    .parse(input)?;
    let expr = match (name, args) {
        (_, Some(args)) => Expr::Call(name.to_string(), args),
        ("true", None) => Expr::Bool(true),
        ("false", None) => Expr::Bool(false),
        (_, None) => Expr::Var(name.to_string()),
    };
    Ok((input, expr))
}

fn or_op(input: &str) -> Res<'_, BinaryOp> {
    value(BinaryOp::Or, tag("||")).parse(input)
}

fn and_op(input: &str) -> Res<'_, BinaryOp> {
    value(BinaryOp::And, tag("&&")).parse(input)
}

fn comparison_op(input: &str) -> Res<'_, BinaryOp> {
    alt((
        value(BinaryOp::Le, tag("<=")),
        value(BinaryOp::Ge, tag(">=")),
        value(BinaryOp::Eq, tag("==")),
        value(BinaryOp::Ne, tag("!=")),
        value(BinaryOp::Lt, tag("<")),
        value(BinaryOp::Gt, tag(">")),
    ))
    .parse(input)
}

fn sum_op(input: &str) -> Res<'_, BinaryOp> {
    alt((value(BinaryOp::Add, char('+')), value(BinaryOp::Sub, char('-')))).parse(input)
}

fn term_op(input: &str) -> Res<'_, BinaryOp> {
    alt((
        value(BinaryOp::Mul, char('*')),
        value(BinaryOp::Div, char('/')),
        value(BinaryOp::Rem, char('%')),
    ))
    .parse(input)
}
