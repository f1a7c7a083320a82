// Filter expression parser
// Format: <field> <op> <value>

use super::lexer::{bare_token, identifier, string_literal, ws};
use crate::binding::FieldDescriptor;
use crate::transform::{Filter, FilterOp};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace1},
    combinator::{map, value},
    multi::separated_list0,
    sequence::{delimited, terminated},
    IResult,
};
use serde_json::{Number, Value};

/// Parse `field op value`, e.g. `region == "North"` or `tier in [a, b]`.
pub fn parse_filter_expr(input: &str) -> IResult<&str, Filter> {
    let (input, field) = ws(identifier)(input)?;
    let (input, operator) = ws(operator)(input)?;
    let (input, operand) = ws(operand)(input)?;

    Ok((
        input,
        Filter {
            field: FieldDescriptor::new(field),
            operator,
            value: operand,
        },
    ))
}

fn operator(input: &str) -> IResult<&str, FilterOp> {
    alt((symbol_operator, word_operator))(input)
}

fn symbol_operator(input: &str) -> IResult<&str, FilterOp> {
    alt((
        value(FilterOp::Eq, tag("==")),
        value(FilterOp::Neq, tag("!=")),
        value(FilterOp::Gte, tag(">=")),
        value(FilterOp::Lte, tag("<=")),
        value(FilterOp::Gt, tag(">")),
        value(FilterOp::Lt, tag("<")),
        value(FilterOp::Eq, tag("=")),
    ))(input)
}

/// Word operators must be followed by whitespace so `in` never eats
/// the start of a value.
fn word_operator(input: &str) -> IResult<&str, FilterOp> {
    terminated(
        alt((
            value(FilterOp::Nin, tag("nin")),
            value(FilterOp::Neq, tag("neq")),
            value(FilterOp::Gte, tag("gte")),
            value(FilterOp::Gt, tag("gt")),
            value(FilterOp::Lte, tag("lte")),
            value(FilterOp::Lt, tag("lt")),
            value(FilterOp::Eq, tag("eq")),
            value(FilterOp::In, tag("in")),
        )),
        multispace1,
    )(input)
}

fn operand(input: &str) -> IResult<&str, Value> {
    alt((list, scalar))(input)
}

fn list(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            ws(char('[')),
            separated_list0(ws(char(',')), ws(scalar)),
            ws(char(']')),
        ),
        Value::Array,
    )(input)
}

fn scalar(input: &str) -> IResult<&str, Value> {
    alt((map(string_literal, Value::String), map(bare_token, bare_value)))(input)
}

/// Unquoted values are typed: integers, floats, booleans and `null`.
fn bare_value(token: &str) -> Value {
    if let Ok(i) = token.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(n) = token.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(token.to_string()),
    }
}
