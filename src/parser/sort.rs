// Sort key parser
// Format: field, field:asc, field:desc, field asc, field desc

use super::lexer::{identifier, ws};
use crate::transform::SortSpec;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{opt, value},
    sequence::preceded,
    IResult,
};

pub fn parse_sort_expr(input: &str) -> IResult<&str, SortSpec> {
    let (input, field) = ws(identifier)(input)?;
    let (input, desc) = opt(preceded(opt(ws(char(':'))), direction))(input)?;

    Ok((
        input,
        SortSpec {
            field,
            desc: desc.unwrap_or(false),
        },
    ))
}

fn direction(input: &str) -> IResult<&str, bool> {
    ws(alt((value(true, tag("desc")), value(false, tag("asc")))))(input)
}
