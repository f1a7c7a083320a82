// Token parsers shared by the expression grammars

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{char, multispace0},
    combinator::map,
    sequence::delimited,
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace.
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Field name: letters, digits, `_` and `.`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.'),
        String::from,
    )(input)
}

/// Double- or single-quoted string without escapes.
pub fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        map(delimited(char('"'), is_not("\""), char('"')), String::from),
        map(delimited(char('\''), is_not("'"), char('\'')), String::from),
        map(alt((tag("\"\""), tag("''"))), |_| String::new()),
    ))(input)
}

/// Unquoted token, up to whitespace or a list delimiter.
pub fn bare_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ',' && c != '[' && c != ']')(input)
}
