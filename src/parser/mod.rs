// Command-line expression parsers for filters and sort keys

pub mod filter;
pub mod lexer;
pub mod sort;

use crate::transform::{Filter, SortSpec};
use anyhow::{anyhow, Result};
use nom::IResult;

pub use filter::parse_filter_expr;
pub use sort::parse_sort_expr;

/// Parse a filter such as `region == "North"` or `units >= 10`.
pub fn parse_filter(input: &str) -> Result<Filter> {
    complete(input, parse_filter_expr(input), "filter")
}

/// Parse a sort key such as `units`, `units:desc` or `units desc`.
pub fn parse_sort(input: &str) -> Result<SortSpec> {
    complete(input, parse_sort_expr(input), "sort")
}

/// Require that a parser consumed everything but trailing whitespace.
fn complete<T>(input: &str, result: IResult<&str, T>, what: &str) -> Result<T> {
    match result {
        Ok((remaining, value)) if remaining.trim().is_empty() => Ok(value),
        Ok((remaining, _)) => Err(anyhow!(
            "Invalid {} '{}': unexpected '{}'",
            what,
            input,
            remaining.trim()
        )),
        Err(e) => Err(anyhow!("Invalid {} '{}': {:?}", what, input, e)),
    }
}
