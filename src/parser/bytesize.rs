use nom::{branch::alt, bytes::complete::tag, character::complete::digit1, combinator::opt};

use super::result::{parse_all, IResult, ParseError, Span};
use crate::error::Result;

/// Parses a byte size: `1024`, `64KB`, `32MiB`.
pub fn parse_bytes(s: &str) -> Result<usize> {
    parse_all(s, "byte size", bytesize)
}

pub(super) fn bytesize(input: Span) -> IResult<usize> {
    let (rest, digits) = digit1(input)?;
    let (rest, unit) = opt(alt((
        tag("KiB"),
        tag("MiB"),
        tag("GiB"),
        tag("KB"),
        tag("MB"),
        tag("GB"),
    )))(rest)?;

    let multiplier = match unit.map(|u| *u.fragment()) {
        None => 1,
        Some("KB") => 1000,
        Some("MB") => 1000 * 1000,
        Some("GB") => 1000 * 1000 * 1000,
        Some("KiB") => 1 << 10,
        Some("MiB") => 1 << 20,
        Some("GiB") => 1 << 30,
        Some(_) => unreachable!(),
    };

    let size = digits
        .fragment()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| {
            nom::Err::Failure(ParseError::new("byte size overflow".to_owned(), input))
        })?;

    if size == 0 {
        return Err(nom::Err::Failure(ParseError::new(
            "byte size must be greater than 0".to_owned(),
            input,
        )));
    }

    Ok((rest, size))
}
