use std::convert::TryFrom;
use std::time::Duration;

use nom::{branch::alt, bytes::complete::tag, character::complete::digit1};

use super::result::{parse_all, IResult, ParseError, Span};
use crate::error::{Error, Result};

/// Parses a Go-like duration string: `500ms`, `30s`, `1m30s`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    parse_all(s, "duration", duration)
}

/// - Only positive durations.
/// - No fractional units.
/// - Units are always ordered from longest to shortest.
pub(super) fn duration(input: Span) -> IResult<Duration> {
    let (rest, duration) = duration_inner(input, Unit::Hour)?;

    if duration == Duration::from_millis(0) {
        return Err(nom::Err::Failure(ParseError::new(
            "duration must be greater than 0".to_owned(),
            input,
        )));
    }

    Ok((rest, duration))
}

enum Unit {
    Millisecond,
    Second, // 1000 milliseconds
    Minute, // 60 seconds
    Hour,   // 60 minutes
}

impl Unit {
    fn milliseconds(&self) -> u64 {
        use Unit::*;
        match self {
            Millisecond => 1,
            Second => 1000,
            Minute => 60 * 1000,
            Hour => 60 * 60 * 1000,
        }
    }

    fn descendant(&self) -> Option<Self> {
        use Unit::*;
        match self {
            Millisecond => None,
            Second => Some(Millisecond),
            Minute => Some(Second),
            Hour => Some(Minute),
        }
    }
}

impl TryFrom<&str> for Unit {
    type Error = Error;

    fn try_from(u: &str) -> Result<Self> {
        use Unit::*;

        match u {
            "h" => Ok(Hour),
            "m" => Ok(Minute),
            "s" => Ok(Second),
            "ms" => Ok(Millisecond),
            _ => Err(Error::new("Unknown duration unit")),
        }
    }
}

fn duration_inner(input: Span, max_allowed_unit: Unit) -> IResult<Duration> {
    let (rest, multiplier) = digit1(input)?;
    let (rest, unit) = alt((tag("ms"), tag("s"), tag("m"), tag("h")))(rest)?;

    let failure = |message: &str| nom::Err::Failure(ParseError::new(message.to_owned(), input));

    let unit = Unit::try_from(*unit.fragment()).map_err(|e| failure(e.message()))?;
    if unit.milliseconds() > max_allowed_unit.milliseconds() {
        return Err(failure("invalid duration literal"));
    }

    let duration = multiplier
        .fragment()
        .parse::<u32>()
        .ok()
        .and_then(|m| Duration::from_millis(unit.milliseconds()).checked_mul(m))
        .ok_or_else(|| failure("duration overflow occurred"))?;

    match unit.descendant() {
        Some(next_unit) => {
            let (rest, more_duration) = match duration_inner(rest, next_unit) {
                Ok((rest, more_duration)) => (rest, more_duration),
                Err(nom::Err::Error(_)) => (rest, Duration::from_millis(0)),
                Err(e) => return Err(e),
            };
            let total = duration
                .checked_add(more_duration)
                .ok_or_else(|| failure("duration overflow occurred"))?;
            Ok((rest, total))
        }
        None => Ok((rest, duration)),
    }
}
