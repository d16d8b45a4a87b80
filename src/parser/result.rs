use nom;

use nom_locate::LocatedSpan;

pub type Span<'a> = LocatedSpan<&'a str>;

pub type IResult<'a, O> = nom::IResult<Span<'a>, O, ParseError<'a>>;

#[derive(Debug, PartialEq)]
pub struct ParseError<'a> {
    message: String,
    wherein: Span<'a>,
}

impl<'a> ParseError<'a> {
    pub fn new(message: String, wherein: Span<'a>) -> Self {
        Self { message, wherein }
    }

    pub fn message(&self) -> &String {
        &self.message
    }

    pub fn offset(&self) -> usize {
        self.wherein.location_offset()
    }
}

impl<'a> nom::error::ParseError<Span<'a>> for ParseError<'a> {
    fn from_error_kind(input: Span<'a>, kind: nom::error::ErrorKind) -> Self {
        Self::new(format!("parse error {:?}", kind), input)
    }

    fn append(_input: Span<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: Span<'a>, c: char) -> Self {
        Self::new(format!("unexpected character '{}'", c), input)
    }
}

/// Runs a complete-input parser over `s`, rejecting trailing garbage.
pub(super) fn parse_all<'a, O, F>(s: &'a str, what: &str, parser: F) -> crate::error::Result<O>
where
    F: Fn(Span<'a>) -> IResult<'a, O>,
{
    match parser(Span::new(s)) {
        Ok((rest, value)) if rest.fragment().is_empty() => Ok(value),
        Ok((rest, _)) => Err(format!(
            "invalid {} '{}': unexpected trailing input at offset {}",
            what,
            s,
            rest.location_offset()
        )
        .into()),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(format!(
            "invalid {} '{}': {} at offset {}",
            what,
            s,
            e.message(),
            e.offset()
        )
        .into()),
        Err(nom::Err::Incomplete(_)) => Err(format!("invalid {} '{}'", what, s).into()),
    }
}
