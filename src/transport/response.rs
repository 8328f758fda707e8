//! SMTP response, containing a return code and an optional text message

use std::{
    fmt::{Display, Formatter, Result},
    result,
    str::FromStr,
};

use nom::{
    branch::alt,
    bytes::streaming::{tag, take_till},
    combinator::{opt, value},
    multi::many0,
    sequence::{preceded, terminated},
    IResult, Parser,
};

use crate::transport::{error, Error};

/// The first digit indicates severity
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// 2yx
    PositiveCompletion = 2,
    /// 3yz
    PositiveIntermediate = 3,
    /// 4yz
    TransientNegativeCompletion = 4,
    /// 5yz
    PermanentNegativeCompletion = 5,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", *self as u8)
    }
}

/// Second digit
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    /// x0z
    Syntax = 0,
    /// x1z
    Information = 1,
    /// x2z
    Connections = 2,
    /// x3z
    Unspecified3 = 3,
    /// x4z
    Unspecified4 = 4,
    /// x5z
    MailSystem = 5,
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", *self as u8)
    }
}

/// The detail digit of a response code (third digit)
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Detail {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
}

impl Display for Detail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", *self as u8)
    }
}

/// Represents a 3 digit SMTP response code
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Code {
    /// First digit of the response code
    pub severity: Severity,
    /// Second digit of the response code
    pub category: Category,
    /// Third digit
    pub detail: Detail,
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}{}{}", self.severity, self.category, self.detail)
    }
}

impl Code {
    /// `354`, the go-ahead for message data
    pub const START_DATA: Code = Code {
        severity: Severity::PositiveIntermediate,
        category: Category::MailSystem,
        detail: Detail::Four,
    };

    /// Creates a new `Code` structure
    pub fn new(severity: Severity, category: Category, detail: Detail) -> Code {
        Code {
            severity,
            category,
            detail,
        }
    }
}

impl From<Code> for u16 {
    fn from(code: Code) -> Self {
        code.detail as u16 + 10 * code.category as u16 + 100 * code.severity as u16
    }
}

/// How a session treats a reply
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Outcome {
    /// `354`, the server waits for message data
    Continue,
    /// Any reply starting with `2`
    Success,
    /// Everything else
    Failure,
}

/// Contains an SMTP reply, with separated code and message
///
/// The text message is optional. The code is missing only when the reply
/// did not follow the reply grammar, in which case only [`raw`] and
/// [`outcome`] are meaningful.
///
/// [`raw`]: Response::raw
/// [`outcome`]: Response::outcome
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Response {
    /// Response code
    code: Option<Code>,
    /// Server response string (optional)
    /// Handle multiline responses
    message: Vec<String>,
    /// Reply exactly as received, line terminators included
    raw: String,
}

impl FromStr for Response {
    type Err = Error;

    fn from_str(s: &str) -> result::Result<Response, Error> {
        parse_response(s)
            .map(|(_, r)| r)
            .map_err(|e| error::connection(None, format!("{s}: {e}")))
    }
}

impl Response {
    /// Creates a new `Response`
    pub fn new(code: Code, message: Vec<String>) -> Response {
        let raw = match message.split_last() {
            Some((last, lines)) => {
                let mut raw = String::new();
                for line in lines {
                    raw.push_str(&format!("{code}-{line}\r\n"));
                }
                raw.push_str(&format!("{code} {last}\r\n"));
                raw
            }
            None => format!("{code}\r\n"),
        };

        Response {
            code: Some(code),
            message,
            raw,
        }
    }

    /// A complete reply the grammar rejected, kept as received
    pub(crate) fn unparsed(raw: String) -> Response {
        Response {
            code: None,
            message: raw.lines().map(str::to_owned).collect(),
            raw,
        }
    }

    /// Classifies the reply by its leading characters
    ///
    /// `354` continues, a leading `2` succeeds, anything else fails.
    pub fn outcome(&self) -> Outcome {
        if self.raw.starts_with("354") {
            Outcome::Continue
        } else if self.raw.starts_with('2') {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }

    /// Tests code equality
    pub fn has_code(&self, code: u16) -> bool {
        self.code.is_some_and(|c| u16::from(c) == code)
    }

    /// Returns only the first line of the message if possible
    pub fn first_line(&self) -> Option<&str> {
        self.message.first().map(String::as_str)
    }

    /// Response code, if the reply was well formed
    pub fn code(&self) -> Option<Code> {
        self.code
    }

    /// Server response string (array of lines)
    pub fn message(&self) -> impl Iterator<Item = &str> {
        self.message.iter().map(String::as_str)
    }

    /// The reply as received, for diagnostics
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

// Parsers (originally from tokio-smtp)

fn parse_code(i: &str) -> IResult<&str, Code> {
    let (i, (severity, category, detail)) =
        (parse_severity, parse_category, parse_detail).parse(i)?;
    Ok((
        i,
        Code {
            severity,
            category,
            detail,
        },
    ))
}

fn parse_severity(i: &str) -> IResult<&str, Severity> {
    alt((
        value(Severity::PositiveCompletion, tag("2")),
        value(Severity::PositiveIntermediate, tag("3")),
        value(Severity::TransientNegativeCompletion, tag("4")),
        value(Severity::PermanentNegativeCompletion, tag("5")),
    ))
    .parse(i)
}

fn parse_category(i: &str) -> IResult<&str, Category> {
    alt((
        value(Category::Syntax, tag("0")),
        value(Category::Information, tag("1")),
        value(Category::Connections, tag("2")),
        value(Category::Unspecified3, tag("3")),
        value(Category::Unspecified4, tag("4")),
        value(Category::MailSystem, tag("5")),
    ))
    .parse(i)
}

fn parse_detail(i: &str) -> IResult<&str, Detail> {
    alt((
        value(Detail::Zero, tag("0")),
        value(Detail::One, tag("1")),
        value(Detail::Two, tag("2")),
        value(Detail::Three, tag("3")),
        value(Detail::Four, tag("4")),
        value(Detail::Five, tag("5")),
        value(Detail::Six, tag("6")),
        value(Detail::Seven, tag("7")),
        value(Detail::Eight, tag("8")),
        value(Detail::Nine, tag("9")),
    ))
    .parse(i)
}

fn line_end(i: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\n"))).parse(i)
}

fn line_text(i: &str) -> IResult<&str, &str> {
    take_till(|c| c == '\r' || c == '\n').parse(i)
}

/// Parses one complete, possibly multiline, reply
///
/// Lines end with CRLF or a bare LF. Returns `Incomplete` until the last
/// line (`code SP text` or a bare `code`) has been received.
pub(crate) fn parse_response(input: &str) -> IResult<&str, Response> {
    let (i, lines) = many0((parse_code, preceded(tag("-"), line_text), line_end)).parse(input)?;
    let (i, (last_code, last_line)) = terminated(
        (parse_code, opt(preceded(tag(" "), line_text))),
        line_end,
    )
    .parse(i)?;

    // Check that all codes are equal.
    if !lines.iter().all(|&(code, _, _)| code == last_code) {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Not,
        )));
    }

    // Extract text from lines, and append last line.
    let mut message: Vec<String> = lines.into_iter().map(|(_, text, _)| text.into()).collect();
    message.push(last_line.unwrap_or_default().into());

    let raw = input[..input.len() - i.len()].to_owned();

    Ok((
        i,
        Response {
            code: Some(last_code),
            message,
            raw,
        },
    ))
}
