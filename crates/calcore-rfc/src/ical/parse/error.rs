//! Errors raised while lexing or parsing iCalendar text.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidPropertyName,
    MissingPropertyName,
    MissingColon,
    InvalidParameter,
    UnclosedQuote,
    InvalidDate,
    InvalidTime,
    InvalidDateTime,
    InvalidUtcOffset,
    InvalidDuration,
    InvalidPeriod,
    InvalidRRule,
    InvalidFrequency,
    InvalidWeekday,
    InvalidBoolean,
    InvalidInteger,
    InvalidFloat,
    InvalidValue,
    UntilCountConflict,
    MissingBegin,
    MissingEnd,
    MismatchedComponent,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidPropertyName => "invalid property name",
            Self::MissingPropertyName => "missing property name",
            Self::MissingColon => "missing ':' separator",
            Self::InvalidParameter => "invalid parameter",
            Self::UnclosedQuote => "unclosed quoted parameter value",
            Self::InvalidDate => "invalid DATE value",
            Self::InvalidTime => "invalid TIME value",
            Self::InvalidDateTime => "invalid DATE-TIME value",
            Self::InvalidUtcOffset => "invalid UTC-OFFSET value",
            Self::InvalidDuration => "invalid DURATION value",
            Self::InvalidPeriod => "invalid PERIOD value",
            Self::InvalidRRule => "invalid RECUR value",
            Self::InvalidFrequency => "invalid FREQ value",
            Self::InvalidWeekday => "invalid weekday",
            Self::InvalidBoolean => "invalid BOOLEAN value",
            Self::InvalidInteger => "invalid INTEGER value",
            Self::InvalidFloat => "invalid FLOAT value",
            Self::InvalidValue => "invalid value",
            Self::UntilCountConflict => "UNTIL and COUNT are mutually exclusive",
            Self::MissingBegin => "missing BEGIN",
            Self::MissingEnd => "missing END",
            Self::MismatchedComponent => "mismatched component nesting",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub col: usize,
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, col: usize) -> Self {
        Self { kind, line, col, context: None }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, col {}", self.kind, self.line, self.col)?;
        if let Some(ctx) = &self.context {
            write!(f, ": {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
