//! Errors surfaced by the codec and I/O boundary (§7).
//!
//! Recurrence and zone computation never fail: degenerate inputs
//! return empty results, `None`, or the invalid-offset sentinel rather
//! than an error. Only codec- and I/O-level failures reach this type.

use thiserror::Error;

/// Why a parsed iCalendar document failed to become a usable object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("top-level iCalendar text is invalid: {0}")]
    Ical(String),
    #[error("empty iTIP message")]
    EmptyMessage,
    #[error("METHOD property missing from iTIP message")]
    MethodProperty,
    #[error("iTIP body is not an event, todo, journal, or free/busy")]
    NotIncidence,
    #[error("recognized VCALENDAR but body population failed: {0}")]
    KCal(String),
}

/// Why a save to a host file failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveErrorKind {
    #[error("failed to open file for writing")]
    OpenFile,
    #[error("failed to write calendar to file")]
    SaveFile,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RfcError {
    #[error("byte stream unreadable")]
    LoadError,

    #[error("parse error: {0}")]
    ParseError(#[from] ParseErrorKind),

    #[error("top-level component is not VCALENDAR and not multi-VCALENDAR")]
    NoCalendar,

    #[error("save error: {0}")]
    SaveError(SaveErrorKind),

    #[error("underlying codec returned empty text")]
    LibIcalError,

    #[error("required field missing: {0}")]
    MissingField(String),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_kind_converts_via_from() {
        let err: RfcError = ParseErrorKind::EmptyMessage.into();
        assert!(matches!(err, RfcError::ParseError(ParseErrorKind::EmptyMessage)));
    }

    #[test]
    fn error_messages_are_human_readable() {
        assert_eq!(RfcError::NoCalendar.to_string(), "top-level component is not VCALENDAR and not multi-VCALENDAR");
        assert_eq!(RfcError::LibIcalError.to_string(), "underlying codec returned empty text");
    }
}
