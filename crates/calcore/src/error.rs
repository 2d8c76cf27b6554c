use thiserror::Error;

/// Ambient error type shared by the calendar crates.
///
/// Parsing, recurrence and timezone errors live closer to their domains
/// (`calcore_rfc::error::RfcError`); this type covers the concerns that
/// sit below all of them: configuration, validation, and invariants that
/// should never be reachable from well-formed input.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
