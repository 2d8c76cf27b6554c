//! The iCalendar decoder: lexing, value parsing, and document assembly
//! (RFC 5545 §3.1-§3.6).

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{parse_content_line, split_lines, unfold};
pub use parser::{parse, parse_component_str};
pub use values::{
    parse_boolean, parse_date, parse_datetime, parse_duration, parse_float, parse_integer,
    parse_period, parse_rrule, parse_time, parse_utc_offset, unescape_text,
};
