//! The iCalendar (RFC 5545) wire format: typed component tree, decoder,
//! and encoder.

pub mod build;
pub mod core;
pub mod parse;

pub use build::serialize;
pub use parse::parse;
