//! iCalendar (RFC 2445/5545) data model, codec, recurrence engine, and
//! timezone model.

pub mod calendar;
pub mod entity;
pub mod error;
pub mod ical;
pub mod model;
pub mod recurrence;
pub mod scheduling;
pub mod sortable;
pub mod timezone;

pub use error::{RfcError, RfcResult};
