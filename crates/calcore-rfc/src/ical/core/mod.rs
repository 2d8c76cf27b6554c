//! iCalendar wire-format types: the typed object graph the codec parses
//! into and serializes from (RFC 5545 §3).

pub mod component;
pub mod datetime;
pub mod duration;
pub mod parameter;
pub mod property;
pub mod rrule;
pub mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{Date, DateTime, DateTimeForm};
pub use duration::Duration;
pub use parameter::Parameter;
pub use property::{ContentLine, Property, names};
pub use rrule::{Frequency, RRule, RRuleUntil, Weekday, WeekdayNum};
pub use value::{Period, UtcOffset, Value};
