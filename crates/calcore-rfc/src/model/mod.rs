//! Civil date/time primitives and the zone-aware `Instant` (§3, §4.B).

pub mod date;
pub mod duration;
pub mod instant;
pub mod time;
pub mod timespec;

pub use date::Date;
pub use duration::Span;
pub use instant::{Instant, TrivialResolver, ZoneResolver};
pub use time::Time;
pub use timespec::TimeSpec;
