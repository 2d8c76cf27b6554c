//! The recurrence engine (§4.D, §4.E): compiles a RECUR value into a
//! queryable [`Rule`], and combines several rules plus explicit
//! RDATE/EXDATE lists into an [`Aggregator`].

mod aggregator;
mod constraint;
mod rule;

pub use aggregator::Aggregator;
pub use constraint::Constraint;
pub use rule::Rule;
