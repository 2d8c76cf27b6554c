//! The incidence entity model (§3, §4.F): attendees, custom properties,
//! and the `Event`/`Todo`/`Journal`/`FreeBusy` hierarchy dispatched
//! through a `Visitor` rather than downcast.

mod attendee;
mod custom_properties;
mod incidence;
mod person;

pub use attendee::{Attendee, CuType, PartStat, Role};
pub use custom_properties::CustomProperties;
pub use incidence::{Alarm, DirtyField, DirtyTracker, Event, FreeBusy, Incidence, IncidenceBase, Journal, Todo, Transparency, Visitor};
pub use person::Person;
