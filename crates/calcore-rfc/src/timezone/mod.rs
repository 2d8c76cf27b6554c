//! Timezone model (§4.C): decodes VTIMEZONE components into a sorted
//! transition table and resolves civil times against it.

mod collection;
mod phase;
mod zone;

pub use collection::ZoneCollection;
pub use phase::{Phase, PhaseKind};
pub use zone::{LocalOffset, Transition, Zone};
