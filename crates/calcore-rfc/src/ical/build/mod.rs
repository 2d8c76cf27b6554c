//! iCalendar serialization (RFC 5545).
//!
//! - [`escape`]: text and parameter-value escaping
//! - [`fold`]: content-line folding at 75 octets
//! - [`serializer`]: full document serialization with canonical ordering

mod escape;
mod fold;
mod serializer;

pub use escape::{escape_param_value, escape_text};
pub use fold::fold_line;
pub use serializer::{serialize, serialize_component, serialize_property};
