//! Ambient support crate for the calcore calendar libraries.
//!
//! Holds the concerns that sit below the RFC 5545 domain model itself:
//! a shared error type, process configuration, and logging bootstrap.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Settings, load_config};
pub use error::{CoreError, CoreResult};
