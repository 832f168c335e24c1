//! Wire formats for the calendar event API
//!
//! This crate defines the four response formats (JSON, compact JSON, XML and
//! plain text) and renders users, events and tags into each of them.

mod error;
mod format;
mod render;
mod types;
mod xml;

pub use error::*;
pub use format::*;
pub use render::*;
pub use types::*;

/// Version string reported by the version endpoint.
pub const API_VERSION: &str = "1.0";
