//! Core entity definitions for the calendar event service.
//!
//! This crate defines the data types shared by the store, the renderers and
//! the server: users identified by an opaque guid, the events they own, and
//! the hashtag-style tag extraction applied to event text.

mod event;
mod tags;
mod user;

pub use event::*;
pub use tags::*;
pub use user::*;
