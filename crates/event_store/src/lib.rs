//! Event storage for the calendar event service
//!
//! This crate provides the narrow persistence contract the service depends
//! on: users looked up by guid, events created per owner, range queries and
//! content-based deduplication. It ships an in-memory store (tests and
//! single-process runs) and a SQLite store.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
