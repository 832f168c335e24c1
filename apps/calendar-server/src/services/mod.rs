//! Request handling independent of the HTTP framework.

pub mod events;
pub mod normalize;

pub use events::{EventService, ListEventsQuery, Reply};
pub use normalize::{normalize, EventForm, NormalizeRules, ValidationError, ValidationReason};
