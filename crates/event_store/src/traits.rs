//! Event store trait definitions.

use async_trait::async_trait;
use entities::{Event, NewEvent, TimeRange, User};
use futures_util::stream::BoxStream;
use uuid::Uuid;

use crate::StoreResult;

/// A finite sequence of events. It can be consumed once.
///
/// Nothing is read before the first poll. Whether rows are then fetched
/// incrementally or as a snapshot is up to the store.
pub type EventStream<'a> = BoxStream<'a, StoreResult<Event>>;

/// Outcome of a deduplicating insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// No event with the same content existed; this one was stored.
    Created(Event),
    /// An event with identical content already existed and was returned as is.
    Existing(Event),
}

impl Insertion {
    /// Returns the stored event regardless of outcome.
    pub fn event(&self) -> &Event {
        match self {
            Insertion::Created(event) | Insertion::Existing(event) => event,
        }
    }

    /// Consumes the insertion, returning the stored event.
    pub fn into_event(self) -> Event {
        match self {
            Insertion::Created(event) | Insertion::Existing(event) => event,
        }
    }

    /// Returns true if a new event was stored.
    pub fn is_created(&self) -> bool {
        matches!(self, Insertion::Created(_))
    }
}

/// Trait for event storage operations.
#[async_trait]
pub trait EventStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by guid.
    async fn find_user(&self, guid: &str) -> StoreResult<Option<User>>;

    // =========================================================================
    // Event operations
    // =========================================================================

    /// Stores a fully built event.
    ///
    /// Fails with `AlreadyExists` if the ID is taken or the owner already has an
    /// event with identical content, and with `NotFound` if the owner is unknown.
    async fn create_event(&self, event: Event) -> StoreResult<Event>;

    /// Gets an event by ID.
    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    /// Streams the owner's events overlapping `range`, ordered by start.
    fn find_events(&self, user_id: Uuid, range: TimeRange) -> EventStream<'_>;

    /// Finds the owner's event with exactly the given content, if any.
    async fn find_matching_event(
        &self,
        user_id: Uuid,
        fields: &NewEvent,
    ) -> StoreResult<Option<Event>>;

    /// Stores a new event unless the owner already has one with identical
    /// content.
    ///
    /// Implementations must make the check and the insert atomic per owner so
    /// that racing identical requests store a single event.
    async fn create_event_unless_matching(
        &self,
        user_id: Uuid,
        fields: NewEvent,
    ) -> StoreResult<Insertion>;

    /// Returns every distinct tag across the owner's events, in first-seen
    /// order by event start.
    async fn owner_tags(&self, user_id: Uuid) -> StoreResult<Vec<String>>;
}
