//! In-memory event store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{Event, NewEvent, TimeRange, User};
use futures_util::{stream, StreamExt};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{EventStore, EventStream, Insertion, StoreError, StoreResult};

/// In-memory event store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl MemoryEventStore {
    /// Creates a new in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn ensure_user(&self, user_id: Uuid) -> StoreResult<()> {
        let users = self.users.read().await;
        if !users.contains_key(&user_id) {
            return Err(StoreError::not_found("User", user_id.to_string()));
        }
        Ok(())
    }
}

fn sorted_by_start<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<Event> {
    let mut result: Vec<Event> = events.cloned().collect();
    result.sort_by(|a, b| a.start.cmp(&b.start).then(a.created_at.cmp(&b.created_at)));
    result
}

#[async_trait]
impl EventStore for MemoryEventStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.guid == user.guid) {
            return Err(StoreError::already_exists("User", user.guid));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, guid: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.guid == guid).cloned())
    }

    // =========================================================================
    // Event operations
    // =========================================================================

    async fn create_event(&self, event: Event) -> StoreResult<Event> {
        self.ensure_user(event.user_id).await?;

        let mut events = self.events.write().await;
        let duplicate = events.values().any(|e| {
            e.user_id == event.user_id
                && e.title == event.title
                && e.start == event.start
                && e.end == event.end
                && e.all_day == event.all_day
                && e.external_url == event.external_url
                && e.description == event.description
        });
        if duplicate || events.contains_key(&event.id) {
            return Err(StoreError::already_exists("Event", event.id.to_string()));
        }
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    fn find_events(&self, user_id: Uuid, range: TimeRange) -> EventStream<'_> {
        let events = Arc::clone(&self.events);
        // Matches are copied out on first poll so the read lock is not held
        // while the caller consumes the stream.
        stream::once(async move {
            let events = events.read().await;
            let matched = sorted_by_start(
                events
                    .values()
                    .filter(|e| e.user_id == user_id && range.overlaps(e)),
            );
            stream::iter(matched.into_iter().map(Ok))
        })
        .flatten()
        .boxed()
    }

    async fn find_matching_event(
        &self,
        user_id: Uuid,
        fields: &NewEvent,
    ) -> StoreResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events
            .values()
            .find(|e| e.user_id == user_id && e.matches(fields))
            .cloned())
    }

    async fn create_event_unless_matching(
        &self,
        user_id: Uuid,
        fields: NewEvent,
    ) -> StoreResult<Insertion> {
        self.ensure_user(user_id).await?;

        // Hold the write lock across the lookup so identical requests cannot
        // both insert.
        let mut events = self.events.write().await;
        if let Some(existing) = events
            .values()
            .find(|e| e.user_id == user_id && e.matches(&fields))
        {
            return Ok(Insertion::Existing(existing.clone()));
        }

        let event = Event::from_new(user_id, fields);
        events.insert(event.id, event.clone());
        Ok(Insertion::Created(event))
    }

    async fn owner_tags(&self, user_id: Uuid) -> StoreResult<Vec<String>> {
        let events = self.events.read().await;
        let owned = sorted_by_start(events.values().filter(|e| e.user_id == user_id));
        Ok(entities::collect_tags(&owned))
    }
}
