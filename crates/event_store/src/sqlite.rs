//! SQLite event store implementation.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{Event, NewEvent, TimeRange, User};
use futures_util::{StreamExt, TryStreamExt};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, Sqlite,
};
use uuid::Uuid;

use crate::{EventStore, EventStream, Insertion, StoreError, StoreResult};

const EVENT_COLUMNS: &str = "id, user_id, title, description, external_url, start_ts, end_ts, \
                             all_day, tags, created_at";

// Timed events ending exactly at the window start are excluded; zero-length
// all-day events starting inside the window are not.
const FIND_EVENTS_SQL: &str = "SELECT id, user_id, title, description, external_url, start_ts, \
                               end_ts, all_day, tags, created_at FROM events \
                               WHERE user_id = ? AND start_ts < ? AND (end_ts > ? OR start_ts >= ?) \
                               ORDER BY start_ts, created_at";

/// SQLite event store.
///
/// Absent descriptions and URLs are stored as empty strings so the unique
/// content constraint treats them as equal.
#[derive(Clone)]
pub struct SqliteEventStore {
    pool: Pool<Sqlite>,
}

impl SqliteEventStore {
    /// Creates a store on an existing pool. Call [`init`](Self::init) before use.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Connects to `database_url`, creating the database file if needed, and
    /// initializes the schema.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `sqlite::memory:` opens its own database, so an
        // in-memory store must stay on a single connection that never expires.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Initializes the database tables.
    pub async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                guid TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users (id),
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                external_url TEXT NOT NULL DEFAULT '',
                start_ts INTEGER NOT NULL,
                end_ts INTEGER NOT NULL,
                all_day INTEGER NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL,
                UNIQUE (user_id, title, start_ts, end_ts, all_day, external_url, description)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_events_user_start
            ON events (user_id, start_ts)
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("SQLite event store schema ready");
        Ok(())
    }

    /// Inserts `event`, returning the number of rows written.
    async fn insert_event(&self, event: &Event, on_conflict: &str) -> StoreResult<u64> {
        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) {on_conflict}"
        );
        let tags = serde_json::to_string(&event.tags)?;
        let result = sqlx::query(&sql)
            .bind(event.id.to_string())
            .bind(event.user_id.to_string())
            .bind(&event.title)
            .bind(event.description.as_deref().unwrap_or(""))
            .bind(event.external_url.as_deref().unwrap_or(""))
            .bind(event.start.timestamp())
            .bind(event.end.timestamp())
            .bind(event.all_day)
            .bind(tags)
            .bind(event.created_at.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| event_insert_error(e, event))?;
        Ok(result.rows_affected())
    }
}

#[derive(FromRow)]
struct EventRow {
    id: String,
    user_id: String,
    title: String,
    description: String,
    external_url: String,
    start_ts: i64,
    end_ts: i64,
    all_day: bool,
    tags: String,
    created_at: i64,
}

impl EventRow {
    fn into_event(self) -> StoreResult<Event> {
        Ok(Event {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            title: self.title,
            description: non_empty(self.description),
            external_url: non_empty(self.external_url),
            start: from_seconds(self.start_ts)?,
            end: from_seconds(self.end_ts)?,
            all_day: self.all_day,
            tags: serde_json::from_str(&self.tags)?,
            created_at: from_millis(self.created_at)?,
        })
    }
}

fn parse_uuid(value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| StoreError::Corrupt(format!("invalid id {value}: {e}")))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn from_seconds(secs: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {secs}")))
}

fn from_millis(millis: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {millis}")))
}

/// Maps a unique constraint violation on insert to `AlreadyExists`.
fn insert_error(err: sqlx::Error, entity_type: &'static str, id: String) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::already_exists(entity_type, id);
        }
    }
    StoreError::Database(err)
}

/// Like [`insert_error`], but an unknown owner is reported as `NotFound`.
fn event_insert_error(err: sqlx::Error, event: &Event) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return StoreError::not_found("User", event.user_id.to_string());
        }
    }
    insert_error(err, "Event", event.id.to_string())
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query("INSERT INTO users (id, guid, created_at) VALUES (?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.guid)
            .bind(user.created_at.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, "User", user.guid.clone()))?;
        Ok(user)
    }

    async fn find_user(&self, guid: &str) -> StoreResult<Option<User>> {
        let row: Option<(String, String, i64)> =
            sqlx::query_as("SELECT id, guid, created_at FROM users WHERE guid = ?")
                .bind(guid)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, guid, created_at)| {
            Ok(User {
                id: parse_uuid(&id)?,
                guid,
                created_at: from_millis(created_at)?,
            })
        })
        .transpose()
    }

    async fn create_event(&self, event: Event) -> StoreResult<Event> {
        self.insert_event(&event, "").await?;
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(EventRow::into_event).transpose()
    }

    fn find_events(&self, user_id: Uuid, range: TimeRange) -> EventStream<'_> {
        sqlx::query_as::<_, EventRow>(FIND_EVENTS_SQL)
            .bind(user_id.to_string())
            .bind(range.end.timestamp())
            .bind(range.start.timestamp())
            .bind(range.start.timestamp())
            .fetch(&self.pool)
            .map_err(StoreError::from)
            .and_then(|row| async move { row.into_event() })
            .boxed()
    }

    async fn find_matching_event(
        &self,
        user_id: Uuid,
        fields: &NewEvent,
    ) -> StoreResult<Option<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE user_id = ? AND title = ? AND start_ts = ? AND end_ts = ? \
             AND all_day = ? AND external_url = ? AND description = ?"
        );
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(user_id.to_string())
            .bind(&fields.title)
            .bind(fields.start.timestamp())
            .bind(fields.end.timestamp())
            .bind(fields.all_day)
            .bind(fields.external_url.as_deref().unwrap_or(""))
            .bind(fields.description.as_deref().unwrap_or(""))
            .fetch_optional(&self.pool)
            .await?;
        row.map(EventRow::into_event).transpose()
    }

    async fn create_event_unless_matching(
        &self,
        user_id: Uuid,
        fields: NewEvent,
    ) -> StoreResult<Insertion> {
        let event = Event::from_new(user_id, fields.clone());
        let inserted = self
            .insert_event(
                &event,
                "ON CONFLICT (user_id, title, start_ts, end_ts, all_day, external_url, description) \
                 DO NOTHING",
            )
            .await?;

        if inserted == 1 {
            return Ok(Insertion::Created(event));
        }

        self.find_matching_event(user_id, &fields)
            .await?
            .map(Insertion::Existing)
            .ok_or_else(|| StoreError::Corrupt("conflicting event vanished".to_string()))
    }

    async fn owner_tags(&self, user_id: Uuid) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT tags FROM events WHERE user_id = ? ORDER BY start_ts, created_at")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        let mut tags: Vec<String> = Vec::new();
        for (raw,) in rows {
            for tag in serde_json::from_str::<Vec<String>>(&raw)? {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        Ok(tags)
    }
}
