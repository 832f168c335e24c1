//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client of the service, known only by its guid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal identifier, referenced by owned events.
    pub id: Uuid,
    /// Opaque public identifier handed to the client. Never reused.
    pub guid: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a freshly generated guid.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            guid: Uuid::new_v4().simple().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Overrides the generated guid.
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new();

        assert_eq!(user.guid.len(), 32);
        assert!(user.guid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_guids_are_unique() {
        let a = User::new();
        let b = User::new();

        assert_ne!(a.guid, b.guid);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_user_with_guid() {
        let user = User::new().with_guid("peter");
        assert_eq!(user.guid, "peter");
    }
}
