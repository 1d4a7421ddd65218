//! Persisted session record.

use crate::db::{keys, Database};
use crate::entities::SessionRecord;
use crate::error::StoreError;

/// Reads and writes the single session record.
#[derive(Clone)]
pub struct SessionRepository {
    db: Database,
}

impl SessionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The stored session, if any. A record that does not decode is an error
    /// so the caller can decide to discard it.
    pub async fn load(&self) -> Result<Option<SessionRecord>, StoreError> {
        let Some(bytes) = self.db.storage().load(keys::SESSION).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::serialization(keys::SESSION, e))
    }

    pub async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)
            .map_err(|e| StoreError::serialization(keys::SESSION, e))?;
        self.db.storage().save(keys::SESSION, &bytes).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.db.storage().remove(keys::SESSION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, Utc};
    use domain::models::{Role, SocialLinks, User};
    use std::sync::Arc;
    use uuid::Uuid;

    fn record() -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user: User {
                id: Uuid::new_v4(),
                email: "ana@cibesphere.local".to_string(),
                first_name: "Ana".to_string(),
                last_name: "López".to_string(),
                full_name: "Ana López".to_string(),
                role: Role::Attendee,
                is_active: true,
                is_verified: true,
                company: None,
                position: None,
                avatar_url: None,
                banner_url: None,
                bio: None,
                city: None,
                social_links: SocialLinks::default(),
                organization: None,
                favorite_event_ids: vec![],
                bookmarked_event_ids: vec![],
                created_at: now,
                updated_at: now,
            },
            expires_at: now + Duration::hours(1),
            saved_at: now,
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let repo = SessionRepository::new(Database::open_in_memory(None).await.unwrap());
        assert!(repo.load().await.unwrap().is_none());

        let record = record();
        repo.save(&record).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(record));

        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
        repo.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let storage = Arc::new(MemoryStorage::new());
        let repo = SessionRepository::new(Database::open(storage.clone(), None).await.unwrap());
        storage.insert_raw(keys::SESSION, b"{not json".to_vec()).await;

        assert!(matches!(
            repo.load().await,
            Err(StoreError::Serialization { .. })
        ));
    }
}
