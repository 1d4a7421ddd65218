//! Per-user notification inbox.

use chrono::{DateTime, Utc};
use domain::models::Notification;
use persistence::entities::NotificationRecord;
use persistence::repositories::NotificationRepository;
use persistence::Database;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::network::{Latency, Network};

/// Stores notifications generated as a side effect of another mutation.
///
/// The mutation has already succeeded, so a failure here is logged and
/// swallowed.
pub(crate) async fn deliver(repo: &NotificationRepository, batch: Vec<NotificationRecord>) {
    let count = batch.len();
    if let Err(e) = repo.insert_many(batch).await {
        tracing::warn!(error = %e, count, "Failed to store notifications");
    }
}

pub struct NotificationService {
    notifications: NotificationRepository,
    network: Network,
}

impl NotificationService {
    pub fn new(db: &Database, network: Network) -> Self {
        Self {
            notifications: NotificationRepository::new(db.clone()),
            network,
        }
    }

    /// Notifications of `user_id`, newest first.
    pub async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, ApiError> {
        self.network
            .call("get_notifications", Latency::Eighths(5), async {
                Ok(self.notifications.list_for(user_id).await)
            })
            .await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> usize {
        self.notifications.unread_count(user_id).await
    }

    /// Best effort: unknown ids and storage failures are logged only.
    pub async fn mark_notification_as_read(&self, id: Uuid) -> Result<(), ApiError> {
        self.network
            .call("mark_notification_as_read", Latency::Eighths(3), async {
                match self.notifications.mark_read(id).await {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!(notification_id = %id, "Unknown notification"),
                    Err(e) => {
                        tracing::warn!(notification_id = %id, error = %e, "Failed to mark notification as read")
                    }
                }
                Ok(())
            })
            .await
    }

    /// Marks the whole inbox of `user_id` as read; returns how many changed.
    pub async fn mark_all_as_read(&self, user_id: Uuid) -> Result<usize, ApiError> {
        self.network
            .call("mark_all_as_read", Latency::Eighths(3), async {
                Ok(self.notifications.mark_all_read(user_id).await?)
            })
            .await
    }

    /// Reminds users of favorited events that start within the next day.
    pub async fn generate_event_reminders(&self, now: DateTime<Utc>) -> Result<usize, ApiError> {
        Ok(self.notifications.generate_reminders(now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::NotificationKind;
    use persistence::{Fixture, MemoryStorage};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_mark_read_is_best_effort() {
        let storage = Arc::new(MemoryStorage::new());
        let db = Database::open(storage.clone(), Some(&Fixture::bundled().unwrap()))
            .await
            .unwrap();
        let service = NotificationService::new(&db, Network::instant());
        let me = Uuid::new_v4();
        let n = Notification::new(me, NotificationKind::Info, "Hola", "Mensaje", None);
        let id = n.id;
        deliver(&NotificationRepository::new(db.clone()), vec![n]).await;

        service.mark_notification_as_read(Uuid::new_v4()).await.unwrap();

        storage.set_fail_writes(true);
        service.mark_notification_as_read(id).await.unwrap();
        assert_eq!(service.unread_count(me).await, 1);

        storage.set_fail_writes(false);
        service.mark_notification_as_read(id).await.unwrap();
        assert_eq!(service.unread_count(me).await, 0);
    }

    #[tokio::test]
    async fn test_mark_all_as_read() {
        let db = Database::open_in_memory(None).await.unwrap();
        let service = NotificationService::new(&db, Network::instant());
        let me = Uuid::new_v4();
        deliver(
            &NotificationRepository::new(db.clone()),
            vec![
                Notification::new(me, NotificationKind::Info, "a", "a", None),
                Notification::new(me, NotificationKind::Warning, "b", "b", None),
            ],
        )
        .await;

        assert_eq!(service.get_notifications(me).await.unwrap().len(), 2);
        assert_eq!(service.mark_all_as_read(me).await.unwrap(), 2);
        assert_eq!(service.unread_count(me).await, 0);
    }
}
