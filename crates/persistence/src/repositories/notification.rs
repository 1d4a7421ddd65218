//! Notification repository.

use chrono::{DateTime, Utc};
use domain::models::{EventStatus, Notification};
use domain::services::{needs_reminder, NotificationTemplate};
use uuid::Uuid;

use crate::db::Database;
use crate::entities::NotificationRecord;
use crate::error::StoreError;
use crate::metrics::OperationTimer;

/// Repository for the notifications collection.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Database,
}

impl NotificationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Notifications addressed to `recipient_id`, newest first.
    pub async fn list_for(&self, recipient_id: Uuid) -> Vec<Notification> {
        let notifications = self.db.notifications().read().await;
        let mut list: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> usize {
        let notifications = self.db.notifications().read().await;
        notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .count()
    }

    pub async fn insert_many(&self, batch: Vec<NotificationRecord>) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut notifications = self.db.stage_notifications().await;
        let count = batch.len();
        notifications.rows_mut().extend(batch);
        self.db.commit(notifications).await?;

        tracing::debug!(count, "Notifications stored");
        Ok(())
    }

    /// Returns whether a notification with `id` exists. Already-read
    /// notifications are not written again.
    pub async fn mark_read(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut notifications = self.db.stage_notifications().await;

        let Some(index) = notifications.rows().iter().position(|n| n.id == id) else {
            return Ok(false);
        };
        if !notifications.rows()[index].is_read {
            notifications.rows_mut()[index].is_read = true;
        }
        self.db.commit(notifications).await?;
        Ok(true)
    }

    /// Marks every notification of `recipient_id` as read. Returns how many
    /// changed.
    pub async fn mark_all_read(&self, recipient_id: Uuid) -> Result<usize, StoreError> {
        let mut notifications = self.db.stage_notifications().await;

        let unread = notifications
            .rows()
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .count();
        if unread > 0 {
            for n in notifications
                .rows_mut()
                .iter_mut()
                .filter(|n| n.recipient_id == recipient_id)
            {
                n.is_read = true;
            }
        }
        self.db.commit(notifications).await?;
        Ok(unread)
    }

    /// Sends a reminder to every user with a favorited event starting within
    /// the reminder window. A user never gets two reminders for the same
    /// event. Returns how many reminders were created.
    pub async fn generate_reminders(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let timer = OperationTimer::new("notifications.generate_reminders");
        let users = self.db.users().read().await;
        let organizations = self.db.organizations().read().await;
        let events = self.db.events().read().await;
        let mut notifications = self.db.stage_notifications().await;

        let mut reminders = Vec::new();
        for record in events.iter().filter(|e| e.status == EventStatus::Published) {
            let Some(organization) = organizations
                .iter()
                .find(|org| org.id == record.organization_id)
            else {
                continue;
            };
            let event = record.to_domain(organization.into());
            if !needs_reminder(&event, now) {
                continue;
            }

            for user in users
                .iter()
                .filter(|u| u.is_active && u.favorite_event_ids.contains(&event.id))
            {
                let already_sent = notifications
                    .rows()
                    .iter()
                    .any(|n| NotificationTemplate::is_reminder_for(n, user.id, &event));
                if !already_sent {
                    reminders.push(NotificationTemplate::event_reminder(user.id, &event));
                }
            }
        }

        let count = reminders.len();
        if count > 0 {
            notifications.rows_mut().extend(reminders);
            self.db.commit(notifications).await?;
            tracing::info!(count, "Event reminders generated");
        }
        timer.record();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Fixture;
    use chrono::{Duration, TimeZone};
    use domain::models::NotificationKind;

    const ATTENDEE_ID: &str = "a1b2c3d4-0003-0003-0003-000000000003";

    async fn repo() -> NotificationRepository {
        let fixture = Fixture::bundled().unwrap();
        NotificationRepository::new(Database::open_in_memory(Some(&fixture)).await.unwrap())
    }

    fn notification(recipient: Uuid, title: &str, age_minutes: i64) -> Notification {
        let mut n = Notification::new(recipient, NotificationKind::Info, title, "Mensaje", None);
        n.created_at = Utc::now() - Duration::minutes(age_minutes);
        n
    }

    #[tokio::test]
    async fn test_list_scoped_and_newest_first() {
        let repo = repo().await;
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.insert_many(vec![
            notification(me, "old", 30),
            notification(other, "theirs", 0),
            notification(me, "new", 1),
        ])
        .await
        .unwrap();

        let titles: Vec<String> = repo.list_for(me).await.into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["new", "old"]);
        assert_eq!(repo.unread_count(me).await, 2);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let repo = repo().await;
        let me = Uuid::new_v4();
        let n = notification(me, "hola", 0);
        let id = n.id;
        repo.insert_many(vec![n]).await.unwrap();

        assert!(repo.mark_read(id).await.unwrap());
        assert!(repo.mark_read(id).await.unwrap());
        assert!(!repo.mark_read(Uuid::new_v4()).await.unwrap());
        assert_eq!(repo.unread_count(me).await, 0);
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let repo = repo().await;
        let me = Uuid::new_v4();
        repo.insert_many(vec![notification(me, "a", 0), notification(me, "b", 0)])
            .await
            .unwrap();

        assert_eq!(repo.mark_all_read(me).await.unwrap(), 2);
        assert_eq!(repo.mark_all_read(me).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reminders_are_idempotent() {
        let repo = repo().await;
        // The summit (a favorite of the seeded attendee) starts 2025-11-14 09:00 UTC.
        let now = Utc.with_ymd_and_hms(2025, 11, 13, 12, 0, 0).unwrap();

        assert_eq!(repo.generate_reminders(now).await.unwrap(), 1);
        assert_eq!(repo.generate_reminders(now).await.unwrap(), 0);

        let attendee: Uuid = ATTENDEE_ID.parse().unwrap();
        let list = repo.list_for(attendee).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].link.as_deref(), Some("/eventos/cybersec-summit-madrid-2024"));
    }

    #[tokio::test]
    async fn test_no_reminders_outside_window() {
        let repo = repo().await;
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        assert_eq!(repo.generate_reminders(now).await.unwrap(), 0);
    }
}
