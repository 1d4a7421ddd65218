//! Event repository.
//!
//! Reads take the organizations lock before the events lock so every returned
//! [`Event`] embeds its current organization. Mutations that also touch users
//! take the users lock first.

use chrono::Utc;
use domain::models::user::normalize_email;
use domain::models::{Event, EventDetails, EventFilter, EventStatus, Organization};
use uuid::Uuid;

use crate::db::Database;
use crate::entities::{EventRecord, OrganizationRecord};
use crate::error::StoreError;
use crate::metrics::OperationTimer;

/// Result of a subscription attempt.
#[derive(Debug, Clone)]
pub enum SubscribeOutcome {
    /// The seat was taken. `user_id` is set when the email belongs to a
    /// registered user, who now has the event among their favorites.
    Subscribed { event: Event, user_id: Option<Uuid> },
    NotFound,
    Full { max_attendees: u32 },
    Closed(EventStatus),
}

/// What remains of a deleted event.
#[derive(Debug, Clone)]
pub struct DeletedEvent {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Users that had the event among their favorites.
    pub subscriber_ids: Vec<Uuid>,
}

/// Repository for the events collection.
#[derive(Clone)]
pub struct EventRepository {
    db: Database,
}

fn event_slug(title: &str, events: &[EventRecord], own: Option<Uuid>) -> String {
    shared::slug::unique_slug(title, |candidate| {
        events
            .iter()
            .filter(|event| Some(event.id) != own)
            .any(|event| event.answers_to(candidate))
    })
}

fn resolve(record: &EventRecord, organizations: &[OrganizationRecord]) -> Option<Event> {
    match organizations
        .iter()
        .find(|org| org.id == record.organization_id)
    {
        Some(org) => Some(record.to_domain(Organization::from(org))),
        None => {
            tracing::warn!(
                event_id = %record.id,
                organization_id = %record.organization_id,
                "Event references a missing organization"
            );
            None
        }
    }
}

fn fresh_ids(details: &mut EventDetails) {
    for item in &mut details.agenda {
        item.id = Uuid::new_v4();
    }
    for speaker in &mut details.speakers {
        speaker.id = Uuid::new_v4();
    }
}

impl EventRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Event> {
        let organizations = self.db.organizations().read().await;
        let events = self.db.events().read().await;
        events
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| resolve(e, &organizations))
    }

    /// Finds by current slug, then by slugs the event had before a title change.
    pub async fn find_by_slug(&self, slug: &str) -> Option<Event> {
        let organizations = self.db.organizations().read().await;
        let events = self.db.events().read().await;
        events
            .iter()
            .find(|e| e.slug == slug)
            .or_else(|| events.iter().find(|e| e.answers_to(slug)))
            .and_then(|e| resolve(e, &organizations))
    }

    /// Published events matching `filter`, soonest first.
    pub async fn list_published(&self, filter: &EventFilter) -> Vec<Event> {
        let timer = OperationTimer::new("events.list_published");
        let organizations = self.db.organizations().read().await;
        let events = self.db.events().read().await;

        let mut list: Vec<Event> = events
            .iter()
            .filter(|e| e.status == EventStatus::Published)
            .filter_map(|e| resolve(e, &organizations))
            .filter(|e| filter.matches(e))
            .collect();
        list.sort_by_key(|e| e.details.start_date);
        timer.record();
        list
    }

    /// Every event of an organization, whatever its status, soonest first.
    pub async fn list_by_organization(&self, organization_id: Uuid) -> Vec<Event> {
        let organizations = self.db.organizations().read().await;
        let events = self.db.events().read().await;

        let mut list: Vec<Event> = events
            .iter()
            .filter(|e| e.organization_id == organization_id)
            .filter_map(|e| resolve(e, &organizations))
            .collect();
        list.sort_by_key(|e| e.details.start_date);
        list
    }

    pub async fn list_all(&self) -> Vec<Event> {
        let organizations = self.db.organizations().read().await;
        let events = self.db.events().read().await;
        events
            .iter()
            .filter_map(|e| resolve(e, &organizations))
            .collect()
    }

    /// Creates a published event for `organization_id`.
    ///
    /// `details` must already be validated. Returns `Ok(None)` when the
    /// organization does not exist.
    pub async fn create(
        &self,
        organization_id: Uuid,
        details: EventDetails,
    ) -> Result<Option<Event>, StoreError> {
        let timer = OperationTimer::new("events.create");
        let organizations = self.db.organizations().read().await;
        let mut events = self.db.stage_events().await;

        let Some(organization) = organizations.iter().find(|org| org.id == organization_id) else {
            return Ok(None);
        };

        let mut details = details.with_defaults();
        fresh_ids(&mut details);
        let now = Utc::now();
        let record = EventRecord {
            id: Uuid::new_v4(),
            slug: event_slug(&details.title, events.rows(), None),
            previous_slugs: Vec::new(),
            details,
            current_attendees: 0,
            status: EventStatus::Published,
            organization_id,
            created_at: now,
            updated_at: now,
        };
        let event = record.to_domain(Organization::from(organization));
        events.rows_mut().push(record);

        self.db.commit(events).await?;
        timer.record();

        tracing::info!(
            event_id = %event.id,
            slug = %event.slug,
            organization_id = %organization_id,
            "Event created"
        );
        Ok(Some(event))
    }

    /// Applies `f` to the body and status of event `id`.
    ///
    /// `f` also receives the current attendance so it can validate the merged
    /// body against it. A title change regenerates the slug and keeps the old
    /// one as an alias. Returns `Ok(None)` when the event does not exist.
    pub async fn update<F, E>(&self, id: Uuid, f: F) -> Result<Option<Event>, E>
    where
        F: FnOnce(&mut EventDetails, &mut EventStatus, u32) -> Result<(), E>,
        E: From<StoreError>,
    {
        let timer = OperationTimer::new("events.update");
        let organizations = self.db.organizations().read().await;
        let mut events = self.db.stage_events().await;

        let Some(index) = events.rows().iter().position(|e| e.id == id) else {
            return Ok(None);
        };

        let mut record = events.rows()[index].clone();
        f(
            &mut record.details,
            &mut record.status,
            record.current_attendees,
        )?;

        let old_title = &events.rows()[index].details.title;
        if shared::slug::slugify(&record.details.title) != shared::slug::slugify(old_title) {
            let slug = event_slug(&record.details.title, events.rows(), Some(id));
            if slug != record.slug {
                let old = std::mem::replace(&mut record.slug, slug);
                record.previous_slugs.retain(|s| *s != record.slug);
                record.previous_slugs.push(old);
            }
        }
        record.updated_at = Utc::now();

        let event = resolve(&record, &organizations);
        events.rows_mut()[index] = record;
        self.db.commit(events).await?;
        timer.record();

        Ok(event)
    }

    /// Deletes event `id` and removes it from every user's favorites and
    /// bookmarks. Returns `Ok(None)` when there was nothing to delete.
    pub async fn delete(&self, id: Uuid) -> Result<Option<DeletedEvent>, StoreError> {
        let timer = OperationTimer::new("events.delete");
        let mut users = self.db.stage_users().await;
        let mut events = self.db.stage_events().await;

        let Some(index) = events.rows().iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        let removed = events.rows_mut().remove(index);

        let mut subscriber_ids = Vec::new();
        let referencing = users.rows().iter().any(|u| {
            u.favorite_event_ids.contains(&id) || u.bookmarked_event_ids.contains(&id)
        });
        if referencing {
            let now = Utc::now();
            for user in users.rows_mut().iter_mut() {
                let referenced =
                    user.favorite_event_ids.contains(&id) || user.bookmarked_event_ids.contains(&id);
                if !referenced {
                    continue;
                }
                if user.forget_event(id) {
                    subscriber_ids.push(user.id);
                }
                user.updated_at = now;
            }
        }

        let writes: Vec<_> = [users.pending()?, events.pending()?]
            .into_iter()
            .flatten()
            .collect();
        self.db.persist(writes).await?;
        users.swap();
        events.swap();
        timer.record();

        tracing::info!(
            event_id = %id,
            subscribers = subscriber_ids.len(),
            "Event deleted"
        );
        Ok(Some(DeletedEvent {
            id,
            title: removed.details.title,
            slug: removed.slug,
            subscriber_ids,
        }))
    }

    /// Takes a seat for `contact_email`.
    ///
    /// The capacity check and the increment happen under the events write
    /// lock.
    pub async fn subscribe(
        &self,
        event_id: Uuid,
        contact_email: &str,
    ) -> Result<SubscribeOutcome, StoreError> {
        let timer = OperationTimer::new("events.subscribe");
        let email = normalize_email(contact_email);
        let mut users = self.db.stage_users().await;
        let organizations = self.db.organizations().read().await;
        let mut events = self.db.stage_events().await;

        let Some(index) = events.rows().iter().position(|e| e.id == event_id) else {
            return Ok(SubscribeOutcome::NotFound);
        };
        let current = &events.rows()[index];
        if current.status != EventStatus::Published {
            return Ok(SubscribeOutcome::Closed(current.status));
        }
        if current.is_full() {
            return Ok(SubscribeOutcome::Full {
                max_attendees: current.details.max_attendees,
            });
        }

        let record = &mut events.rows_mut()[index];
        record.current_attendees += 1;
        record.updated_at = Utc::now();
        let Some(event) = resolve(record, &organizations) else {
            return Ok(SubscribeOutcome::NotFound);
        };

        let user_id = match users.rows().iter().position(|u| u.email == email) {
            Some(user_index) => {
                let user = &users.rows()[user_index];
                if !user.favorite_event_ids.contains(&event_id) {
                    let user = &mut users.rows_mut()[user_index];
                    user.favorite_event_ids.push(event_id);
                    user.updated_at = Utc::now();
                }
                Some(users.rows()[user_index].id)
            }
            None => None,
        };

        let writes: Vec<_> = [users.pending()?, events.pending()?]
            .into_iter()
            .flatten()
            .collect();
        self.db.persist(writes).await?;
        users.swap();
        events.swap();
        timer.record();

        tracing::info!(
            event_id = %event_id,
            attendees = event.current_attendees,
            registered = user_id.is_some(),
            "Subscription recorded"
        );
        Ok(SubscribeOutcome::Subscribed { event, user_id })
    }

    /// Releases a seat and drops the event from the user's favorites.
    ///
    /// Missing ids are ignored, and attendance never goes below zero.
    pub async fn unsubscribe(&self, user_id: Uuid, event_id: Uuid) -> Result<(), StoreError> {
        let mut users = self.db.stage_users().await;
        let mut events = self.db.stage_events().await;

        if let Some(user) = users.rows().iter().position(|u| u.id == user_id) {
            if users.rows()[user].favorite_event_ids.contains(&event_id) {
                let user = &mut users.rows_mut()[user];
                user.favorite_event_ids.retain(|id| *id != event_id);
                user.updated_at = Utc::now();
            }
        }
        if let Some(event) = events.rows().iter().position(|e| e.id == event_id) {
            if events.rows()[event].current_attendees > 0 {
                let event = &mut events.rows_mut()[event];
                event.current_attendees -= 1;
                event.updated_at = Utc::now();
            }
        }

        let writes: Vec<_> = [users.pending()?, events.pending()?]
            .into_iter()
            .flatten()
            .collect();
        self.db.persist(writes).await?;
        users.swap();
        events.swap();
        Ok(())
    }
}
