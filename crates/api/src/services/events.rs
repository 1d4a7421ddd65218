//! Event catalog, subscriptions and bookmarks.

use std::sync::Arc;

use domain::models::{
    BookmarkToggle, CreateEventRequest, Event, EventFilter, EventStatus, SubscriptionConfirmation,
    UpdateEventRequest,
};
use domain::services::NotificationTemplate;
use persistence::repositories::{
    BookmarkOutcome, EventRepository, NotificationRepository, SubscribeOutcome, UserRepository,
};
use persistence::Database;
use shared::validation::validate_attendance;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::error::ApiError;
use crate::services::network::{Latency, Network};
use crate::services::notifications::deliver;
use crate::services::session::SessionStore;

const SUBSCRIBED: &str = "¡Suscripción confirmada!";
const BOOKMARK_ADDED: &str = "Evento guardado";
const BOOKMARK_REMOVED: &str = "Evento eliminado de guardados";

fn rule_violation(err: ValidationError) -> ApiError {
    ApiError::Validation(
        err.message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string()),
    )
}

pub struct EventService {
    events: EventRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    session: Arc<SessionStore>,
    network: Network,
}

impl EventService {
    pub fn new(db: &Database, session: Arc<SessionStore>, network: Network) -> Self {
        Self {
            events: EventRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            notifications: NotificationRepository::new(db.clone()),
            session,
            network,
        }
    }

    /// Published events matching `filter`, soonest first.
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, ApiError> {
        self.network
            .call("list_events", Latency::Half, async {
                Ok(self.events.list_published(filter).await)
            })
            .await
    }

    /// Resolves current slugs and the aliases left by earlier titles.
    pub async fn get_event_by_slug(&self, slug: &str) -> Result<Event, ApiError> {
        self.network
            .call("get_event_by_slug", Latency::Third, async {
                self.events
                    .find_by_slug(slug)
                    .await
                    .ok_or_else(|| ApiError::not_found("Event"))
            })
            .await
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event, ApiError> {
        self.network
            .call("get_event", Latency::Third, async {
                self.events
                    .find_by_id(id)
                    .await
                    .ok_or_else(|| ApiError::not_found("Event"))
            })
            .await
    }

    /// Every event of an organization, drafts and canceled included.
    pub async fn list_organization_events(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Event>, ApiError> {
        self.network
            .call("list_organization_events", Latency::Half, async {
                Ok(self.events.list_by_organization(organization_id).await)
            })
            .await
    }

    pub async fn create_event(
        &self,
        request: CreateEventRequest,
        organization_id: Uuid,
    ) -> Result<Event, ApiError> {
        self.network
            .call("create_event", Latency::Full, async {
                request.validate()?;
                self.events
                    .create(organization_id, request)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Organization"))
            })
            .await
    }

    /// Merges `request` into the event. The merged body is validated as a
    /// whole and capacity cannot drop below the seats already taken.
    pub async fn update_event(
        &self,
        id: Uuid,
        request: UpdateEventRequest,
    ) -> Result<Event, ApiError> {
        self.network
            .call("update_event", Latency::Full, async {
                self.events
                    .update(id, |details, status, current_attendees| {
                        request.apply(details, status);
                        details.validate()?;
                        validate_attendance(current_attendees, details.max_attendees)
                            .map_err(rule_violation)
                    })
                    .await?
                    .ok_or_else(|| ApiError::not_found("Event"))
            })
            .await
    }

    /// Idempotent. Users that had the event among their favorites are told.
    pub async fn delete_event(&self, id: Uuid) -> Result<(), ApiError> {
        self.network
            .call("delete_event", Latency::Half, async {
                if let Some(deleted) = self.events.delete(id).await? {
                    let batch = deleted
                        .subscriber_ids
                        .iter()
                        .map(|user| NotificationTemplate::event_removed(*user, &deleted.title))
                        .collect();
                    deliver(&self.notifications, batch).await;
                }
                Ok(())
            })
            .await?;

        self.session.resync().await;
        Ok(())
    }

    /// Takes a seat. Registered emails also get the event as a favorite and
    /// a confirmation in their inbox.
    pub async fn subscribe_to_event(
        &self,
        event_id: Uuid,
        contact_email: &str,
    ) -> Result<SubscriptionConfirmation, ApiError> {
        let confirmation = self
            .network
            .call("subscribe_to_event", Latency::Full, async {
                if !contact_email.validate_email() {
                    return Err(ApiError::Validation("Invalid email format".to_string()));
                }

                match self.events.subscribe(event_id, contact_email).await? {
                    SubscribeOutcome::Subscribed { event, user_id } => {
                        if let Some(user_id) = user_id {
                            deliver(
                                &self.notifications,
                                vec![NotificationTemplate::subscription_confirmed(user_id, &event)],
                            )
                            .await;
                        }
                        Ok(SubscriptionConfirmation {
                            event_id: event.id,
                            contact_email: contact_email.trim().to_lowercase(),
                            current_attendees: event.current_attendees,
                            user_id,
                            message: SUBSCRIBED.to_string(),
                        })
                    }
                    SubscribeOutcome::NotFound => Err(ApiError::not_found("Event")),
                    SubscribeOutcome::Full { max_attendees } => {
                        Err(ApiError::CapacityExceeded { max_attendees })
                    }
                    SubscribeOutcome::Closed(status) => Err(ApiError::Validation(match status {
                        EventStatus::Canceled => "Event has been canceled".to_string(),
                        other => format!("Event is not open for subscriptions ({})", other),
                    })),
                }
            })
            .await?;

        if let Some(user_id) = confirmation.user_id {
            self.session.resync_user(user_id).await;
        }
        Ok(confirmation)
    }

    /// Safe to retry: unknown ids are ignored and the count never goes
    /// below zero.
    pub async fn unsubscribe_from_event(&self, user_id: Uuid, event_id: Uuid) -> Result<(), ApiError> {
        self.network
            .call("unsubscribe_from_event", Latency::Half, async {
                Ok(self.events.unsubscribe(user_id, event_id).await?)
            })
            .await?;

        self.session.resync_user(user_id).await;
        Ok(())
    }

    pub async fn toggle_bookmark(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<BookmarkToggle, ApiError> {
        let toggle = self
            .network
            .call("toggle_bookmark", Latency::Eighths(3), async {
                match self.users.toggle_bookmark(user_id, event_id).await? {
                    BookmarkOutcome::Added => Ok(BookmarkToggle {
                        is_bookmarked: true,
                        message: BOOKMARK_ADDED.to_string(),
                    }),
                    BookmarkOutcome::Removed => Ok(BookmarkToggle {
                        is_bookmarked: false,
                        message: BOOKMARK_REMOVED.to_string(),
                    }),
                    BookmarkOutcome::UnknownUser => Err(ApiError::not_found("User")),
                    BookmarkOutcome::UnknownEvent => Err(ApiError::not_found("Event")),
                }
            })
            .await?;

        self.session.resync_user(user_id).await;
        Ok(toggle)
    }
}
