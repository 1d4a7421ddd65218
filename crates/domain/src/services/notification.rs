//! Notifications generated by domain events.
//!
//! Each constructor turns one domain event into the notification a single
//! recipient receives. Services fan these out to every affected user.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Event, Notification, NotificationKind, Organization, User};

/// Favorited events starting within this many hours get a reminder.
pub const REMINDER_WINDOW_HOURS: i64 = 24;

const REMINDER_TITLE: &str = "Evento Próximo";

fn event_link(slug: &str) -> String {
    format!("/eventos/{}", slug)
}

/// Notification builders, one per domain event.
pub struct NotificationTemplate;

impl NotificationTemplate {
    pub fn welcome(user: &User) -> Notification {
        Notification::new(
            user.id,
            NotificationKind::Success,
            "Bienvenido a CibESphere",
            format!(
                "Hola {}, tu cuenta se ha creado correctamente.",
                user.first_name
            ),
            Some("/perfil".to_string()),
        )
    }

    /// Sent to each administrator when an organizer registers a new organization.
    pub fn organization_created(admin_id: Uuid, organization: &Organization) -> Notification {
        Notification::new(
            admin_id,
            NotificationKind::Info,
            "Nueva Organización",
            format!(
                "Una nueva organización \"{}\" se ha unido y está pendiente de verificación.",
                organization.name
            ),
            Some(format!("/organizaciones/{}", organization.slug)),
        )
    }

    pub fn organization_verified(owner_id: Uuid, organization: &Organization) -> Notification {
        Notification::new(
            owner_id,
            NotificationKind::Success,
            "Organización Verificada",
            format!("Tu organización \"{}\" ha sido verificada.", organization.name),
            Some(format!("/organizaciones/{}", organization.slug)),
        )
    }

    pub fn subscription_confirmed(user_id: Uuid, event: &Event) -> Notification {
        Notification::new(
            user_id,
            NotificationKind::Success,
            "Registro Exitoso",
            format!(
                "Te has registrado correctamente en \"{}\".",
                event.details.title
            ),
            Some(event_link(&event.slug)),
        )
    }

    /// The event no longer exists, so there is nothing to link to.
    pub fn event_removed(user_id: Uuid, event_title: &str) -> Notification {
        Notification::new(
            user_id,
            NotificationKind::Warning,
            "Evento Cancelado",
            format!("El evento \"{}\" ha sido eliminado.", event_title),
            None,
        )
    }

    pub fn event_reminder(user_id: Uuid, event: &Event) -> Notification {
        Notification::new(
            user_id,
            NotificationKind::Info,
            REMINDER_TITLE,
            format!("Tu evento \"{}\" comienza pronto.", event.details.title),
            Some(event_link(&event.slug)),
        )
    }

    /// Whether `notification` is the reminder for `event` sent to `user_id`.
    pub fn is_reminder_for(notification: &Notification, user_id: Uuid, event: &Event) -> bool {
        notification.recipient_id == user_id
            && notification.title == REMINDER_TITLE
            && notification.link.as_deref() == Some(event_link(&event.slug).as_str())
    }
}

/// A published event that starts within the reminder window after `now`.
pub fn needs_reminder(event: &Event, now: DateTime<Utc>) -> bool {
    let start = event.details.start_date;
    event.is_published() && start > now && start <= now + Duration::hours(REMINDER_WINDOW_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::tests::sample_details;
    use crate::models::{EventStatus, Role, SocialLinks};

    fn organization() -> Organization {
        let now = Utc::now();
        Organization {
            id: Uuid::new_v4(),
            slug: "secops-madrid".to_string(),
            name: "SecOps Madrid".to_string(),
            logo_url: String::new(),
            is_verified: false,
            city: "Desconocida".to_string(),
            description: None,
            banner_url: None,
            website: None,
            email: None,
            social_links: SocialLinks::default(),
            owner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn event_starting_at(start: DateTime<Utc>) -> Event {
        let mut details = sample_details();
        details.start_date = start;
        details.end_date = start + Duration::hours(8);
        Event {
            id: Uuid::new_v4(),
            slug: "dfir-workshop-sevilla".to_string(),
            details,
            current_attendees: 0,
            status: EventStatus::Published,
            organization: organization(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_welcome_addressed_to_user() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "juan@cibesphere.local".to_string(),
            first_name: "Juan".to_string(),
            last_name: "Pérez".to_string(),
            full_name: "Juan Pérez".to_string(),
            role: Role::Attendee,
            is_active: true,
            is_verified: false,
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
        };
        let n = NotificationTemplate::welcome(&user);
        assert_eq!(n.recipient_id, user.id);
        assert!(n.message.contains("Juan"));
    }

    #[test]
    fn test_organization_created_mentions_name() {
        let admin = Uuid::new_v4();
        let n = NotificationTemplate::organization_created(admin, &organization());
        assert_eq!(n.recipient_id, admin);
        assert!(n.message.contains("SecOps Madrid"));
        assert_eq!(n.link.as_deref(), Some("/organizaciones/secops-madrid"));
    }

    #[test]
    fn test_reminder_identity() {
        let user = Uuid::new_v4();
        let event = event_starting_at(Utc::now() + Duration::hours(2));
        let reminder = NotificationTemplate::event_reminder(user, &event);

        assert!(NotificationTemplate::is_reminder_for(&reminder, user, &event));
        assert!(!NotificationTemplate::is_reminder_for(&reminder, Uuid::new_v4(), &event));

        let confirmation = NotificationTemplate::subscription_confirmed(user, &event);
        assert!(!NotificationTemplate::is_reminder_for(&confirmation, user, &event));
    }

    #[test]
    fn test_needs_reminder_window() {
        let now = Utc::now();
        assert!(needs_reminder(&event_starting_at(now + Duration::hours(23)), now));
        assert!(needs_reminder(&event_starting_at(now + Duration::hours(24)), now));
        assert!(!needs_reminder(&event_starting_at(now + Duration::hours(25)), now));
        assert!(!needs_reminder(&event_starting_at(now - Duration::hours(1)), now));

        let mut draft = event_starting_at(now + Duration::hours(1));
        draft.status = EventStatus::Draft;
        assert!(!needs_reminder(&draft, now));
    }
}
