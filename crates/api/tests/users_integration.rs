//! Integration tests for user administration and notifications.

mod common;

use chrono::{Duration, Utc};
use cibesphere_api::error::ApiError;
use common::*;
use domain::models::{Role, UpdateEventRequest, UpdateUserRequest};

#[tokio::test]
async fn test_list_users() {
    let state = test_state().await;
    state.auth.register(registration(Role::Attendee)).await.unwrap();

    let users = state.users.list_users().await.unwrap();
    assert_eq!(users.len(), 4);
    assert!(users.iter().any(|u| u.role == Role::Admin));
}

#[tokio::test]
async fn test_get_me_resolves_organization() {
    let state = test_state().await;
    let me = state.users.get_me(id(ORGANIZER_ID)).await.unwrap();
    assert_eq!(me.email, ORGANIZER_EMAIL);
    assert_eq!(me.organization.unwrap().id, id(CYBERSECURITY_SPAIN_ID));

    assert!(matches!(
        state.users.get_me(uuid::Uuid::new_v4()).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_user_email_is_normalized() {
    let state = test_state().await;
    let user = state
        .users
        .update_user(
            id(ATTENDEE_ID),
            UpdateUserRequest {
                email: Some("Nuevo.Correo@Example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(user.email, "nuevo.correo@example.com");

    let session = login_as(&state, "nuevo.correo@example.com", ATTENDEE_PASSWORD).await;
    assert_eq!(session.user.id, id(ATTENDEE_ID));
}

#[tokio::test]
async fn test_update_user_rejects_invalid_fields() {
    let state = test_state().await;
    let result = state
        .users
        .update_user(
            id(ATTENDEE_ID),
            UpdateUserRequest {
                avatar_url: Some("not a url".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_delete_owner_keeps_organization() {
    let state = test_state().await;
    state.users.delete_user(id(ORGANIZER_ID)).await.unwrap();

    let organization = state
        .organizations
        .get_organization(id(CYBERSECURITY_SPAIN_ID))
        .await
        .unwrap();
    assert_eq!(organization.owner_id, None);
    assert!(matches!(
        state.users.delete_user(id(ORGANIZER_ID)).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_user_drops_notifications() {
    let state = test_state().await;
    let session = state.auth.register(registration(Role::Attendee)).await.unwrap();
    let user_id = session.user.id;
    assert_eq!(state.notifications.unread_count(user_id).await, 1);

    state.users.delete_user(user_id).await.unwrap();
    assert_eq!(state.notifications.unread_count(user_id).await, 0);
}

#[tokio::test]
async fn test_reminders_for_favorites_starting_soon() {
    let state = test_state().await;
    let start = Utc::now() + Duration::hours(6);
    state
        .events
        .update_event(
            id(RED_VS_BLUE_ID),
            UpdateEventRequest {
                start_date: Some(start),
                end_date: Some(start + Duration::hours(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let now = Utc::now();
    assert_eq!(state.notifications.generate_event_reminders(now).await.unwrap(), 1);
    assert_eq!(state.notifications.generate_event_reminders(now).await.unwrap(), 0);

    let inbox = state
        .notifications
        .get_notifications(id(ATTENDEE_ID))
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(
        inbox[0].link.as_deref(),
        Some("/eventos/red-team-vs-blue-team-bcn")
    );
}

#[tokio::test]
async fn test_notifications_are_scoped_and_markable() {
    let state = test_state().await;
    let session = state.auth.register(registration(Role::Attendee)).await.unwrap();
    let user_id = session.user.id;

    let inbox = state.notifications.get_notifications(user_id).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(state
        .notifications
        .get_notifications(id(ATTENDEE_ID))
        .await
        .unwrap()
        .is_empty());

    state
        .notifications
        .mark_notification_as_read(inbox[0].id)
        .await
        .unwrap();
    state
        .notifications
        .mark_notification_as_read(uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(state.notifications.unread_count(user_id).await, 0);
    assert_eq!(state.notifications.mark_all_as_read(user_id).await.unwrap(), 0);
}
