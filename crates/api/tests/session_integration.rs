//! Integration tests for the session snapshot following data mutations.

mod common;

use cibesphere_api::app::AppState;
use common::*;
use domain::models::{SessionState, UpdateOrganizationRequest, User};

async fn me(state: &AppState) -> User {
    state
        .session
        .current_identity()
        .await
        .expect("logged in")
}

#[tokio::test]
async fn test_bookmark_toggle_reaches_session() {
    let state = test_state().await;
    login_as(&state, ATTENDEE_EMAIL, ATTENDEE_PASSWORD).await;
    let mut watcher = state.session.subscribe();
    watcher.borrow_and_update();

    let toggle = state
        .events
        .toggle_bookmark(id(ATTENDEE_ID), id(BOOTCAMP_ID))
        .await
        .unwrap();
    assert!(toggle.is_bookmarked);
    assert!(watcher.has_changed().unwrap());
    assert!(me(&state).await.has_bookmark(id(BOOTCAMP_ID)));

    state
        .events
        .toggle_bookmark(id(ATTENDEE_ID), id(BOOTCAMP_ID))
        .await
        .unwrap();
    assert!(!me(&state).await.has_bookmark(id(BOOTCAMP_ID)));
}

#[tokio::test]
async fn test_subscription_and_unsubscription_reach_session() {
    let state = test_state().await;
    login_as(&state, ATTENDEE_EMAIL, ATTENDEE_PASSWORD).await;

    state
        .events
        .subscribe_to_event(id(BOOTCAMP_ID), ATTENDEE_EMAIL)
        .await
        .unwrap();
    assert!(me(&state).await.has_favorite(id(BOOTCAMP_ID)));

    state
        .events
        .unsubscribe_from_event(id(ATTENDEE_ID), id(BOOTCAMP_ID))
        .await
        .unwrap();
    assert!(!me(&state).await.has_favorite(id(BOOTCAMP_ID)));
}

#[tokio::test]
async fn test_event_deletion_reaches_session() {
    let state = test_state().await;
    login_as(&state, ATTENDEE_EMAIL, ATTENDEE_PASSWORD).await;
    assert!(me(&state).await.has_favorite(id(SUMMIT_ID)));

    state.events.delete_event(id(SUMMIT_ID)).await.unwrap();

    let current = me(&state).await;
    assert!(!current.has_favorite(id(SUMMIT_ID)));
    assert!(current.has_favorite(id(RED_VS_BLUE_ID)));
}

#[tokio::test]
async fn test_organization_update_reaches_member_session() {
    let (state, storage) = seeded_storage().await;
    login_as(&state, ORGANIZER_EMAIL, ORGANIZER_PASSWORD).await;

    state
        .organizations
        .update_organization(
            id(CYBERSECURITY_SPAIN_ID),
            UpdateOrganizationRequest {
                name: Some("CyberSecurity Iberia".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let organization = me(&state).await.organization.expect("member of an organization");
    assert_eq!(organization.name, "CyberSecurity Iberia");

    let restarted = state_over(storage, None).await;
    let hydrated = restarted.session.hydrate().await;
    assert_eq!(
        hydrated.user().and_then(|u| u.organization.as_ref()).map(|o| o.name.as_str()),
        Some("CyberSecurity Iberia")
    );
}

#[tokio::test]
async fn test_deleting_logged_in_user_ends_session() {
    let (state, storage) = seeded_storage().await;
    login_as(&state, ATTENDEE_EMAIL, ATTENDEE_PASSWORD).await;

    state.users.delete_user(id(ATTENDEE_ID)).await.unwrap();
    assert_eq!(state.session.state(), SessionState::Anonymous);

    let restarted = state_over(storage, None).await;
    assert_eq!(restarted.session.hydrate().await, SessionState::Anonymous);
}

#[tokio::test]
async fn test_other_users_mutations_leave_session_alone() {
    let state = test_state().await;
    login_as(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let mut watcher = state.session.subscribe();
    watcher.borrow_and_update();

    state
        .events
        .toggle_bookmark(id(ATTENDEE_ID), id(BOOTCAMP_ID))
        .await
        .unwrap();
    state.users.delete_user(id(ORGANIZER_ID)).await.unwrap();

    assert!(!watcher.has_changed().unwrap());
    assert!(state.session.is_authenticated());
}
