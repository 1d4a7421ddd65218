//! Common test utilities for integration tests.
//!
//! Every test gets its own in-memory store seeded with the bundled demo
//! catalog, and a zero-latency network.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use cibesphere_api::app::AppState;
use cibesphere_api::config::Config;
use domain::models::{
    CreateEventRequest, EventLanguage, EventLevel, LoginRequest, RegisterRequest, Role, Session,
};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use persistence::{Database, Fixture, MemoryStorage, SnapshotStorage, StoreError};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@cybesphere.local";
pub const ADMIN_PASSWORD: &str = "Admin123!";
pub const ORGANIZER_EMAIL: &str = "organizer@cybesphere.local";
pub const ORGANIZER_PASSWORD: &str = "Organizer123!";
pub const ATTENDEE_EMAIL: &str = "attendee@cybesphere.local";
pub const ATTENDEE_PASSWORD: &str = "Attendee123!";

pub const ORGANIZER_ID: &str = "a1b2c3d4-0002-0002-0002-000000000002";
pub const ATTENDEE_ID: &str = "a1b2c3d4-0003-0003-0003-000000000003";

pub const CYBERSECURITY_SPAIN_ID: &str = "0a000000-0000-4000-a000-000000000001";
pub const HACKINGETIC_ID: &str = "0a000000-0000-4000-a000-000000000002";

pub const SUMMIT_ID: &str = "0e000000-0000-4000-b000-000000000001";
pub const BOOTCAMP_ID: &str = "0e000000-0000-4000-b000-000000000002";
pub const RED_VS_BLUE_ID: &str = "0e000000-0000-4000-b000-000000000003";
pub const DFIR_ID: &str = "0e000000-0000-4000-b000-000000000004";

pub fn id(value: &str) -> Uuid {
    value.parse().expect("valid uuid literal")
}

pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("Failed to load test config")
}

/// Seeded state over a fresh memory store.
pub async fn test_state() -> AppState {
    AppState::build(test_config())
        .await
        .expect("Failed to build app state")
}

/// State over a caller-owned storage, so a test can fail writes or reopen it.
pub async fn state_over(storage: Arc<MemoryStorage>, fixture: Option<&Fixture>) -> AppState {
    let db = Database::open(storage, fixture)
        .await
        .expect("Failed to open database");
    AppState::with_database(test_config(), db).expect("Failed to build app state")
}

pub async fn seeded_storage() -> (AppState, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let fixture = Fixture::bundled().expect("bundled fixture");
    let state = state_over(storage.clone(), Some(&fixture)).await;
    (state, storage)
}

pub async fn login_as(state: &AppState, email: &str, password: &str) -> Session {
    state
        .auth
        .login(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
        .expect("Login failed")
}

pub fn unique_email() -> String {
    let email: String = SafeEmail().fake();
    format!("{}.{}", &Uuid::new_v4().simple().to_string()[..8], email)
}

pub fn registration(role: Role) -> RegisterRequest {
    RegisterRequest {
        email: unique_email(),
        password: "SecureP@ss1".to_string(),
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        role,
        organization_name: None,
        organization_website: None,
    }
}

pub fn starts_in(days: i64) -> DateTime<Utc> {
    let date = (Utc::now() + Duration::days(days)).date_naive();
    Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).expect("valid time"))
}

/// A free in-person event in Bilbao.
pub fn event_draft(title: &str) -> CreateEventRequest {
    let start_date = starts_in(30);
    CreateEventRequest {
        title: title.to_string(),
        short_desc: "Jornada de seguridad ofensiva".to_string(),
        description: "Charlas y talleres prácticos.".to_string(),
        event_type: String::new(),
        category: String::new(),
        level: EventLevel::Intermedio,
        start_date,
        end_date: start_date + Duration::hours(8),
        is_online: false,
        venue_name: Some("Palacio Euskalduna".to_string()),
        venue_address: None,
        venue_city: Some("Bilbao".to_string()),
        venue_community: Some("País Vasco".to_string()),
        latitude: None,
        longitude: None,
        online_url: None,
        max_attendees: 100,
        is_free: true,
        price: None,
        image_url: String::new(),
        banner_url: String::new(),
        tags: vec!["Hacking".to_string()],
        language: EventLanguage::Basque,
        agenda: Vec::new(),
        speakers: Vec::new(),
        requirements: None,
    }
}

/// Storage whose writes to one record take `delay` before landing.
pub struct SlowStorage {
    inner: Arc<MemoryStorage>,
    slow_key: &'static str,
    delay: StdDuration,
}

impl SlowStorage {
    pub fn new(inner: Arc<MemoryStorage>, slow_key: &'static str, delay: StdDuration) -> Self {
        Self {
            inner,
            slow_key,
            delay,
        }
    }
}

#[async_trait::async_trait]
impl SnapshotStorage for SlowStorage {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if key == self.slow_key {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.save(key, bytes).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key).await
    }
}
