use std::sync::Arc;

use persistence::{Database, FileStorage, Fixture, MemoryStorage, SnapshotStorage, StoreError};
use shared::jwt::{JwtError, TokenIssuer};
use thiserror::Error;

use crate::config::Config;
use crate::jobs::{EventReminderJob, JobScheduler, StoreMetricsJob};
use crate::services::{
    AuthService, DashboardService, EventService, Network, NotificationService,
    OrganizationService, SessionStore, UserService,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Token configuration error: {0}")]
    Token(#[from] JwtError),

    #[error("Unknown storage backend: {0}")]
    UnknownBackend(String),
}

/// Everything a view needs, built once per process around one [`Database`].
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub session: Arc<SessionStore>,
    pub auth: Arc<AuthService>,
    pub events: Arc<EventService>,
    pub organizations: Arc<OrganizationService>,
    pub users: Arc<UserService>,
    pub dashboard: Arc<DashboardService>,
    pub notifications: Arc<NotificationService>,
}

pub async fn open_storage(config: &Config) -> Result<Arc<dyn SnapshotStorage>, StartupError> {
    match config.storage.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        "file" => Ok(Arc::new(FileStorage::open(&config.storage.data_dir).await?)),
        other => Err(StartupError::UnknownBackend(other.to_string())),
    }
}

impl AppState {
    /// Opens the configured storage, seeding it if enabled.
    pub async fn build(config: Config) -> Result<Self, StartupError> {
        let storage = open_storage(&config).await?;
        let fixture = if config.storage.seed {
            Some(Fixture::bundled()?)
        } else {
            None
        };
        let db = Database::open(storage, fixture.as_ref()).await?;

        let sizes = db.sizes().await;
        tracing::info!(
            backend = %config.storage.backend,
            users = sizes.users,
            organizations = sizes.organizations,
            events = sizes.events,
            "Store opened"
        );

        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> Result<Self, StartupError> {
        let secret = if config.auth.jwt_secret.is_empty() {
            tracing::warn!("No JWT secret configured; sessions will not survive a restart");
            shared::crypto::generate_secure_token()
        } else {
            config.auth.jwt_secret.clone()
        };
        let tokens = TokenIssuer::new(
            &secret,
            config.auth.access_token_expiry_secs,
            config.auth.refresh_token_expiry_secs,
            config.auth.leeway_secs,
        )?;

        let network = Network::from_config(&config);
        let session = Arc::new(SessionStore::new(&db, tokens));

        Ok(Self {
            auth: Arc::new(AuthService::new(&db, session.clone(), network.clone())),
            events: Arc::new(EventService::new(&db, session.clone(), network.clone())),
            organizations: Arc::new(OrganizationService::new(
                &db,
                session.clone(),
                network.clone(),
            )),
            users: Arc::new(UserService::new(&db, session.clone(), network.clone())),
            dashboard: Arc::new(DashboardService::new(&db, network.clone())),
            notifications: Arc::new(NotificationService::new(&db, network)),
            session,
            db,
            config: Arc::new(config),
        })
    }

    /// Scheduler with the background jobs enabled in configuration.
    pub fn scheduler(&self) -> JobScheduler {
        let mut scheduler = JobScheduler::new();
        if self.config.jobs.enabled {
            scheduler.register(EventReminderJob::new(
                self.notifications.clone(),
                self.config.jobs.reminder_interval_minutes,
            ));
            scheduler.register(StoreMetricsJob::new(
                self.db.clone(),
                self.config.jobs.metrics_interval_secs,
            ));
        }
        scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_seeds_memory_store() {
        let config = Config::load_for_test(&[]).unwrap();
        let state = AppState::build(config).await.unwrap();
        let sizes = state.db.sizes().await;
        assert_eq!(sizes.organizations, 3);
        assert_eq!(sizes.events, 4);
        assert_eq!(sizes.users, 3);
        assert!(state.scheduler().is_empty());
    }

    #[tokio::test]
    async fn test_build_without_seed() {
        let config = Config::load_for_test(&[("storage.seed", "false")]).unwrap();
        let state = AppState::build(config).await.unwrap();
        assert_eq!(state.db.sizes().await.events, 0);
    }

    #[tokio::test]
    async fn test_ephemeral_secret() {
        let config = Config::load_for_test(&[("auth.jwt_secret", "")]).unwrap();
        assert!(AppState::build(config).await.is_ok());
    }

    #[tokio::test]
    async fn test_jobs_registered_when_enabled() {
        let config = Config::load_for_test(&[("jobs.enabled", "true")]).unwrap();
        let state = AppState::build(config).await.unwrap();
        assert_eq!(state.scheduler().len(), 2);
    }

    #[tokio::test]
    async fn test_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_for_test(&[
            ("storage.backend", "file"),
            ("storage.data_dir", dir.path().to_str().unwrap()),
        ])
        .unwrap();
        let state = AppState::build(config).await.unwrap();
        assert_eq!(state.db.sizes().await.users, 3);
        assert!(dir.path().join("cibesphere_users_v1.json").exists());
    }
}
