//! Authentication: login, registration and session lifecycle.

use std::sync::Arc;

use domain::models::{LoginRequest, RegisterRequest, Role, Session};
use domain::services::NotificationTemplate;
use persistence::repositories::{NewOrganization, NewUser, NotificationRepository, UserRepository};
use persistence::Database;
use shared::password::{check_policy, hash_password, verify_against_dummy, verify_password};
use validator::Validate;

use crate::error::ApiError;
use crate::services::network::{Latency, Network};
use crate::services::notifications::deliver;
use crate::services::session::SessionStore;

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    notifications: NotificationRepository,
    session: Arc<SessionStore>,
    network: Network,
}

impl AuthService {
    pub fn new(db: &Database, session: Arc<SessionStore>, network: Network) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            notifications: NotificationRepository::new(db.clone()),
            session,
            network,
        }
    }

    /// Authenticates with email and password and opens a session.
    ///
    /// Unknown emails, inactive accounts and wrong passwords all fail with
    /// the same error, after the same amount of hashing work.
    pub async fn login(&self, request: LoginRequest) -> Result<Session, ApiError> {
        self.network
            .call("login", Latency::Full, async {
                request.validate()?;

                let Some(credentials) = self.users.find_credentials(&request.email).await else {
                    verify_against_dummy(&request.password);
                    tracing::info!("Login failed: unknown email");
                    return Err(ApiError::InvalidCredentials);
                };

                let is_valid = verify_password(&request.password, &credentials.password_hash)?;
                if !is_valid || !credentials.user.is_active {
                    tracing::info!(
                        user_id = %credentials.user.id,
                        active = credentials.user.is_active,
                        "Login failed"
                    );
                    return Err(ApiError::InvalidCredentials);
                }

                let session = self.session.issue(credentials.user)?;
                self.session.establish(session.clone()).await?;
                Ok(session)
            })
            .await
    }

    /// Creates an account and logs it in.
    ///
    /// Organizers that name an organization get it created alongside their
    /// account, unverified, and every administrator is told about it.
    pub async fn register(&self, request: RegisterRequest) -> Result<Session, ApiError> {
        self.network
            .call("register", Latency::Full, async {
                request.validate()?;
                check_policy(&request.password).map_err(ApiError::WeakPassword)?;

                let new_organization = match (&request.role, &request.organization_name) {
                    (Role::Organizer, Some(name)) if !name.trim().is_empty() => {
                        Some(NewOrganization {
                            name: name.clone(),
                            website: request.organization_website.clone(),
                        })
                    }
                    _ => None,
                };

                let password_hash = hash_password(&request.password)?;
                let (user, organization) = self
                    .users
                    .create::<ApiError>(
                        NewUser {
                            email: request.email,
                            password_hash,
                            first_name: request.first_name,
                            last_name: request.last_name,
                            role: request.role,
                        },
                        new_organization,
                    )
                    .await?;

                let mut batch = vec![NotificationTemplate::welcome(&user)];
                if let Some(organization) = &organization {
                    batch.extend(
                        self.users
                            .admin_ids()
                            .await
                            .into_iter()
                            .map(|admin| NotificationTemplate::organization_created(admin, organization)),
                    );
                }
                deliver(&self.notifications, batch).await;

                let session = self.session.issue(user)?;
                self.session.establish(session.clone()).await?;
                Ok(session)
            })
            .await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.logout().await
    }

    pub async fn refresh_session(&self) -> Result<Session, ApiError> {
        self.network
            .call("refresh_session", Latency::Half, self.session.refresh_session())
            .await
    }
}
