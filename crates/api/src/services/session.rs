//! Session store.
//!
//! Holds the current identity and mirrors it to the persisted session record
//! so it survives a restart. Views observe state changes through
//! [`SessionStore::subscribe`].

use chrono::{DateTime, Utc};
use domain::models::session::BEARER;
use domain::models::{Role, Session, SessionState, User};
use persistence::entities::SessionRecord;
use persistence::repositories::{SessionRepository, UserRepository};
use persistence::Database;
use shared::crypto::token_fingerprint;
use shared::jwt::{TokenIssuer, TokenKind};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::ApiError;

pub struct SessionStore {
    state: watch::Sender<SessionState>,
    sessions: SessionRepository,
    users: UserRepository,
    tokens: TokenIssuer,
}

impl SessionStore {
    pub fn new(db: &Database, tokens: TokenIssuer) -> Self {
        let (state, _) = watch::channel(SessionState::Unresolved);
        Self {
            state,
            sessions: SessionRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            tokens,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// True until [`hydrate`](Self::hydrate) has run.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().session().map(|s| s.access_token.clone())
    }

    /// Resolves the persisted session.
    ///
    /// The stored user snapshot is not trusted: the identity comes from the
    /// access token's subject and must still be an active user. Anything
    /// that does not check out leaves the store anonymous.
    pub async fn hydrate(&self) -> SessionState {
        let session = match self.sessions.load().await {
            Ok(Some(record)) => self.resolve_record(record).await,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                None
            }
        };

        match session {
            Some(session) => {
                if let Err(e) = self.sessions.save(&record_of(&session)).await {
                    tracing::warn!(error = %e, "Failed to refresh session record");
                }
                tracing::info!(user_id = %session.user.id, "Session restored");
                self.state.send_replace(SessionState::Authenticated(Box::new(session)));
            }
            None => {
                if let Err(e) = self.sessions.clear().await {
                    tracing::warn!(error = %e, "Failed to clear session record");
                }
                self.state.send_replace(SessionState::Anonymous);
            }
        }
        self.state()
    }

    async fn resolve_record(&self, record: SessionRecord) -> Option<Session> {
        let claims = match self.tokens.verify(&record.access_token, TokenKind::Access) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::info!(
                    token = %token_fingerprint(&record.access_token),
                    reason = %e,
                    "Stored session rejected"
                );
                return None;
            }
        };
        let user = self.users.find_by_id(claims.sub).await?;
        if !user.is_active {
            tracing::info!(user_id = %user.id, "Stored session belongs to an inactive user");
            return None;
        }

        let expires_at = claims.expires_at()?;
        Some(Session {
            user,
            access_token: record.access_token,
            refresh_token: record.refresh_token,
            token_type: BEARER.to_string(),
            expires_in: (expires_at - Utc::now()).num_seconds().max(0),
            expires_at,
        })
    }

    /// Issues a fresh token pair for `user`.
    pub(crate) fn issue(&self, user: User) -> Result<Session, ApiError> {
        let pair = self.tokens.issue_pair(user.id)?;

        Ok(Session {
            user,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: BEARER.to_string(),
            expires_in: self.tokens.access_ttl().num_seconds(),
            expires_at: pair.access_expires_at,
        })
    }

    /// Persists `session` and makes it current.
    pub(crate) async fn establish(&self, session: Session) -> Result<(), ApiError> {
        self.sessions.save(&record_of(&session)).await?;
        tracing::info!(
            user_id = %session.user.id,
            token = %token_fingerprint(&session.access_token),
            "Session established"
        );
        self.state.send_replace(SessionState::Authenticated(Box::new(session)));
        Ok(())
    }

    /// Drops the session. The store is anonymous afterwards even if the
    /// record could not be removed.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let previous = self.state.send_replace(SessionState::Anonymous);
        if let Some(user) = previous.user() {
            tracing::info!(user_id = %user.id, "Logged out");
        }
        self.sessions.clear().await?;
        Ok(())
    }

    async fn expire(&self, user_id: Uuid) {
        tracing::info!(user_id = %user_id, "Session expired");
        self.state.send_replace(SessionState::Anonymous);
        if let Err(e) = self.sessions.clear().await {
            tracing::warn!(error = %e, "Failed to clear expired session record");
        }
    }

    /// Replaces the identity snapshot after a mutation that affects it.
    ///
    /// Ignored unless a session for the same user is active.
    pub async fn refresh_user_data(&self, user: User) -> Result<(), ApiError> {
        let mut updated = None;
        self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(session) if session.user.id == user.id => {
                session.user = user.clone();
                updated = Some(session.as_ref().clone());
                true
            }
            _ => false,
        });

        match updated {
            Some(session) => {
                self.sessions.save(&record_of(&session)).await?;
                Ok(())
            }
            None => {
                tracing::warn!(user_id = %user.id, "Ignoring user refresh outside its session");
                Ok(())
            }
        }
    }

    fn current_user_id(&self) -> Option<Uuid> {
        self.state.borrow().user().map(|u| u.id)
    }

    /// Re-reads the logged-in user after a mutation that may have touched
    /// it. A user that no longer exists ends the session.
    ///
    /// The mutation has already committed, so failures are only logged.
    pub(crate) async fn resync(&self) {
        let Some(id) = self.current_user_id() else {
            return;
        };

        let outcome = match self.users.find_by_id(id).await {
            Some(user) => self.refresh_user_data(user).await,
            None => {
                tracing::info!(user_id = %id, "Logged-in user was removed");
                self.logout().await
            }
        };
        if let Err(e) = outcome {
            tracing::warn!(user_id = %id, error = %e, "Failed to resync session");
        }
    }

    /// [`resync`](Self::resync) when `user_id` is the logged-in user.
    pub(crate) async fn resync_user(&self, user_id: Uuid) {
        if self.current_user_id() == Some(user_id) {
            self.resync().await;
        }
    }

    /// Rotates the token pair using the refresh token.
    ///
    /// On any failure the session ends and `Unauthorized` is returned.
    pub async fn refresh_session(&self) -> Result<Session, ApiError> {
        let Some(current) = self.state.borrow().session().cloned() else {
            return Err(ApiError::Unauthorized("No active session".to_string()));
        };

        let user = match self.tokens.verify(&current.refresh_token, TokenKind::Refresh) {
            Ok(claims) => self.users.find_by_id(claims.sub).await.filter(|u| u.is_active),
            Err(e) => {
                tracing::info!(reason = %e, "Refresh token rejected");
                None
            }
        };

        let Some(user) = user else {
            self.expire(current.user.id).await;
            return Err(ApiError::Unauthorized("Session expired".to_string()));
        };

        let session = self.issue(user)?;
        self.establish(session.clone()).await?;
        Ok(session)
    }

    /// The current user, if the session is still valid at `now`.
    pub async fn current_identity_at(&self, now: DateTime<Utc>) -> Option<User> {
        let session = self.state.borrow().session().cloned()?;
        if session.is_expired_at(now) {
            self.expire(session.user.id).await;
            return None;
        }
        Some(session.user)
    }

    pub async fn current_identity(&self) -> Option<User> {
        self.current_identity_at(Utc::now()).await
    }

    /// Gate for role-restricted views. An empty `roles` admits any
    /// authenticated user.
    pub async fn require_role(&self, roles: &[Role]) -> Result<User, ApiError> {
        let user = self
            .current_identity()
            .await
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        if roles.is_empty() || roles.iter().any(|r| user.has_role(*r)) {
            Ok(user)
        } else {
            tracing::debug!(user_id = %user.id, role = %user.role, "Role check failed");
            Err(ApiError::Forbidden(format!(
                "Requires role: {}",
                roles
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(" or ")
            )))
        }
    }
}

fn record_of(session: &Session) -> SessionRecord {
    SessionRecord {
        access_token: session.access_token.clone(),
        refresh_token: session.refresh_token.clone(),
        user: session.user.clone(),
        expires_at: session.expires_at,
        saved_at: Utc::now(),
    }
}

#[cfg(test)]
impl SessionStore {
    /// A store with a fixed test secret, for services under unit test.
    pub(crate) fn for_tests(db: &Database) -> Self {
        let secret = "test_secret_key_for_session_tokens_0123456789";
        let tokens = TokenIssuer::new(secret, 3600, 604800, 0).expect("valid test secret");
        Self::new(db, tokens)
    }
}
