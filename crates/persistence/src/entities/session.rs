//! Persisted session record.

use chrono::{DateTime, Utc};
use domain::models::User;
use serde::{Deserialize, Serialize};

/// What survives a restart of the client.
///
/// The user snapshot is informational only: hydration re-resolves the
/// identity from the access token's subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}
