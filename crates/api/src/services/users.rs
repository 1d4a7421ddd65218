//! User profiles and administration.

use std::sync::Arc;

use domain::models::{UpdateUserRequest, User};
use persistence::entities::UserRecord;
use persistence::repositories::UserRepository;
use persistence::Database;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::services::network::{Latency, Network};
use crate::services::session::SessionStore;

fn apply_profile(request: UpdateUserRequest, record: &mut UserRecord) {
    if let Some(email) = request.email {
        record.email = email;
    }
    if let Some(first_name) = request.first_name {
        record.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = request.last_name {
        record.last_name = last_name.trim().to_string();
    }
    if let Some(company) = request.company {
        record.company = Some(company);
    }
    if let Some(position) = request.position {
        record.position = Some(position);
    }
    if let Some(avatar_url) = request.avatar_url {
        record.avatar_url = Some(avatar_url);
    }
    if let Some(banner_url) = request.banner_url {
        record.banner_url = Some(banner_url);
    }
    if let Some(bio) = request.bio {
        record.bio = Some(bio);
    }
    if let Some(city) = request.city {
        record.city = Some(city);
    }
    if let Some(social_links) = request.social_links {
        record.social_links = social_links;
    }
}

pub struct UserService {
    users: UserRepository,
    session: Arc<SessionStore>,
    network: Network,
}

impl UserService {
    pub fn new(db: &Database, session: Arc<SessionStore>, network: Network) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            session,
            network,
        }
    }

    pub async fn get_me(&self, id: Uuid) -> Result<User, ApiError> {
        self.network
            .call("get_me", Latency::Half, self.find(id))
            .await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ApiError> {
        self.network
            .call("get_user", Latency::Eighths(5), self.find(id))
            .await
    }

    async fn find(&self, id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(id)
            .await
            .ok_or_else(|| ApiError::not_found("User"))
    }

    /// Updates profile fields. When `id` is the logged-in user the session
    /// snapshot follows.
    pub async fn update_user(&self, id: Uuid, request: UpdateUserRequest) -> Result<User, ApiError> {
        let user = self
            .network
            .call("update_user", Latency::Eighths(5), async {
                request.validate()?;
                self.users
                    .update::<_, ApiError>(id, |record| {
                        apply_profile(request, record);
                        Ok(())
                    })
                    .await?
                    .ok_or_else(|| ApiError::not_found("User"))
            })
            .await?;

        self.session.resync_user(id).await;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.network
            .call("list_users", Latency::Half, async { Ok(self.users.list().await) })
            .await
    }

    /// Removes the account. Organizations it owned stay, without an owner.
    /// Deleting the logged-in user ends the session.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ApiError> {
        self.network
            .call("delete_user", Latency::Half, async {
                if self.users.delete(id).await? {
                    tracing::info!(user_id = %id, "User deleted");
                    Ok(())
                } else {
                    Err(ApiError::not_found("User"))
                }
            })
            .await?;

        self.session.resync_user(id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::Fixture;

    const ORGANIZER_ID: &str = "a1b2c3d4-0002-0002-0002-000000000002";

    async fn service() -> UserService {
        let db = Database::open_in_memory(Some(&Fixture::bundled().unwrap()))
            .await
            .unwrap();
        let session = Arc::new(SessionStore::for_tests(&db));
        UserService::new(&db, session, Network::instant())
    }

    #[tokio::test]
    async fn test_update_profile_fields() {
        let service = service().await;
        let id: Uuid = ORGANIZER_ID.parse().unwrap();
        let user = service
            .update_user(
                id,
                UpdateUserRequest {
                    first_name: Some("  Marta ".to_string()),
                    city: Some("Valencia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.first_name, "Marta");
        assert!(user.full_name.starts_with("Marta "));
        assert_eq!(user.city.as_deref(), Some("Valencia"));
    }

    #[tokio::test]
    async fn test_update_email_taken() {
        let service = service().await;
        let result = service
            .update_user(
                ORGANIZER_ID.parse().unwrap(),
                UpdateUserRequest {
                    email: Some("Admin@cybesphere.local".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::EmailAlreadyRegistered)));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let service = service().await;
        let id: Uuid = ORGANIZER_ID.parse().unwrap();
        service.delete_user(id).await.unwrap();
        assert!(matches!(service.get_user(id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.delete_user(id).await, Err(ApiError::NotFound(_))));
    }
}
