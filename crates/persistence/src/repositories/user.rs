//! User repository.
//!
//! Users reference their organization by id; every read resolves it so the
//! returned [`User`] always reflects the current organization profile.

use chrono::Utc;
use domain::models::organization::UNKNOWN_CITY;
use domain::models::user::normalize_email;
use domain::models::{Organization, Role, SocialLinks, User};
use uuid::Uuid;

use crate::db::Database;
use crate::entities::{OrganizationRecord, UserRecord};
use crate::error::{EmailTaken, StoreError};
use crate::metrics::OperationTimer;
use crate::repositories::organization::organization_slug;

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Organization registered together with its owner.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub website: Option<String>,
}

/// What `login` needs to decide.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkOutcome {
    Added,
    Removed,
    UnknownUser,
    UnknownEvent,
}

/// Repository for the users collection.
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

fn resolve(record: &UserRecord, organizations: &[OrganizationRecord]) -> User {
    let organization = record.organization_id.and_then(|org_id| {
        organizations
            .iter()
            .find(|org| org.id == org_id)
            .map(Organization::from)
    });
    record.to_domain(organization)
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        let users = self.db.users().read().await;
        let organizations = self.db.organizations().read().await;
        users
            .iter()
            .find(|u| u.id == id)
            .map(|u| resolve(u, &organizations))
    }

    /// Case-insensitive lookup.
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        let users = self.db.users().read().await;
        let organizations = self.db.organizations().read().await;
        users
            .iter()
            .find(|u| u.email == email)
            .map(|u| resolve(u, &organizations))
    }

    pub async fn find_credentials(&self, email: &str) -> Option<UserCredentials> {
        let email = normalize_email(email);
        let users = self.db.users().read().await;
        let organizations = self.db.organizations().read().await;
        users.iter().find(|u| u.email == email).map(|u| UserCredentials {
            user: resolve(u, &organizations),
            password_hash: u.password_hash.clone(),
        })
    }

    pub async fn email_exists(&self, email: &str) -> bool {
        let email = normalize_email(email);
        let users = self.db.users().read().await;
        users.iter().any(|u| u.email == email)
    }

    /// All users, oldest first.
    pub async fn list(&self) -> Vec<User> {
        let users = self.db.users().read().await;
        let organizations = self.db.organizations().read().await;
        let mut list: Vec<User> = users.iter().map(|u| resolve(u, &organizations)).collect();
        list.sort_by_key(|u| u.created_at);
        list
    }

    /// Ids of active administrators.
    pub async fn admin_ids(&self) -> Vec<Uuid> {
        let users = self.db.users().read().await;
        users
            .iter()
            .filter(|u| u.role == Role::Admin && u.is_active)
            .map(|u| u.id)
            .collect()
    }

    /// Creates a user and, optionally, the organization it owns.
    ///
    /// The email check happens under the users write lock, so two concurrent
    /// registrations of the same address cannot both succeed.
    pub async fn create<E>(
        &self,
        new_user: NewUser,
        new_organization: Option<NewOrganization>,
    ) -> Result<(User, Option<Organization>), E>
    where
        E: From<StoreError> + From<EmailTaken>,
    {
        let timer = OperationTimer::new("users.create");
        let email = normalize_email(&new_user.email);

        let mut users = self.db.stage_users().await;
        let mut organizations = self.db.stage_organizations().await;

        if users.rows().iter().any(|u| u.email == email) {
            return Err(EmailTaken.into());
        }

        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let organization = new_organization.map(|new_org| {
            let name = new_org.name.trim().to_string();
            OrganizationRecord {
                id: Uuid::new_v4(),
                slug: organization_slug(&name, organizations.rows(), None),
                previous_slugs: Vec::new(),
                name,
                logo_url: String::new(),
                is_verified: false,
                city: UNKNOWN_CITY.to_string(),
                description: None,
                banner_url: None,
                website: new_org.website,
                email: Some(email.clone()),
                social_links: SocialLinks::default(),
                owner_id: Some(user_id),
                created_at: now,
                updated_at: now,
            }
        });

        let record = UserRecord {
            id: user_id,
            email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            role: new_user.role,
            is_active: true,
            is_verified: false,
            company: None,
            position: None,
            avatar_url: None,
            banner_url: None,
            bio: None,
            city: None,
            social_links: SocialLinks::default(),
            organization_id: organization.as_ref().map(|org| org.id),
            favorite_event_ids: Vec::new(),
            bookmarked_event_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let organization = organization.map(|org| {
            let domain = Organization::from(&org);
            organizations.rows_mut().push(org);
            domain
        });
        let user = record.to_domain(organization.clone());
        users.rows_mut().push(record);

        let writes: Vec<_> = [users.pending()?, organizations.pending()?]
            .into_iter()
            .flatten()
            .collect();
        self.db.persist(writes).await?;
        users.swap();
        organizations.swap();
        timer.record();

        tracing::info!(
            user_id = %user.id,
            role = %user.role,
            organization_id = ?organization.as_ref().map(|o| o.id),
            "User created"
        );
        Ok((user, organization))
    }

    /// Applies `f` to the stored record of `id`.
    ///
    /// The email is normalized afterwards and must stay unique. Returns
    /// `Ok(None)` when the user does not exist.
    pub async fn update<F, E>(&self, id: Uuid, f: F) -> Result<Option<User>, E>
    where
        F: FnOnce(&mut UserRecord) -> Result<(), E>,
        E: From<StoreError> + From<EmailTaken>,
    {
        let timer = OperationTimer::new("users.update");
        let mut users = self.db.stage_users().await;
        let organizations = self.db.organizations().read().await;

        let Some(index) = users.rows().iter().position(|u| u.id == id) else {
            return Ok(None);
        };

        let mut record = users.rows()[index].clone();
        f(&mut record)?;
        record.email = normalize_email(&record.email);
        if users
            .rows()
            .iter()
            .any(|u| u.id != id && u.email == record.email)
        {
            return Err(EmailTaken.into());
        }
        record.updated_at = Utc::now();

        let user = resolve(&record, &organizations);
        users.rows_mut()[index] = record;
        self.db.commit(users).await?;
        timer.record();

        Ok(Some(user))
    }

    /// Adds the event to the user's bookmarks, or removes it if present.
    pub async fn toggle_bookmark(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<BookmarkOutcome, StoreError> {
        let mut users = self.db.stage_users().await;
        let events = self.db.events().read().await;

        let Some(index) = users.rows().iter().position(|u| u.id == user_id) else {
            return Ok(BookmarkOutcome::UnknownUser);
        };
        if !events.iter().any(|e| e.id == event_id) {
            return Ok(BookmarkOutcome::UnknownEvent);
        }

        let record = &mut users.rows_mut()[index];
        let outcome = if record.bookmarked_event_ids.contains(&event_id) {
            record.bookmarked_event_ids.retain(|id| *id != event_id);
            BookmarkOutcome::Removed
        } else {
            record.bookmarked_event_ids.push(event_id);
            BookmarkOutcome::Added
        };
        record.updated_at = Utc::now();

        self.db.commit(users).await?;
        Ok(outcome)
    }

    /// Deletes the user, clears ownership of its organizations and drops its
    /// notifications. Returns whether the user existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let timer = OperationTimer::new("users.delete");
        let mut users = self.db.stage_users().await;
        let mut organizations = self.db.stage_organizations().await;
        let mut notifications = self.db.stage_notifications().await;

        let Some(index) = users.rows().iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        users.rows_mut().remove(index);

        if organizations.rows().iter().any(|org| org.owner_id == Some(id)) {
            for org in organizations
                .rows_mut()
                .iter_mut()
                .filter(|org| org.owner_id == Some(id))
            {
                org.owner_id = None;
                org.updated_at = Utc::now();
            }
        }
        if notifications.rows().iter().any(|n| n.recipient_id == id) {
            notifications.rows_mut().retain(|n| n.recipient_id != id);
        }

        let writes: Vec<_> = [
            users.pending()?,
            organizations.pending()?,
            notifications.pending()?,
        ]
        .into_iter()
        .flatten()
        .collect();
        self.db.persist(writes).await?;
        users.swap();
        organizations.swap();
        notifications.swap();
        timer.record();

        tracing::info!(user_id = %id, "User deleted");
        Ok(true)
    }
}
