//! The collection store.
//!
//! A [`Database`] owns the four collections in memory, each behind its own
//! `RwLock`, and mirrors every one of them to a named snapshot record.
//!
//! Mutations are copy-on-write: a repository stages its change on a clone of
//! the collection, the staged snapshot is persisted, and only then is the
//! clone swapped in. A failed persist leaves memory untouched, so callers are
//! never told about a write that storage does not hold.
//!
//! Locks are always taken in the order users → organizations → events →
//! notifications, for reads as well as writes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::entities::{EventRecord, NotificationRecord, OrganizationRecord, UserRecord};
use crate::error::StoreError;
use crate::metrics::record_persist_failure;
use crate::seed::Fixture;
use crate::storage::{MemoryStorage, SnapshotStorage};

/// Names of the snapshot records.
pub mod keys {
    pub const USERS: &str = "cibesphere_users_v1";
    pub const EVENTS: &str = "cibesphere_events_v1";
    pub const ORGANIZATIONS: &str = "cibesphere_organizations_v1";
    pub const NOTIFICATIONS: &str = "cibesphere_notifications_v1";
    pub const SESSION: &str = "cibesphere_session_v1";
}

/// Number of records per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSizes {
    pub users: usize,
    pub organizations: usize,
    pub events: usize,
    pub notifications: usize,
}

/// A staged snapshot waiting to be persisted, with what to put back if a
/// later write in the same batch fails.
#[derive(Debug)]
pub(crate) struct PendingWrite {
    key: &'static str,
    staged: Vec<u8>,
    previous: Vec<u8>,
}

/// A write-locked collection with a private working copy.
///
/// Reading through `rows` is free; `rows_mut` marks the copy dirty. Only
/// dirty copies produce a [`PendingWrite`] and get swapped in.
pub(crate) struct Staged<'a, T> {
    key: &'static str,
    guard: RwLockWriteGuard<'a, Vec<T>>,
    rows: Vec<T>,
    dirty: bool,
}

impl<'a, T: Clone + Serialize> Staged<'a, T> {
    fn new(key: &'static str, guard: RwLockWriteGuard<'a, Vec<T>>) -> Self {
        let rows = guard.clone();
        Self {
            key,
            guard,
            rows,
            dirty: false,
        }
    }

    pub(crate) fn rows(&self) -> &[T] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<T> {
        self.dirty = true;
        &mut self.rows
    }

    pub(crate) fn pending(&self) -> Result<Option<PendingWrite>, StoreError> {
        if !self.dirty {
            return Ok(None);
        }
        Ok(Some(PendingWrite {
            key: self.key,
            staged: serialize(self.key, self.rows.as_slice())?,
            previous: serialize(self.key, self.guard.as_slice())?,
        }))
    }

    /// Makes the staged copy the live collection.
    pub(crate) fn swap(self) {
        let Staged {
            mut guard,
            rows,
            dirty,
            ..
        } = self;
        if dirty {
            *guard = rows;
        }
    }
}

fn serialize<T: Serialize>(key: &str, rows: &[T]) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(rows).map_err(|e| StoreError::serialization(key, e))
}

struct Inner {
    storage: Arc<dyn SnapshotStorage>,
    users: RwLock<Vec<UserRecord>>,
    organizations: RwLock<Vec<OrganizationRecord>>,
    events: RwLock<Vec<EventRecord>>,
    notifications: RwLock<Vec<NotificationRecord>>,
}

/// Shared handle to the collection store. Cloning is cheap.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

enum Loaded<T> {
    Stored(Vec<T>),
    /// Missing or unreadable; needs seeding.
    Absent,
}

async fn load_collection<T: DeserializeOwned>(
    storage: &dyn SnapshotStorage,
    key: &'static str,
) -> Result<Loaded<T>, StoreError> {
    let Some(bytes) = storage.load(key).await? else {
        tracing::info!(key, "Record missing");
        return Ok(Loaded::Absent);
    };
    match serde_json::from_slice(&bytes) {
        Ok(rows) => Ok(Loaded::Stored(rows)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Record is corrupt, discarding it");
            Ok(Loaded::Absent)
        }
    }
}

impl Database {
    /// Loads every collection from `storage`.
    ///
    /// Records that are missing or corrupt are replaced with the matching part
    /// of `seed` (or left empty without one) and written back immediately.
    /// A seed with malformed slugs or dangling references is refused.
    pub async fn open(
        storage: Arc<dyn SnapshotStorage>,
        seed: Option<&Fixture>,
    ) -> Result<Self, StoreError> {
        if let Some(fixture) = seed {
            fixture.check()?;
        }
        let users = match load_collection::<UserRecord>(storage.as_ref(), keys::USERS).await? {
            Loaded::Stored(rows) => rows,
            Loaded::Absent => {
                let rows = match seed {
                    Some(fixture) => fixture.user_records()?,
                    None => Vec::new(),
                };
                storage.save(keys::USERS, &serialize(keys::USERS, rows.as_slice())?).await?;
                rows
            }
        };
        let organizations = seed_or_load(
            storage.as_ref(),
            keys::ORGANIZATIONS,
            seed.map(|f| f.organizations.clone()),
        )
        .await?;
        let events =
            seed_or_load(storage.as_ref(), keys::EVENTS, seed.map(|f| f.events.clone())).await?;
        let notifications = seed_or_load(storage.as_ref(), keys::NOTIFICATIONS, None).await?;

        tracing::info!(
            users = users.len(),
            organizations = organizations.len(),
            events = events.len(),
            notifications = notifications.len(),
            "Collections loaded"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                storage,
                users: RwLock::new(users),
                organizations: RwLock::new(organizations),
                events: RwLock::new(events),
                notifications: RwLock::new(notifications),
            }),
        })
    }

    /// A database over fresh [`MemoryStorage`].
    pub async fn open_in_memory(seed: Option<&Fixture>) -> Result<Self, StoreError> {
        Self::open(Arc::new(MemoryStorage::new()), seed).await
    }

    pub fn storage(&self) -> &Arc<dyn SnapshotStorage> {
        &self.inner.storage
    }

    pub async fn sizes(&self) -> CollectionSizes {
        CollectionSizes {
            users: self.inner.users.read().await.len(),
            organizations: self.inner.organizations.read().await.len(),
            events: self.inner.events.read().await.len(),
            notifications: self.inner.notifications.read().await.len(),
        }
    }

    pub(crate) fn users(&self) -> &RwLock<Vec<UserRecord>> {
        &self.inner.users
    }

    pub(crate) fn organizations(&self) -> &RwLock<Vec<OrganizationRecord>> {
        &self.inner.organizations
    }

    pub(crate) fn events(&self) -> &RwLock<Vec<EventRecord>> {
        &self.inner.events
    }

    pub(crate) fn notifications(&self) -> &RwLock<Vec<NotificationRecord>> {
        &self.inner.notifications
    }

    pub(crate) async fn stage_users(&self) -> Staged<'_, UserRecord> {
        Staged::new(keys::USERS, self.inner.users.write().await)
    }

    pub(crate) async fn stage_organizations(&self) -> Staged<'_, OrganizationRecord> {
        Staged::new(keys::ORGANIZATIONS, self.inner.organizations.write().await)
    }

    pub(crate) async fn stage_events(&self) -> Staged<'_, EventRecord> {
        Staged::new(keys::EVENTS, self.inner.events.write().await)
    }

    pub(crate) async fn stage_notifications(&self) -> Staged<'_, NotificationRecord> {
        Staged::new(keys::NOTIFICATIONS, self.inner.notifications.write().await)
    }

    /// Persists a batch of staged snapshots in order.
    ///
    /// If a write fails, records already written in this batch are restored
    /// to their previous snapshot (best effort) and the error is returned.
    pub(crate) async fn persist(&self, writes: Vec<PendingWrite>) -> Result<(), StoreError> {
        let storage = self.inner.storage.as_ref();

        for (index, write) in writes.iter().enumerate() {
            if let Err(e) = storage.save(write.key, &write.staged).await {
                record_persist_failure(write.key);
                tracing::error!(key = write.key, error = %e, "Failed to persist record");

                for done in writes[..index].iter().rev() {
                    if let Err(restore_err) = storage.save(done.key, &done.previous).await {
                        tracing::error!(
                            key = done.key,
                            error = %restore_err,
                            "Failed to restore record after aborted batch"
                        );
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Persists one staged collection and swaps it in.
    pub(crate) async fn commit<T: Clone + Serialize>(
        &self,
        staged: Staged<'_, T>,
    ) -> Result<(), StoreError> {
        if let Some(write) = staged.pending()? {
            self.persist(vec![write]).await?;
        }
        staged.swap();
        Ok(())
    }
}

async fn seed_or_load<T: DeserializeOwned + Serialize>(
    storage: &dyn SnapshotStorage,
    key: &'static str,
    seed: Option<Vec<T>>,
) -> Result<Vec<T>, StoreError> {
    match load_collection(storage, key).await? {
        Loaded::Stored(rows) => Ok(rows),
        Loaded::Absent => {
            let rows = seed.unwrap_or_default();
            storage.save(key, &serialize(key, rows.as_slice())?).await?;
            Ok(rows)
        }
    }
}
