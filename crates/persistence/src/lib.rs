//! Persistence layer for CibESphere.
//!
//! This crate contains:
//! - Snapshot storage backends (file and memory)
//! - The collection store with copy-on-write commits
//! - Entity definitions (stored record shapes)
//! - Repository implementations
//! - Seed fixtures and store metrics

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod seed;
pub mod storage;

pub use db::{keys, CollectionSizes, Database};
pub use error::{EmailTaken, StoreError};
pub use seed::Fixture;
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
