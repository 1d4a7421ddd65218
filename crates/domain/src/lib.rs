//! Domain layer for CibESphere.
//!
//! This crate contains:
//! - Domain models (User, Organization, Event, Notification, Session)
//! - The event catalog filter and its query-string parser
//! - Pure domain services (notification generation, dashboard aggregation)

pub mod models;
pub mod services;
