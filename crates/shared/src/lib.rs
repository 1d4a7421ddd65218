//! Shared utilities and common types for the CibESphere core.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic helpers (fingerprints, random tokens)
//! - Password hashing with Argon2id and the registration password policy
//! - Signed session tokens (JWT)
//! - Slug generation for events and organizations
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod slug;
pub mod validation;
