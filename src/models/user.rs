// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User document stored under `user:<email>`.
///
/// Carries the password hash, so it is never returned to clients directly;
/// responses go through [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier (UUID v4), also the session token subject
    pub id: String,
    /// Normalized (trimmed, lower-cased) email; the lookup key
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub full_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Canonical form of an email used as a store key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
