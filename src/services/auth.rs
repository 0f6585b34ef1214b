// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login workflows.
//!
//! Unknown email and wrong password produce the same [`AppError::InvalidCredentials`]
//! so responses never reveal which emails are registered. Emails are never logged.

use crate::config::Config;
use crate::db::RecordStore;
use crate::error::AppError;
use crate::models::{normalize_email, User, UserProfile};
use crate::services::password::{PasswordError, PasswordHasher};
use crate::services::token::TokenService;
use crate::time_utils::SharedClock;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 3, message = "must be at least 3 characters"))]
    pub full_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Body returned by register and login.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: UserProfile,
}

fn internal(err: impl Into<anyhow::Error>) -> AppError {
    AppError::Internal(err.into())
}

#[derive(Clone)]
pub struct AuthService {
    store: RecordStore,
    hasher: PasswordHasher,
    /// Verified against when the email is unknown, so both login failures cost one Argon2 run.
    dummy_digest: String,
    tokens: TokenService,
    clock: SharedClock,
}

const DUMMY_PASSWORD: &str = "no-such-account-placeholder";

impl AuthService {
    pub fn new(
        config: &Config,
        store: RecordStore,
        tokens: TokenService,
        clock: SharedClock,
    ) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::new(config)?;
        let dummy_digest = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            dummy_digest,
            tokens,
            clock,
        })
    }

    /// Create an account and sign the new user in.
    pub async fn register(&self, mut req: RegisterRequest) -> Result<AuthResponse, AppError> {
        req.email = normalize_email(&req.email);
        req.full_name = req.full_name.trim().to_string();
        req.validate()?;

        // Cheap early exit; create_user below is the real guard.
        if self.store.user_exists(&req.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash_blocking(req.password).await?;
        let now = self.clock.now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: req.email,
            password_hash,
            full_name: req.full_name,
            active: true,
            created_at: now,
            updated_at: now,
        };

        if !self.store.create_user(&user).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let issued = self.tokens.issue(&user.id).map_err(internal)?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(AuthResponse {
            token: issued.token,
            expires_in: issued.expires_in,
            user: UserProfile::from(&user),
        })
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, mut req: LoginRequest) -> Result<AuthResponse, AppError> {
        req.email = normalize_email(&req.email);
        req.validate()?;

        let user = self.store.get_user(&req.email).await?;
        let digest = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_digest.clone(),
        };
        let matches = self.hasher.verify_blocking(digest, req.password).await?;

        let user = match user {
            Some(user) if matches => user,
            Some(user) => {
                tracing::info!(user_id = %user.id, "Login failed");
                return Err(AppError::InvalidCredentials);
            }
            None => {
                tracing::info!("Login failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !user.active {
            tracing::warn!(user_id = %user.id, "Login refused for inactive account");
            return Err(AppError::Forbidden("Account is inactive".to_string()));
        }

        let issued = self.tokens.issue(&user.id).map_err(internal)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            token: issued.token,
            expires_in: issued.expires_in,
            user: UserProfile::from(&user),
        })
    }
}
