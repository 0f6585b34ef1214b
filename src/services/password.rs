// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing and verification using Argon2id.
//!
//! The work factor comes from [`Config`] so it can be raised as hardware gets
//! faster. Digests are PHC strings carrying their own salt and parameters, so
//! raising the work factor never invalidates existing digests.

use crate::config::Config;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version,
};

/// Password hashing errors.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Invalid password hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Password hashing task failed: {0}")]
    Task(String),
}

/// Argon2id hasher configured with the process work factor.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: &Config) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.password_memory_kib,
            config.password_iterations,
            config.password_parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Salted one-way hash of `plaintext` as a PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// True iff `digest` was produced from `plaintext`.
    ///
    /// A malformed digest is a mismatch, not an error. The final comparison
    /// is constant time.
    pub fn verify(&self, digest: &str, plaintext: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(
        &self,
        digest: String,
        plaintext: String,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&digest, &plaintext))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))
    }
}
