// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Read once at startup and handed to every component by value or reference.
//! Nothing reads the environment after `Config::from_env` returns.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Placeholder signing secret used when `JWT_SECRET` is unset.
pub const INSECURE_DEFAULT_SECRET: &str = "your-secret-key-change-me-in-production";

/// Which key-value backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Deployment environment name (`production`, `development`, ...)
    pub environment: String,

    // --- Sessions ---
    /// HMAC signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Session token lifetime in seconds
    pub token_ttl_secs: u64,

    // --- Key-value store ---
    pub store_backend: StoreBackend,
    /// Connection URL for the Redis backend
    pub store_url: String,
    /// Upper bound on a single store round trip
    pub store_timeout: Duration,

    // --- HTTP surface ---
    pub request_timeout: Duration,
    pub require_https: bool,
    /// Host used when redirecting plain-HTTP requests to HTTPS
    pub redirect_host: String,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,

    // --- Password hashing work factor (Argon2id) ---
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            jwt_signing_key: INSECURE_DEFAULT_SECRET.as_bytes().to_vec(),
            token_ttl_secs: 3600,
            store_backend: StoreBackend::Redis,
            store_url: "redis://127.0.0.1:6379".to_string(),
            store_timeout: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(30),
            require_https: true,
            redirect_host: "localhost:8443".to_string(),
            allowed_origins: vec!["https://localhost:8443".to_string()],
            max_body_bytes: 10 * 1024 * 1024,
            password_memory_kib: 19 * 1024,
            password_iterations: 2,
            password_parallelism: 1,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        let jwt_signing_key = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().as_bytes().to_vec(),
            _ => {
                if environment == "production" {
                    tracing::error!(
                        "JWT_SECRET is not set in production; falling back to the insecure default"
                    );
                } else {
                    tracing::warn!("JWT_SECRET is not set; using the insecure default secret");
                }
                defaults.jwt_signing_key
            }
        };

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.store_backend,
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            environment,
            jwt_signing_key,
            token_ttl_secs: parse_var("JWT_EXPIRATION_SECS", defaults.token_ttl_secs)?,
            store_backend,
            store_url: env::var("REDIS_URL").unwrap_or(defaults.store_url),
            store_timeout: Duration::from_millis(parse_var(
                "STORE_TIMEOUT_MS",
                defaults.store_timeout.as_millis() as u64,
            )?),
            request_timeout: Duration::from_secs(parse_var(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            require_https: parse_var("REQUIRE_HTTPS", defaults.require_https)?,
            redirect_host: env::var("REDIRECT_HOST").unwrap_or(defaults.redirect_host),
            allowed_origins,
            max_body_bytes: parse_var("MAX_REQUEST_BODY_BYTES", defaults.max_body_bytes)?,
            password_memory_kib: parse_var("PASSWORD_MEMORY_KIB", defaults.password_memory_kib)?,
            password_iterations: parse_var("PASSWORD_ITERATIONS", defaults.password_iterations)?,
            password_parallelism: parse_var(
                "PASSWORD_PARALLELISM",
                defaults.password_parallelism,
            )?,
        })
    }

    /// Deterministic config for tests: in-memory store, cheap hashing, no HTTPS redirect.
    pub fn test_default() -> Self {
        Self {
            environment: "test".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            store_backend: StoreBackend::Memory,
            require_https: false,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            password_memory_kib: 1024,
            password_iterations: 1,
            password_parallelism: 1,
            ..Self::default()
        }
    }

    /// True when the signing key is still the built-in placeholder.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_signing_key == INSECURE_DEFAULT_SECRET.as_bytes()
    }
}

/// Read an optional env var, parsing it when present.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
