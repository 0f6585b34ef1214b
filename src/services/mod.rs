// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod password;
pub mod stats;
pub mod token;

pub use auth::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
pub use password::{PasswordError, PasswordHasher};
pub use stats::{CacheStatus, StatsAggregator, StatsLookup};
pub use token::{InvalidToken, IssuedToken, TokenError, TokenService};
