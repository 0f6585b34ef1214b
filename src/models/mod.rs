// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod health;
pub mod stats;
pub mod user;

pub use health::{HealthRecord, RecordType, UnknownRecordType};
pub use stats::HealthStats;
pub use user::{normalize_email, User, UserProfile};
