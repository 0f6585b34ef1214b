// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Vitals tracker: authenticated storage of personal health measurements.
//!
//! This crate provides the backend API for account registration and login,
//! per-user health records, and cached per-type statistics over a
//! TTL-capable key-value store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{KvStore, RecordStore};
use services::{AuthService, PasswordError, StatsAggregator, TokenService};
use std::sync::Arc;
use time_utils::SharedClock;

/// Shared application state.
///
/// Built once at startup; every component receives its configuration here.
pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub stats: StatsAggregator,
    pub clock: SharedClock,
}

impl AppState {
    pub fn new(
        config: Config,
        kv: Arc<dyn KvStore>,
        clock: SharedClock,
    ) -> Result<Self, PasswordError> {
        let store = RecordStore::new(kv);
        let tokens = TokenService::new(&config, clock.clone());
        let auth = AuthService::new(&config, store.clone(), tokens.clone(), clock.clone())?;
        let stats = StatsAggregator::new(store.clone());

        Ok(Self {
            config,
            store,
            tokens,
            auth,
            stats,
            clock,
        })
    }
}
