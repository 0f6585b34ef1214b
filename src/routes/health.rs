// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health record routes (all require a session).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderName, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{HealthRecord, HealthStats, RecordType, UnknownRecordType};
use crate::routes::auth::MessageResponse;
use crate::time_utils::parse_rfc3339;
use crate::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;

const X_TOTAL_COUNT: &str = "x-total-count";
const X_CACHE: &str = "x-cache";

/// Health routes. Auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/health",
            get(list_records).post(create_record).delete(delete_record),
        )
        .route("/health/stats", get(get_stats))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecordRequest {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[validate(range(min = 0.0, max = 500.0, message = "must be between 0 and 500"))]
    pub value: f64,
    #[validate(length(min = 1, message = "is required"))]
    pub unit: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub notes: Option<String>,
    /// RFC 3339; anything unparseable falls back to the creation time
    pub recorded_at: Option<String>,
}

async fn create_record(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HealthRecord>)> {
    let Json(mut req) = payload?;
    req.unit = req.unit.trim().to_string();
    req.validate()?;

    let now = state.clock.now();
    let recorded_at = match req.recorded_at.as_deref() {
        None => now,
        Some(raw) => parse_rfc3339(raw).unwrap_or_else(|| {
            tracing::debug!(user_id = %user.user_id(), "Unparseable recorded_at, using now");
            now
        }),
    };

    let record = HealthRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.user_id().to_string(),
        record_type: req.record_type,
        value: req.value,
        unit: req.unit,
        notes: req.notes.filter(|n| !n.trim().is_empty()),
        recorded_at,
        created_at: now,
    };

    state.store.insert_record(&record).await?;

    tracing::info!(
        user_id = %record.user_id,
        record_id = %record.id,
        record_type = %record.record_type,
        "Health record created"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

// ─── List ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Newest-first page of the caller's records (at most 100).
async fn list_records(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<([(HeaderName, HeaderValue); 1], Json<Vec<HealthRecord>>)> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE) as usize;
    let offset = query.offset.unwrap_or(0) as usize;

    let ids = state
        .store
        .range_index(user.user_id(), offset, limit)
        .await?;
    let records = state.store.get_records(user.user_id(), &ids).await?;

    Ok((
        [(HeaderName::from_static(X_TOTAL_COUNT), HeaderValue::from(records.len()))],
        Json(records),
    ))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatsQuery {
    #[serde(rename = "type")]
    record_type: Option<String>,
}

async fn get_stats(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<StatsQuery>, QueryRejection>,
) -> Result<([(HeaderName, HeaderValue); 1], Json<HealthStats>)> {
    let Query(query) = query?;
    let raw = query
        .record_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'type' parameter".to_string()))?;
    let record_type: RecordType = raw
        .parse()
        .map_err(|e: UnknownRecordType| AppError::Validation(e.to_string()))?;

    let lookup = state.stats.get_stats(user.user_id(), record_type).await?;

    Ok((
        [(HeaderName::from_static(X_CACHE), HeaderValue::from_static(lookup.cache.as_str()))],
        Json(lookup.stats),
    ))
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    id: Option<String>,
}

/// Delete one of the caller's records. Deleting an unknown id succeeds.
async fn delete_record(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>> {
    let Query(query) = query?;
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'id' parameter".to_string()))?;
    // Record ids are UUIDs; anything else could alias the index or stats keys.
    let id = uuid::Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation("Invalid 'id' parameter".to_string()))?
        .to_string();

    let removed = state.store.remove_record(user.user_id(), &id).await?;

    tracing::info!(
        user_id = %user.user_id(),
        record_id = %id,
        existed = removed.is_some(),
        "Health record deleted"
    );

    Ok(Json(MessageResponse {
        message: "Record deleted successfully".to_string(),
    }))
}
