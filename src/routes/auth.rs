// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account authentication routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::{AuthResponse, LoginRequest, RegisterRequest};
use crate::AppState;

/// Routes reachable without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes that need a session. Auth middleware is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub user_id: String,
    pub status: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    let response = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.auth.login(req).await?))
}

/// Sessions are stateless, so logout only tells the client to drop its token.
async fn logout(user: AuthUser) -> Json<MessageResponse> {
    tracing::info!(user_id = %user.user_id(), "User logged out");
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

async fn me(user: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user_id: user.user_id().to_string(),
        status: "authenticated".to_string(),
    })
}
