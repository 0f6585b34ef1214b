// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Identity resolved from a verified session token.
///
/// Only [`require_auth`] creates one, so a handler taking `AuthUser` cannot
/// run without a verified caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    user_id: String,
}

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;

    let user_id = state
        .tokens
        .verify(token)
        .map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
