//! # Authentication Module
//!
//! Two separate concerns:
//!
//! - **Gateway key**: if `api_key` is configured, every request except
//!   `/health` must carry `Authorization: Bearer <key>`. This authenticates
//!   the upstream gateway, not the end user.
//! - **Acting user**: the gateway names the end user in `X-Cohort-User`.
//!   The role is never taken from the request; it is resolved from the
//!   stored profile for each call.

use super::{ApiError, AppState};
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode, header, request::Parts},
    middleware::Next,
    response::Response,
};
use cohort_core::{Actor, CohortError, UserId};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the acting user's id.
pub const USER_HEADER: &str = "x-cohort-user";

// =============================================================================
// GATEWAY KEY
// =============================================================================

/// Constant-time key comparison over equal-length buffers.
pub fn key_matches(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    // Pad to the same length so ct_eq always runs over the same byte count.
    let len = provided.len().max(expected.len());
    let mut a = vec![0u8; len];
    let mut b = vec![0u8; len];
    a[..provided.len()].copy_from_slice(provided);
    b[..expected.len()].copy_from_slice(expected);

    let bytes_match: bool = a.ct_eq(&b).into();
    bytes_match && provided.len() == expected.len()
}

/// API key authentication middleware.
///
/// `/health` is always allowed (for load balancer checks). Both
/// `Bearer <key>` and a raw `<key>` are accepted.
pub async fn api_key_auth_middleware(
    State(expected): State<Arc<str>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => {
            let provided = value.strip_prefix("Bearer ").unwrap_or(value);
            if key_matches(provided, &expected) {
                Ok(next.run(request).await)
            } else {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "invalid_api_key",
                    "Authentication failed: invalid API key"
                );
                Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
            }
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// ACTING USER
// =============================================================================

/// Parse the raw `X-Cohort-User` value.
pub fn parse_user_header(value: &str) -> Result<UserId, CohortError> {
    value
        .trim()
        .parse::<u64>()
        .map(UserId)
        .map_err(|_| CohortError::InvalidInput(format!("Invalid {} header", USER_HEADER)))
}

/// The acting user with the role resolved from the store.
///
/// A missing or malformed header is rejected with 400. An id without a
/// profile resolves to an actor with no role, which every gate denies.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub Actor);

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError(CohortError::InvalidInput(format!(
                    "Missing {} header",
                    USER_HEADER
                )))
            })?;
        let user = parse_user_header(raw)?;
        let actor = state.service.actor(user)?;
        if actor.role.is_none() {
            tracing::debug!(user = user.0, "acting user has no resolvable role");
        }
        Ok(ActingUser(actor))
    }
}

// =============================================================================
// TESTS
// =============================================================================
