//! services/api/src/web/middleware.rs
//!
//! Owner resolution middleware for the data routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use habit_tracker_core::domain::Owner;
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;

/// Extracts the auth session id from the request's cookie header.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .map(|s| s.to_string())
}

/// Middleware that resolves the request's [`Owner`].
///
/// A valid auth session cookie wins; otherwise an `x-device-id` header
/// identifies an anonymous device. Requests presenting neither are rejected
/// with 401 Unauthorized. The resolved owner is inserted into the request
/// extensions for handlers to use.
pub async fn resolve_owner(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let owner = if let Some(session_id) = session_cookie(req.headers()) {
        let user_id = state
            .store
            .validate_auth_session(&session_id)
            .await
            .map_err(|e| {
                error!("Failed to validate auth session: {:?}", e);
                StatusCode::UNAUTHORIZED
            })?;
        Owner::User(user_id)
    } else if let Some(device_id) = req
        .headers()
        .get("x-device-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        Owner::Device(device_id.to_string())
    } else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    req.extensions_mut().insert(owner);
    Ok(next.run(req).await)
}
