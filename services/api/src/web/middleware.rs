//! services/api/src/web/middleware.rs
//!
//! Identity middleware for routes that need the authenticated caller.
//!
//! Authentication itself happens upstream of this service; the gateway
//! forwards the validated identity in the `x-user-id` and `x-user-email`
//! headers. This middleware only converts those headers into an `AuthUser`
//! for handlers to consume.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use todo_core::domain::AuthUser;
use uuid::Uuid;

/// Extracts the forwarded caller identity and inserts it into request
/// extensions. Requests without a complete identity are rejected with 401.
pub async fn require_identity(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let email = req
        .headers()
        .get("x-user-email")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    req.extensions_mut().insert(AuthUser { id: user_id, email });

    Ok(next.run(req).await)
}
