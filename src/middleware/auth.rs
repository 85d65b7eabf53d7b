use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::models::user::Identity;
use crate::routes::ok_failure;
use crate::services::auth_service::SharedAuth;

/// Reads `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the bearer token when one is sent. A rejected token is treated
/// as an anonymous caller.
pub async fn optional_identity(auth: &SharedAuth, headers: &HeaderMap) -> Option<Identity> {
    let token = bearer_token(headers)?;
    match auth.resolve(token).await {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unusable bearer token");
            None
        }
    }
}

/// Middleware for `middleware::from_fn_with_state`.
/// Rejects with 401 before the handler runs, or 500 when the identity
/// backend is unavailable. On success inserts `Arc<Identity>` into the
/// request extensions.
pub async fn auth_middleware(
    State(auth): State<SharedAuth>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers())
        .map(str::to_string)
        .ok_or_else(|| ok_failure(ServiceError::Unauthorized))?;

    match auth.resolve(&token).await {
        Ok(identity) => {
            req.extensions_mut().insert(Arc::new(identity));
            Ok(next.run(req).await)
        }
        Err(e @ ServiceError::StoreUnavailable(_)) => Err(ok_failure(e)),
        Err(e) => {
            tracing::warn!(error = %e, path = %req.uri().path(), "rejected bearer token");
            Err(ok_failure(ServiceError::Unauthorized))
        }
    }
}
