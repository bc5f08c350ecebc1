use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::core_types::AccountId;
use crate::gateway::{
    state::AppState,
    types::{ApiError, error_codes},
};

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthAccount(pub AccountId);

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::unauthorized(error_codes::MISSING_AUTH, "Missing Authorization header")
        })?;

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Err(ApiError::unauthorized(
            error_codes::AUTH_FAILED,
            "Invalid token format",
        ));
    };

    // 2. Verify token and resolve the account it names
    let account_id = state
        .auth
        .verify_token(token)
        .and_then(|claims| claims.account_id())
        .map_err(|e| {
            debug!("Token rejected: {}", e);
            ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid or expired token")
        })?;

    // 3. Inject account
    request.extensions_mut().insert(AuthAccount(account_id));
    Ok(next.run(request).await)
}
