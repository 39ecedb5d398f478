use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::auth::verify_token;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Extract and validate JWT from Authorization header.
///
/// No token at all is 401; a token that fails verification is 403. The
/// scheme word is not checked, so "Token abc" is a present-but-invalid token.
/// Verified `Claims` are attached as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(req.headers()).ok_or(AppError::MissingToken)?;
    let claims = verify_token(&state.settings.jwt_secret, token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().split_once(' '))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
}
