use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::AuthError;
use crate::errors::AppError;
use crate::state::AppState;

/// Identity attached to a request once its token has been verified.
/// Lives in request extensions for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub uid: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Middleware for protected routes. Verification is synchronous; on
/// failure the request never reaches the inner handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let verified = bearer_token(req.headers().get(AUTHORIZATION))
        .and_then(|token| state.verifier.verify(token));

    let claims = match verified {
        Ok(claims) => claims,
        Err(e) => {
            warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "Rejected request: {e}"
            );
            return Err(AppError::Unauthorized(e));
        }
    };

    req.extensions_mut().insert(AuthContext { uid: claims.sub });
    Ok(next.run(req).await)
}
