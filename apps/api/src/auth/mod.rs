//! Authentication core: token minting, token verification and the
//! middleware that gates protected routes.

pub mod handlers;
pub mod middleware;
pub mod token;

use thiserror::Error;

pub use middleware::{require_auth, AuthContext};
pub use token::{SigningSecret, TokenIssuer, TokenVerifier};

/// Reasons a protected request is rejected. All map to 401 with the same
/// body; the variants exist so logs can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or malformed bearer token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("expired token")]
    ExpiredToken,
}
