use std::sync::Arc;

use crate::auth::{SigningSecret, TokenIssuer, TokenVerifier};
use crate::curriculo::CurriculoStore;
use crate::identity::IdentityProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable identity provider. Default: Firebase over the Identity Toolkit API.
    pub identity: Arc<dyn IdentityProvider>,
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
    /// Pluggable résumé store. Default: PostgreSQL.
    pub curriculos: Arc<dyn CurriculoStore>,
}

impl AppState {
    /// Issuer and verifier are both built from the same secret.
    pub fn new(
        secret: &SigningSecret,
        identity: Arc<dyn IdentityProvider>,
        curriculos: Arc<dyn CurriculoStore>,
    ) -> Self {
        Self {
            identity,
            issuer: Arc::new(TokenIssuer::new(secret)),
            verifier: Arc::new(TokenVerifier::new(secret)),
            curriculos,
        }
    }
}
