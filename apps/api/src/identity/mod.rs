//! Identity Provider Client — account creation and lookup are delegated to
//! an external managed identity service. No account data is stored locally.

pub mod firebase;
#[cfg(test)]
pub mod memory;
pub mod service_account;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque, provider-assigned account identifier.
pub type AccountId = String;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider refused the request (malformed email, duplicate account,
    /// weak password, ...). Holds the provider's message for the logs.
    #[error("request rejected by identity provider: {0}")]
    Rejected(String),

    #[error("account not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("password verification is not configured for this provider")]
    Unsupported,

    #[error("service credentials error: {0}")]
    Credentials(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Unavailable(e.to_string())
    }
}

/// How `/login` establishes that the caller owns the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// The password is checked by the provider.
    VerifyPassword,
    /// Only the account's existence is checked; the password is ignored.
    LookupOnly,
}

/// Identity provider contract. Carried in `AppState` as
/// `Arc<dyn IdentityProvider>`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str)
        -> Result<AccountId, ProviderError>;

    async fn lookup_account_by_email(&self, email: &str) -> Result<AccountId, ProviderError>;

    /// Returns the account id when `password` is correct for `email`.
    async fn verify_password(&self, email: &str, password: &str)
        -> Result<AccountId, ProviderError>;

    fn login_mode(&self) -> LoginMode;
}

/// Resolves the account id for a login attempt according to the provider's
/// login mode.
pub async fn authenticate(
    provider: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<AccountId, ProviderError> {
    match provider.login_mode() {
        LoginMode::VerifyPassword => provider.verify_password(email, password).await,
        LoginMode::LookupOnly => provider.lookup_account_by_email(email).await,
    }
}
