//! Google service-account credentials and the OAuth2 access tokens minted
//! from them for Identity Toolkit admin calls.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::ProviderError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str = "https://www.googleapis.com/auth/identitytoolkit \
                      https://www.googleapis.com/auth/userinfo.email";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Cached access tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// The subset of a service-account key file this service needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    pub project_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
        let account = Self::from_json(&raw)
            .with_context(|| format!("Invalid credentials file {}", path.display()))?;
        info!(
            "Loaded service account {} for project {}",
            account.client_email, account.project_id
        );
        Ok(account)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let account: ServiceAccount = serde_json::from_str(raw)?;
        if account.account_type != "service_account" {
            bail!(
                "expected credentials of type 'service_account', found '{}'",
                account.account_type
            );
        }
        Ok(account)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Exchanges a signed service-account assertion for an access token and
/// caches it until shortly before expiry.
pub struct AccessTokenSource {
    client: Client,
    account: ServiceAccount,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl AccessTokenSource {
    pub fn new(client: Client, account: ServiceAccount) -> Result<Self, ProviderError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| ProviderError::Credentials(format!("invalid private key: {e}")))?;
        Ok(Self {
            client,
            account,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    pub async fn access_token(&self) -> Result<String, ProviderError> {
        // Held across the refresh so concurrent callers wait for one exchange.
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.token.clone());
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, ProviderError> {
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: SCOPES,
            aud: &self.account.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| ProviderError::Credentials(format!("failed to sign assertion: {e}")))
    }

    async fn exchange(&self) -> Result<CachedToken, ProviderError> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.is_server_error() {
                ProviderError::Unavailable(format!("token endpoint returned {status}"))
            } else {
                ProviderError::Credentials(format!("token endpoint returned {status}: {body}"))
            });
        }

        let body: TokenResponse = response.json().await?;
        debug!("Obtained provider access token valid for {}s", body.expires_in);

        Ok(CachedToken {
            token: body.access_token,
            expires_at: now + Duration::seconds(body.expires_in),
        })
    }
}
