//! Firebase Authentication adapter over the Identity Toolkit REST API.
//!
//! Admin calls (`accounts`, `accounts:lookup`) are authorized with an OAuth2
//! token minted from the service account. Password checks go through
//! `accounts:signInWithPassword`, which needs the project's Web API key.
//! Against the Auth emulator the admin token is the fixed value `owner`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use super::service_account::{AccessTokenSource, ServiceAccount};
use super::{AccountId, IdentityProvider, LoginMode, ProviderError};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const EMULATOR_ADMIN_TOKEN: &str = "owner";

enum AdminAuth {
    ServiceAccount(AccessTokenSource),
    Emulator,
}

pub struct FirebaseIdentityProvider {
    client: Client,
    base_url: String,
    project_id: String,
    admin_auth: AdminAuth,
    web_api_key: Option<String>,
}

#[derive(Serialize)]
struct CreateAccountRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    email: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountResponse>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentityProvider {
    /// Provider for a real Firebase project.
    pub fn new(
        account: ServiceAccount,
        base_url: impl Into<String>,
        web_api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = build_client()?;
        let project_id = account.project_id.clone();
        let tokens = AccessTokenSource::new(client.clone(), account)?;
        Ok(Self {
            client,
            base_url: trim_base(base_url.into()),
            project_id,
            admin_auth: AdminAuth::ServiceAccount(tokens),
            web_api_key,
        })
    }

    /// Provider for the Firebase Auth emulator at `host` (e.g. `localhost:9099`).
    pub fn emulator(
        host: &str,
        project_id: impl Into<String>,
        web_api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        info!("Using Firebase Auth emulator at {host}");
        Ok(Self {
            client: build_client()?,
            base_url: format!("http://{host}/identitytoolkit.googleapis.com"),
            project_id: project_id.into(),
            admin_auth: AdminAuth::Emulator,
            web_api_key,
        })
    }

    async fn admin_token(&self) -> Result<String, ProviderError> {
        match &self.admin_auth {
            AdminAuth::ServiceAccount(tokens) => tokens.access_token().await,
            AdminAuth::Emulator => Ok(EMULATOR_ADMIN_TOKEN.to_string()),
        }
    }

    async fn admin_post<B, R>(&self, action: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let token = self.admin_token().await?;
        let url = format!("{}/v1/projects/{}/{}", self.base_url, self.project_id, action);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        read_response(response).await
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountId, ProviderError> {
        let created: AccountResponse = self
            .admin_post("accounts", &CreateAccountRequest { email, password })
            .await?;
        debug!("Provider created account {}", created.local_id);
        Ok(created.local_id)
    }

    async fn lookup_account_by_email(&self, email: &str) -> Result<AccountId, ProviderError> {
        let found: LookupResponse = self
            .admin_post("accounts:lookup", &LookupRequest { email: [email] })
            .await?;
        found
            .users
            .into_iter()
            .next()
            .map(|u| u.local_id)
            .ok_or(ProviderError::NotFound)
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountId, ProviderError> {
        let api_key = self.web_api_key.as_deref().ok_or(ProviderError::Unsupported)?;
        let url = format!("{}/v1/accounts:signInWithPassword", self.base_url);
        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: false,
            })
            .send()
            .await?;
        let account: AccountResponse = read_response(response).await?;
        Ok(account.local_id)
    }

    fn login_mode(&self) -> LoginMode {
        if self.web_api_key.is_some() {
            LoginMode::VerifyPassword
        } else {
            LoginMode::LookupOnly
        }
    }
}

fn build_client() -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::Credentials(format!("failed to build HTTP client: {e}")))
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

async fn read_response<R: DeserializeOwned>(response: Response) -> Result<R, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("unexpected provider response: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    if status.is_server_error() {
        return Err(ProviderError::Unavailable(format!("{status}: {message}")));
    }
    Err(classify_error(message))
}

/// Pulls `error.message` out of a provider error body, falling back to the
/// raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Maps provider error codes such as `EMAIL_NOT_FOUND` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
fn classify_error(message: String) -> ProviderError {
    let code = message.split(" : ").next().unwrap_or_default().trim().to_string();
    match code.as_str() {
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => ProviderError::NotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => ProviderError::InvalidCredentials,
        _ => ProviderError::Rejected(message),
    }
}
