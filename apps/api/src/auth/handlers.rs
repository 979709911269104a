//! Signup, login and the protected check route.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::AuthContext;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::identity::{authenticate, ProviderError};
use crate::models::ApiResponse;
use crate::state::AppState;

/// Body of `/signup` and `/login`. No `Debug` so the password cannot end
/// up in logs.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupData {
    pub uid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProtectedData {
    pub uid: String,
}

/// POST /signup
pub async fn handle_signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<ApiResponse<SignupData>>, AppError> {
    let uid = state.identity.create_account(&req.email, &req.password).await?;
    info!("Created account {uid}");

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        "Usuário criado com sucesso!",
        SignupData { uid },
    )))
}

/// POST /login
///
/// Every provider failure is answered with 401. Outages are logged as errors.
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginData>>, AppError> {
    let uid = authenticate(state.identity.as_ref(), &req.email, &req.password)
        .await
        .map_err(|e| match e {
            refused @ (ProviderError::NotFound | ProviderError::InvalidCredentials) => {
                warn!("Login refused: {refused}");
                AppError::InvalidCredentials
            }
            other => {
                error!("Login failed at the identity provider: {other}");
                AppError::InvalidCredentials
            }
        })?;

    let issued = state
        .issuer
        .issue(&uid)
        .map_err(|e| anyhow::anyhow!("failed to sign token: {e}"))?;
    info!("Issued token for {uid}, expires {}", issued.expires_at);

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        "Login realizado com sucesso!",
        LoginData {
            token: issued.token,
            expires_at: issued.expires_at,
        },
    )))
}

/// GET /rotaProtegida
pub async fn handle_protected_route(
    Extension(auth): Extension<AuthContext>,
) -> Json<ApiResponse<ProtectedData>> {
    Json(ApiResponse::new(
        StatusCode::OK,
        "Rota protegida: acesso permitido!",
        ProtectedData { uid: auth.uid },
    ))
}
