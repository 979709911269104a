//! Axum route handlers for the résumé API. All routes sit behind
//! `require_auth`, so `AuthContext` is always present.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthContext;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::curriculo::{Curriculo, CurriculoInput};
use crate::models::ApiResponse;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CurriculoData {
    pub uid: String,
    pub curriculo: Curriculo,
}

#[derive(Debug, Serialize)]
pub struct CurriculoListData {
    pub uid: String,
    pub curriculos: Vec<Curriculo>,
}

type CurriculoResponse = Json<ApiResponse<CurriculoData>>;
type CurriculoListResponse = Json<ApiResponse<CurriculoListData>>;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Curriculo {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /curriculos
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<CurriculoListResponse, AppError> {
    let curriculos = state.curriculos.list().await?;
    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        "Lista de currículos",
        CurriculoListData {
            uid: auth.uid,
            curriculos,
        },
    )))
}

/// GET /curriculos/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<CurriculoResponse, AppError> {
    let curriculo = state.curriculos.get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        format!("Currículo {id}"),
        CurriculoData {
            uid: auth.uid,
            curriculo,
        },
    )))
}

/// GET /curriculos/pessoa/:nome
pub async fn handle_find_by_nome(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(nome): Path<String>,
) -> Result<CurriculoListResponse, AppError> {
    let curriculos = state.curriculos.find_by_nome(&nome).await?;
    if curriculos.is_empty() {
        return Err(AppError::NotFound(format!("No curriculo for {nome}")));
    }
    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        format!("Currículo de {nome}"),
        CurriculoListData {
            uid: auth.uid,
            curriculos,
        },
    )))
}

/// POST /curriculos
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(input): ApiJson<CurriculoInput>,
) -> Result<(StatusCode, CurriculoResponse), AppError> {
    input.validate().map_err(AppError::Validation)?;

    let curriculo = state.curriculos.create(&input).await?;
    info!("Created curriculo {} for {}", curriculo.id, auth.uid);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED,
            "Currículo criado com sucesso!",
            CurriculoData {
                uid: auth.uid,
                curriculo,
            },
        )),
    ))
}

/// PUT /curriculos/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<CurriculoInput>,
) -> Result<CurriculoResponse, AppError> {
    input.validate().map_err(AppError::Validation)?;

    let curriculo = state
        .curriculos
        .update(id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    info!("Updated curriculo {id} for {}", auth.uid);

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        format!("Currículo com ID {id} atualizado com sucesso!"),
        CurriculoData {
            uid: auth.uid,
            curriculo,
        },
    )))
}

/// DELETE /curriculos/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if !state.curriculos.delete(id).await? {
        return Err(not_found(id));
    }
    info!("Deleted curriculo {id} for {}", auth.uid);
    Ok(StatusCode::NO_CONTENT)
}
