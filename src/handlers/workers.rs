// src/handlers/workers.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        extract::{AppJson, AppQuery},
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::{
        auth::{Profile, SuccessResponse},
        worker::{CreateWorkerPayload, UpdateWorkerPayload, WorkerDeleteQuery, WorkerListQuery},
    },
};

// GET /api/workers
#[utoipa::path(
    get,
    path = "/api/workers",
    tag = "Workers",
    params(WorkerListQuery),
    responses(
        (status = 200, description = "Perfis, do mais novo ao mais antigo", body = Vec<Profile>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_workers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppQuery(query): AppQuery<WorkerListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let profiles = app_state
        .worker_service
        .list(query.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profiles)))
}

// POST /api/workers
#[utoipa::path(
    post,
    path = "/api/workers",
    tag = "Workers",
    request_body = CreateWorkerPayload,
    responses(
        (status = 200, description = "Usuário criado", body = SuccessResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppJson(payload): AppJson<CreateWorkerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .worker_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

// PUT /api/workers
#[utoipa::path(
    put,
    path = "/api/workers",
    tag = "Workers",
    request_body = UpdateWorkerPayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = SuccessResponse),
        (status = 400, description = "Dados inválidos ou senha curta"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppJson(payload): AppJson<UpdateWorkerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .worker_service
        .update(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

// DELETE /api/workers?id=...
#[utoipa::path(
    delete,
    path = "/api/workers",
    tag = "Workers",
    params(WorkerDeleteQuery),
    responses(
        (status = 200, description = "Usuário removido", body = SuccessResponse),
        (status = 400, description = "ID ausente"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_worker(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppQuery(query): AppQuery<WorkerDeleteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .worker_service
        .delete(query.id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}
