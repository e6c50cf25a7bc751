// src/handlers/companies.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        extract::{AppJson, AppPath},
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::{
        auth::SuccessResponse,
        company::{Company, CompanyPayload},
    },
};

// Campos opcionais em branco viram NULL
fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    responses(
        (status = 200, description = "Firmas cadastradas", body = Vec<Company>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
) -> Result<impl IntoResponse, ApiError> {
    let companies = app_state
        .company_repo
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(companies)))
}

// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CompanyPayload,
    responses(
        (status = 201, description = "Firma criada", body = Company),
        (status = 400, description = "Nome obrigatório")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppJson(payload): AppJson<CompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .company_repo
        .create(
            payload.name.trim(),
            blank_to_none(&payload.address),
            blank_to_none(&payload.details),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(company)))
}

// PUT /api/companies/{id}
#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    request_body = CompanyPayload,
    params(("id" = Uuid, Path, description = "ID da firma")),
    responses(
        (status = 200, description = "Firma atualizada", body = Company),
        (status = 404, description = "Firma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .company_repo
        .update(
            id,
            payload.name.trim(),
            blank_to_none(&payload.address),
            blank_to_none(&payload.details),
        )
        .await
        .and_then(|found| found.ok_or(AppError::CompanyNotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(company)))
}

// DELETE /api/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da firma")),
    responses(
        (status = 200, description = "Firma removida", body = SuccessResponse),
        (status = 404, description = "Firma não encontrada"),
        (status = 409, description = "Firma ainda possui tarefas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state
        .company_repo
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    if !deleted {
        return Err(AppError::CompanyNotFound.to_api_error(&locale, &app_state.i18n_store));
    }

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}
