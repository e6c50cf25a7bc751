// src/handlers/finance.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        extract::{AppJson, AppPath, AppQuery},
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::{
        auth::SuccessResponse,
        finance::{CreateFinancePayload, FinanceDay, FinanceEntry, UpdateFinancePayload},
    },
    services::finance_service::EntryFilter,
};

#[derive(Debug, Deserialize)]
pub struct FinanceQuery {
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub kind: EntryFilter,
}

// GET /api/finance?date=YYYY-MM-DD&type=all|income|expense
#[utoipa::path(
    get,
    path = "/api/finance",
    tag = "Finance",
    params(
        ("date" = Option<String>, Query, description = "Dia (YYYY-MM-DD, UTC); padrão: hoje"),
        ("type" = Option<String>, Query, description = "all | income | expense")
    ),
    responses(
        (status = 200, description = "Lançamentos do dia com totais", body = FinanceDay)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_day(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppQuery(query): AppQuery<FinanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let day = app_state
        .finance_service
        .day(date, query.kind)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(day)))
}

// POST /api/finance
#[utoipa::path(
    post,
    path = "/api/finance",
    tag = "Finance",
    request_body = CreateFinancePayload,
    responses(
        (status = 201, description = "Lançamento criado", body = FinanceEntry),
        (status = 400, description = "Descrição ou valor inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppJson(payload): AppJson<CreateFinancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .finance_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// PUT /api/finance/{id}
// Receita vinculada a tarefa também atualiza o valor do serviço
#[utoipa::path(
    put,
    path = "/api/finance/{id}",
    tag = "Finance",
    request_body = UpdateFinancePayload,
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento atualizado", body = FinanceEntry),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateFinancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .finance_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

// DELETE /api/finance/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento removido", body = SuccessResponse),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .finance_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}
