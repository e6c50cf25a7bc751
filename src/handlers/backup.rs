// src/handlers/backup.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// GET /api/backup/export
#[utoipa::path(
    get,
    path = "/api/backup/export",
    tag = "Backup",
    responses(
        (status = 200, description = "Planilha .xlsx com tarefas, caixa, firmas e funcionários"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_backup(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
) -> Result<impl IntoResponse, ApiError> {
    let (file_name, bytes) = app_state
        .export_service
        .export(Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        bytes,
    ))
}
