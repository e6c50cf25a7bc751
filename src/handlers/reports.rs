// src/handlers/reports.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        extract::AppQuery,
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::reports::Report,
    services::report_service::ReportPeriod,
};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub month: Option<String>,
}

// GET /api/reports?month=all|YYYY-MM
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    params(("month" = Option<String>, Query, description = "all | YYYY-MM")),
    responses(
        (status = 200, description = "Totais, desempenho por funcionário e meses disponíveis", body = Report),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppQuery(query): AppQuery<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = ReportPeriod::parse(query.month.as_deref())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .report_service
        .report(&period)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
