// src/handlers/tasks.rs

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        extract::{AppJson, AppPath},
        i18n::Locale,
        rbac::{Admin, RequireRole, Worker},
    },
    models::task::{CompleteTaskForm, CreateTaskPayload, Task, TaskDetail},
    services::task_service::CompletionInput,
    storage::content_type_for,
};

// GET /api/tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    responses(
        (status = 200, description = "Todas as tarefas, com firma e funcionário", body = Vec<TaskDetail>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = app_state
        .task_service
        .list_all()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tasks)))
}

// POST /api/tasks
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Tarefa criada como pendente", body = Task),
        (status = 400, description = "Dados inválidos ou responsável não é funcionário"),
        (status = 404, description = "Firma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    AppJson(payload): AppJson<CreateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(task)))
}

// GET /api/tasks/mine
#[utoipa::path(
    get,
    path = "/api/tasks/mine",
    tag = "Tasks",
    responses(
        (status = 200, description = "Tarefas do funcionário, pendentes primeiro", body = Vec<TaskDetail>),
        (status = 403, description = "Apenas funcionários")
    ),
    security(("api_jwt" = []))
)]
pub async fn my_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Worker>,
    AuthenticatedUser(profile): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = app_state
        .task_service
        .list_for_worker(profile.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tasks)))
}

async fn read_completion_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<CompletionInput, AppError> {
    let mut multipart = multipart?;
    let mut photo = None;
    let mut product_info = None;
    let mut serial_no = None;
    let mut service_fee = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => photo = Some(field.bytes().await?.to_vec()),
            "product_info" => product_info = Some(field.text().await?),
            "serial_no" => serial_no = Some(field.text().await?),
            "service_fee" => service_fee = Some(field.text().await?),
            _ => {}
        }
    }

    CompletionInput::from_parts(photo, product_info, serial_no, service_fee)
}

// POST /api/tasks/{id}/complete
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/complete",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    request_body(content = CompleteTaskForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Tarefa concluída", body = Task),
        (status = 400, description = "Foto ausente, imagem inválida ou valor inválido"),
        (status = 403, description = "Tarefa de outro funcionário"),
        (status = 404, description = "Tarefa não encontrada"),
        (status = 409, description = "Tarefa já concluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = read_completion_form(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .complete(id, &profile, input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(task)))
}

// GET /files/{name}: destino das URLs públicas das fotos
pub async fn serve_file(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(name): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = app_state
        .storage
        .read(&name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&name)),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    ))
}
