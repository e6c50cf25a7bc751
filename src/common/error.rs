// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio. Os handlers convertem para ApiError com `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("ID ausente")]
    MissingId,

    #[error("Senha muito curta")]
    WeakPassword,

    #[error("Firma não encontrada")]
    CompanyNotFound,

    #[error("Firma possui tarefas vinculadas")]
    CompanyHasTasks,

    #[error("Tarefa não encontrada")]
    TaskNotFound,

    #[error("Tarefa já concluída")]
    TaskAlreadyCompleted,

    #[error("Responsável inválido: {0}")]
    InvalidAssignee(uuid::Uuid),

    #[error("Foto de conclusão ausente")]
    MissingPhoto,

    #[error("Valor de serviço inválido: {0}")]
    InvalidServiceFee(String),

    #[error("Lançamento não encontrado")]
    FinanceEntryNotFound,

    #[error("Requisição inválida: {0}")]
    InvalidForm(String),

    #[error("Corpo da requisição muito grande")]
    PayloadTooLarge,

    #[error("Imagem inválida: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("Resolução da foto muito alta: {width}x{height}")]
    PhotoTooLarge { width: u32, height: u32 },

    #[error("Nome de arquivo inválido: {0}")]
    InvalidObjectName(String),

    #[error("Arquivo não encontrado")]
    ObjectNotFound,

    #[error("Período inválido: {0}")]
    InvalidPeriod(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de armazenamento: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro ao gerar planilha: {0}")]
    SpreadsheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Rejeições do axum viram o mesmo envelope `{ "error" }` dos demais erros
fn rejection(status: StatusCode, body_text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::InvalidForm(body_text)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        rejection(err.status(), err.body_text())
    }
}

impl AppError {
    // Status HTTP e chave de mensagem (traduzida pelo I18nStore)
    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::ProfileNotFound => (StatusCode::NOT_FOUND, "profile_not_found"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::MissingId => (StatusCode::BAD_REQUEST, "missing_id"),
            AppError::WeakPassword => (StatusCode::BAD_REQUEST, "weak_password"),
            AppError::CompanyNotFound => (StatusCode::NOT_FOUND, "company_not_found"),
            AppError::CompanyHasTasks => (StatusCode::CONFLICT, "company_has_tasks"),
            AppError::TaskNotFound => (StatusCode::NOT_FOUND, "task_not_found"),
            AppError::TaskAlreadyCompleted => (StatusCode::CONFLICT, "task_already_completed"),
            AppError::InvalidAssignee(_) => (StatusCode::BAD_REQUEST, "invalid_assignee"),
            AppError::MissingPhoto => (StatusCode::BAD_REQUEST, "missing_photo"),
            AppError::InvalidServiceFee(_) => (StatusCode::BAD_REQUEST, "invalid_service_fee"),
            AppError::FinanceEntryNotFound => (StatusCode::NOT_FOUND, "finance_entry_not_found"),
            AppError::InvalidForm(_) => (StatusCode::BAD_REQUEST, "invalid_form"),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            AppError::InvalidImage(_) => (StatusCode::BAD_REQUEST, "invalid_image"),
            AppError::PhotoTooLarge { .. } => (StatusCode::BAD_REQUEST, "photo_too_large"),
            AppError::InvalidObjectName(_) => (StatusCode::BAD_REQUEST, "invalid_object_name"),
            AppError::ObjectNotFound => (StatusCode::NOT_FOUND, "object_not_found"),
            AppError::InvalidPeriod(_) => (StatusCode::BAD_REQUEST, "invalid_period"),
            AppError::DatabaseError(_)
            | AppError::StorageError(_)
            | AppError::SpreadsheetError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log, o cliente recebe a mensagem genérica
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::InvalidForm(reason) | AppError::InvalidServiceFee(reason) => {
                Some(json!(reason))
            }
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, key),
            details,
        }
    }
}

// A resposta de erro que sai para o cliente: `{ "error": "..." }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use validator::Validate;

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[rstest]
    #[case(AppError::InvalidCredentials, StatusCode::UNAUTHORIZED)]
    #[case(AppError::Forbidden, StatusCode::FORBIDDEN)]
    #[case(AppError::CompanyHasTasks, StatusCode::CONFLICT)]
    #[case(AppError::TaskAlreadyCompleted, StatusCode::CONFLICT)]
    #[case(AppError::MissingPhoto, StatusCode::BAD_REQUEST)]
    #[case(AppError::TaskNotFound, StatusCode::NOT_FOUND)]
    #[case(AppError::InternalServerError(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_errors_to_status(#[case] err: AppError, #[case] expected: StatusCode) {
        let api = err.to_api_error(&en(), &I18nStore::builtin());
        assert_eq!(api.status, expected);
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: 123"))
            .to_api_error(&en(), &I18nStore::builtin());
        assert!(!api.error.contains("123"));
        assert!(api.details.is_none());
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Name is required."))]
        name: String,
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Payload { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&en(), &I18nStore::builtin());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "Name is required.");
    }

    #[rstest]
    #[case(StatusCode::PAYLOAD_TOO_LARGE, StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")]
    #[case(StatusCode::BAD_REQUEST, StatusCode::BAD_REQUEST, "invalid_form")]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, StatusCode::BAD_REQUEST, "invalid_form")]
    fn rejections_keep_the_body_limit_status(
        #[case] rejected_with: StatusCode,
        #[case] expected: StatusCode,
        #[case] key: &str,
    ) {
        let store = I18nStore::builtin();
        let api = rejection(rejected_with, "limit".to_string()).to_api_error(&en(), &store);

        assert_eq!(api.status, expected);
        assert_eq!(api.error, store.translate("en", key));
    }

    #[test]
    fn photo_resolution_errors_are_client_errors() {
        let api = AppError::PhotoTooLarge { width: 20_000, height: 10 }
            .to_api_error(&en(), &I18nStore::builtin());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn messages_follow_the_request_language() {
        let tr = Locale("tr".to_string());
        let api = AppError::MissingId.to_api_error(&tr, &I18nStore::builtin());
        assert_eq!(api.error, "ID bulunamadı");
    }
}
