// src/models/worker.rs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::auth::UserRole;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkerPayload {
    #[validate(email(message = "The e-mail address is invalid."))]
    #[schema(example = "mehmet@servis.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required."))]
    #[schema(example = "Mehmet Demir")]
    pub full_name: String,
    // Sem papel explícito, vira funcionário de campo
    pub role: Option<UserRole>,
}

impl CreateWorkerPayload {
    pub fn role(&self) -> UserRole {
        self.role.unwrap_or(UserRole::Worker)
    }
}

// Senha vazia ou ausente mantém a atual
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkerPayload {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Full name is required."))]
    pub full_name: String,
    pub role: UserRole,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkerListQuery {
    pub role: Option<UserRole>,
}

// O id chega como texto para que ausente e malformado caiam no mesmo erro
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkerDeleteQuery {
    pub id: Option<String>,
}
