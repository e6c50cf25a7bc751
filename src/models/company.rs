// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Arçelik Yetkili Servis")]
    pub name: String,
    #[schema(example = "Atatürk Cad. No:12, İzmir")]
    pub address: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompanyPayload {
    #[validate(length(min = 1, message = "Company name is required."))]
    #[schema(example = "Arçelik Yetkili Servis")]
    pub name: String,
    pub address: Option<String>,
    pub details: Option<String>,
}
