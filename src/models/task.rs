// src/models/task.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, FromRow, Postgres, Type,
};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Status ---
// A coluna é TEXT: linhas antigas ainda trazem "beklemede"/"tamamlandı".
// Na leitura tudo é normalizado; na escrita só saem os valores canônicos.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "beklemede")]
    Pending,
    #[serde(alias = "tamamlandı", alias = "tamamlandý")]
    Completed,
}

#[derive(Debug, Error)]
#[error("status de tarefa desconhecido: {0}")]
pub struct UnknownTaskStatus(pub String);

// Mesmo conjunto do `btrim` usado nas consultas
const STATUS_PADDING: [char; 4] = [' ', '\t', '\r', '\n'];

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    // Grafias aceitas, em minúsculas
    pub fn spellings(&self) -> &'static [&'static str] {
        match self {
            TaskStatus::Pending => &["pending", "beklemede"],
            TaskStatus::Completed => &["completed", "tamamlandı", "tamamlandi", "tamamlandý"],
        }
    }

    /// Predicado SQL que casa as mesmas linhas que `FromStr` leria como `self`.
    pub fn sql_filter(&self, column: &str) -> String {
        let values: Vec<String> = self.spellings().iter().map(|v| format!("'{v}'")).collect();
        format!("lower(btrim({column}, E' \\t\\r\\n')) IN ({})", values.join(", "))
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownTaskStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalised = raw.trim_matches(STATUS_PADDING).to_lowercase();

        [TaskStatus::Pending, TaskStatus::Completed]
            .into_iter()
            .find(|status| status.spellings().contains(&normalised.as_str()))
            .ok_or_else(|| UnknownTaskStatus(raw.to_string()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Type<Postgres> for TaskStatus {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for TaskStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

impl Encode<'_, Postgres> for TaskStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub company_id: Uuid,
    pub assigned_worker_id: Option<Uuid>,
    #[schema(example = "Klima bakımı")]
    pub title: String,
    #[schema(example = "Mehmet Demir")]
    pub client_name: String,
    #[schema(example = "0532 000 00 00")]
    pub client_phone: String,
    pub client_address: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    #[schema(example = "Bosch Klima")]
    pub product_info: Option<String>,
    pub serial_no: Option<String>,
    #[schema(example = "750.00")]
    pub service_fee: Option<Decimal>,
    pub work_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// Tarefa com os nomes relacionados (firma e funcionário)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TaskDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub task: Task,
    pub company_name: Option<String>,
    pub worker_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskPayload {
    pub company_id: Uuid,
    pub assigned_worker_id: Option<Uuid>,
    #[serde(default)]
    #[schema(example = "Klima bakımı")]
    pub title: String,
    #[validate(length(min = 1, message = "Client name is required."))]
    pub client_name: String,
    #[validate(length(min = 1, message = "Client phone is required."))]
    pub client_phone: String,
    #[validate(length(min = 1, message = "Client address is required."))]
    pub client_address: String,
    pub description: Option<String>,
}

// Formulário multipart de conclusão (apenas para a documentação)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CompleteTaskForm {
    #[schema(value_type = String, format = Binary)]
    pub photo: Vec<u8>,
    pub product_info: Option<String>,
    pub serial_no: Option<String>,
    #[schema(example = "750")]
    pub service_fee: Option<String>,
}
