// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "finance_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FinanceType {
    Income,
    Expense,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FinanceEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: FinanceType,
    #[schema(example = "Klima bakımı tahsilatı")]
    pub description: String,
    #[schema(example = "750.00")]
    pub amount: Decimal,
    pub task_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Lançamento com o título da tarefa e o funcionário responsável
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FinanceEntryDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub entry: FinanceEntry,
    pub task_title: Option<String>,
    pub worker_name: Option<String>,
}

// Visão diária do caixa
#[derive(Debug, Serialize, ToSchema)]
pub struct FinanceDay {
    #[schema(value_type = String, format = Date, example = "2026-10-19")]
    pub date: NaiveDate,
    pub daily_income: Decimal,
    pub daily_expense: Decimal,
    pub daily_net: Decimal,
    // Saldo de todo o caixa (entradas - saídas)
    pub grand_total: Decimal,
    pub entries: Vec<FinanceEntryDetail>,
}

// Colunas NUMERIC(12,2): dez dígitos inteiros
pub fn amount_limit() -> Decimal {
    Decimal::from(10_000_000_000_i64)
}

// Valor gravável na coluna, já arredondado para centavos
pub fn fits_money_column(val: &Decimal) -> bool {
    val.round_dp(2) < amount_limit()
}

pub(crate) fn validate_amount(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("Amount must be greater than zero.".into());
        return Err(err);
    }
    if !fits_money_column(val) {
        let mut err = ValidationError::new("range");
        err.message = Some("Amount must be less than 10,000,000,000.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFinancePayload {
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "120.50")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: Option<FinanceType>,
    pub task_id: Option<Uuid>,
}

impl CreateFinancePayload {
    // Lançamentos manuais são saídas, a não ser que se diga o contrário
    pub fn kind(&self) -> FinanceType {
        self.kind.unwrap_or(FinanceType::Expense)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFinancePayload {
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
}
