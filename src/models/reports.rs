// src/models/reports.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::task::TaskStatus;

// Linha mínima de tarefa usada nos relatórios
#[derive(Debug, Clone, FromRow)]
pub struct TaskReportRow {
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub worker_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WorkerPerformance {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Report {
    pub income: Decimal,
    pub expense: Decimal,
    pub completed: u32,
    pub pending: u32,
    pub performance: Vec<WorkerPerformance>,
    // Meses (YYYY-MM) com lançamentos, do mais recente ao mais antigo
    pub available_months: Vec<String>,
    pub task_completion_pct: f64,
    pub income_share_pct: f64,
}
