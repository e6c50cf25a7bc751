// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Cards do topo do painel
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub company_count: i64,
    pub pending_tasks: i64,
    pub worker_count: i64,
}
