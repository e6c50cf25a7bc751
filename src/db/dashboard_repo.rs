// src/db/dashboard_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{dashboard::DashboardSummary, task::TaskStatus},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        // Snapshot consistente das três contagens
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let company_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM companies")
            .fetch_one(&mut *tx)
            .await?;

        let pending_tasks = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM tasks WHERE {}",
            TaskStatus::Pending.sql_filter("status")
        ))
            .fetch_one(&mut *tx)
            .await?;

        let worker_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM profiles WHERE role = 'worker'",
        )
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            company_count,
            pending_tasks,
            worker_count,
        })
    }
}
