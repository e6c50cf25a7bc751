// src/db/finance_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{FinanceEntry, FinanceEntryDetail, FinanceType},
};

const ENTRY_COLUMNS: &str = "id, type, description, amount, task_id, created_at";

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        kind: FinanceType,
        description: &str,
        amount: Decimal,
        task_id: Option<Uuid>,
    ) -> Result<FinanceEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, FinanceEntry>(&format!(
            r#"
            INSERT INTO finance (type, description, amount, task_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
            .bind(kind)
            .bind(description)
            .bind(amount)
            .bind(task_id)
            .fetch_one(executor)
            .await?;

        Ok(entry)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        description: &str,
        amount: Decimal,
    ) -> Result<Option<FinanceEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, FinanceEntry>(&format!(
            "UPDATE finance SET description = $2, amount = $3 WHERE id = $1 RETURNING {ENTRY_COLUMNS}"
        ))
            .bind(id)
            .bind(description)
            .bind(amount)
            .fetch_optional(executor)
            .await?;

        Ok(entry)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM finance WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Lançamentos no intervalo [from, to), com tarefa e funcionário
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FinanceEntryDetail>, AppError> {
        let entries = sqlx::query_as::<_, FinanceEntryDetail>(
            r#"
            SELECT
                f.id, f.type, f.description, f.amount, f.task_id, f.created_at,
                t.title AS task_title,
                p.full_name AS worker_name
            FROM finance f
            LEFT JOIN tasks t ON t.id = f.task_id
            LEFT JOIN profiles p ON p.id = t.assigned_worker_id
            WHERE f.created_at >= $1 AND f.created_at < $2
            ORDER BY f.created_at DESC
            "#,
        )
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    // O caixa inteiro, sem paginação
    pub async fn list_all(&self) -> Result<Vec<FinanceEntry>, AppError> {
        let entries = sqlx::query_as::<_, FinanceEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM finance ORDER BY created_at DESC"
        ))
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}
