// src/db/task_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        reports::TaskReportRow,
        task::{CreateTaskPayload, Task, TaskDetail, TaskStatus},
    },
};

const TASK_COLUMNS: &str = r#"
    id, company_id, assigned_worker_id, title,
    client_name, client_phone, client_address, description,
    status, product_info, serial_no, service_fee, work_photo_url,
    created_at, completed_at
"#;

// Tarefa + nome da firma + nome do funcionário
const TASK_DETAIL_SELECT: &str = r#"
    SELECT
        t.id, t.company_id, t.assigned_worker_id, t.title,
        t.client_name, t.client_phone, t.client_address, t.description,
        t.status, t.product_info, t.serial_no, t.service_fee, t.work_photo_url,
        t.created_at, t.completed_at,
        c.name AS company_name,
        p.full_name AS worker_name
    FROM tasks t
    LEFT JOIN companies c ON c.id = t.company_id
    LEFT JOIN profiles p ON p.id = t.assigned_worker_id
"#;

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_details(&self) -> Result<Vec<TaskDetail>, AppError> {
        let tasks = sqlx::query_as::<_, TaskDetail>(&format!(
            "{TASK_DETAIL_SELECT} ORDER BY t.created_at DESC"
        ))
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    // Pendentes primeiro (inclusive o vocabulário antigo), depois as mais novas
    pub async fn list_for_worker(&self, worker_id: Uuid) -> Result<Vec<TaskDetail>, AppError> {
        let pending = TaskStatus::Pending.sql_filter("t.status");
        let tasks = sqlx::query_as::<_, TaskDetail>(&format!(
            r#"
            {TASK_DETAIL_SELECT}
            WHERE t.assigned_worker_id = $1
            ORDER BY
                CASE WHEN {pending} THEN 0 ELSE 1 END,
                t.created_at DESC
            "#
        ))
            .bind(worker_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    pub async fn create(&self, payload: &CreateTaskPayload) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (
                company_id, assigned_worker_id, title,
                client_name, client_phone, client_address, description, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TASK_COLUMNS}
            "#
        ))
            .bind(payload.company_id)
            .bind(payload.assigned_worker_id)
            .bind(&payload.title)
            .bind(&payload.client_name)
            .bind(&payload.client_phone)
            .bind(&payload.client_address)
            .bind(payload.description.as_deref())
            .bind(TaskStatus::Pending)
            .fetch_one(&self.pool)
            .await?;

        Ok(task)
    }

    // Só conclui o que ainda está pendente: a transição é de mão única
    pub async fn mark_completed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        work_photo_url: &str,
        product_info: &str,
        serial_no: &str,
        service_fee: Decimal,
    ) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pending = TaskStatus::Pending.sql_filter("status");
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks SET
                status = $2,
                work_photo_url = $3,
                product_info = $4,
                serial_no = $5,
                service_fee = $6,
                completed_at = NOW()
            WHERE id = $1
              AND {pending}
            RETURNING {TASK_COLUMNS}
            "#
        ))
            .bind(id)
            .bind(TaskStatus::Completed)
            .bind(work_photo_url)
            .bind(product_info)
            .bind(serial_no)
            .bind(service_fee)
            .fetch_optional(executor)
            .await?;

        Ok(task)
    }

    pub async fn set_service_fee<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        service_fee: Decimal,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE tasks SET service_fee = $2 WHERE id = $1")
            .bind(id)
            .bind(service_fee)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_report_rows(&self) -> Result<Vec<TaskReportRow>, AppError> {
        let rows = sqlx::query_as::<_, TaskReportRow>(
            r#"
            SELECT t.status, t.created_at, p.full_name AS worker_name
            FROM tasks t
            LEFT JOIN profiles p ON p.id = t.assigned_worker_id
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
