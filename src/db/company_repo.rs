// src/db/company_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::company::Company,
};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT id, name, address, details, created_at FROM companies ORDER BY created_at DESC",
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(companies)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn create(
        &self,
        name: &str,
        address: Option<&str>,
        details: Option<&str>,
    ) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, address, details)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, details, created_at
            "#,
        )
            .bind(name)
            .bind(address)
            .bind(details)
            .fetch_one(&self.pool)
            .await?;

        Ok(company)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        address: Option<&str>,
        details: Option<&str>,
    ) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = $2, address = $3, details = $4
            WHERE id = $1
            RETURNING id, name, address, details, created_at
            "#,
        )
            .bind(id)
            .bind(name)
            .bind(address)
            .bind(details)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    // tasks.company_id é ON DELETE RESTRICT: firma com tarefas não pode sumir
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::CompanyHasTasks;
                    }
                }
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
