// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AuthUser, Profile, UserRole},
};

const PROFILE_COLUMNS: &str = "id, full_name, email, role, created_at";

// Identidades (auth_users), perfis (profiles) e tokens revogados
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  IDENTIDADES
    // =========================================================================

    pub async fn find_auth_by_email(&self, email: &str) -> Result<Option<AuthUser>, AppError> {
        let user = sqlx::query_as::<_, AuthUser>(
            "SELECT id, email, password_hash FROM auth_users WHERE email = $1",
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn create_auth_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<AuthUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, AuthUser>(
            r#"
            INSERT INTO auth_users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash
            "#,
        )
            .bind(email)
            .bind(password_hash)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE auth_users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // O perfil cai junto (ON DELETE CASCADE); as tarefas mantêm o id antigo
    pub async fn delete_auth_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM auth_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PERFIS
    // =========================================================================

    pub async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    // Insere ou sobrescreve o perfil da identidade (conflito em `id`)
    pub async fn upsert_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        full_name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (id, full_name, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                email = EXCLUDED.email,
                role = EXCLUDED.role
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
            .bind(id)
            .bind(full_name)
            .bind(email)
            .bind(role)
            .fetch_one(executor)
            .await?;

        Ok(profile)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        full_name: &str,
        role: UserRole,
    ) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles SET full_name = $2, role = $3 WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        ))
            .bind(id)
            .bind(full_name)
            .bind(role)
            .fetch_optional(executor)
            .await?;

        Ok(profile)
    }

    pub async fn list_profiles(&self, role: Option<UserRole>) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at DESC
            "#
        ))
            .bind(role)
            .fetch_all(&self.pool)
            .await?;

        Ok(profiles)
    }

    pub async fn admin_exists(&self) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM profiles WHERE role = 'admin')",
        )
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    // =========================================================================
    //  TOKENS REVOGADOS (logout)
    // =========================================================================

    pub async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) ON CONFLICT (jti) DO NOTHING",
        )
            .bind(jti)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        // Aproveita para limpar o que já expirou de qualquer forma
        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let revoked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)",
        )
            .bind(jti)
            .fetch_one(&self.pool)
            .await?;

        Ok(revoked)
    }
}
