// src/services/worker_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{Profile, UserRole},
        worker::{CreateWorkerPayload, UpdateWorkerPayload},
    },
    services::auth::{hash_password, normalize_email},
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct WorkerService {
    user_repo: UserRepository,
    pool: PgPool,
}

impl WorkerService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    pub async fn list(&self, role: Option<UserRole>) -> Result<Vec<Profile>, AppError> {
        self.user_repo.list_profiles(role).await
    }

    pub async fn create(&self, payload: &CreateWorkerPayload) -> Result<Profile, AppError> {
        self.register(
            &normalize_email(&payload.email),
            &payload.password,
            payload.full_name.trim(),
            payload.role(),
        )
        .await
    }

    pub async fn update(&self, payload: &UpdateWorkerPayload) -> Result<Profile, AppError> {
        // Valida e faz o hash antes de abrir a transação
        let password_hash = match password_change(payload.password.as_deref())? {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let profile = self.user_repo
            .update_profile(&mut *tx, payload.id, payload.full_name.trim(), payload.role)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if let Some(password_hash) = password_hash {
            self.user_repo.update_password(&mut *tx, payload.id, &password_hash).await?;
        }

        tx.commit().await?;

        Ok(profile)
    }

    pub async fn delete(&self, raw_id: Option<&str>) -> Result<(), AppError> {
        let id = raw_id
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or(AppError::MissingId)?;

        if !self.user_repo.delete_auth_user(id).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!("🗑️ Usuário {} removido", id);
        Ok(())
    }

    /// Cria o primeiro administrador quando ainda não existe nenhum.
    /// Retorna `true` se um perfil foi criado.
    pub async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<bool, AppError> {
        if self.user_repo.admin_exists().await? {
            return Ok(false);
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::WeakPassword);
        }

        let profile = self
            .register(&normalize_email(email), password, full_name, UserRole::Admin)
            .await?;
        tracing::info!("👤 Administrador inicial criado: {}", profile.email);

        Ok(true)
    }

    // Identidade + perfil na mesma transação
    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: UserRole,
    ) -> Result<Profile, AppError> {
        let password_hash = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self.user_repo
            .create_auth_user(&mut *tx, email, &password_hash)
            .await?;

        let profile = self.user_repo
            .upsert_profile(&mut *tx, user.id, full_name, &user.email, role)
            .await?;

        tx.commit().await?;

        Ok(profile)
    }
}

// Some(senha) só quando há troca; vazio ou ausente mantém a senha atual
pub fn password_change(raw: Option<&str>) -> Result<Option<&str>, AppError> {
    match raw {
        None | Some("") => Ok(None),
        Some(password) if password.chars().count() < MIN_PASSWORD_LEN => {
            Err(AppError::WeakPassword)
        }
        Some(password) => Ok(Some(password)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn empty_password_keeps_the_current_one(#[case] raw: Option<&str>) {
        assert_eq!(password_change(raw).unwrap(), None);
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(matches!(password_change(Some("12345")), Err(AppError::WeakPassword)));
    }

    #[test]
    fn long_enough_password_is_changed() {
        assert_eq!(password_change(Some("123456")).unwrap(), Some("123456"));
    }

    mod with_database {
        use super::*;
        use crate::{
            services::report_service::{ReportPeriod, UNASSIGNED},
            test_support::{find_task, seed_company, seed_task, seed_user, set_raw_status, state_with, test_pool},
        };

        #[tokio::test]
        async fn deleted_workers_leave_their_tasks_unassigned_in_reports() {
            let Some(pool) = test_pool().await else { return };
            let state = state_with(pool.clone()).await;
            let company = seed_company(&pool).await;
            let worker = seed_user(&state, "usta@servis.com", UserRole::Worker).await;
            let task = seed_task(&state, company.id, Some(worker.id)).await;
            set_raw_status(&pool, task.id, "completed").await.unwrap();

            state.worker_service.delete(Some(&worker.id.to_string())).await.unwrap();

            assert_eq!(find_task(&pool, task.id).await.assigned_worker_id, Some(worker.id));
            assert!(state.worker_service.list(None).await.unwrap().is_empty());

            let details = state.task_service.list_all().await.unwrap();
            assert_eq!(details[0].worker_name, None);

            let report = state.report_service.report(&ReportPeriod::All).await.unwrap();
            assert_eq!(report.performance.len(), 1);
            assert_eq!(report.performance[0].name, UNASSIGNED);
        }

        #[tokio::test]
        async fn duplicate_emails_are_refused() {
            let Some(pool) = test_pool().await else { return };
            let state = state_with(pool).await;
            seed_user(&state, "usta@servis.com", UserRole::Worker).await;

            let again = state
                .worker_service
                .create(&CreateWorkerPayload {
                    email: " USTA@servis.com ".into(),
                    password: "secret1".into(),
                    full_name: "Başka".into(),
                    role: None,
                })
                .await;

            assert!(matches!(again, Err(AppError::EmailAlreadyExists)));
        }
    }
}
