// src/services/task_service.rs

use std::{str::FromStr, sync::Arc};

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, FinanceRepository, TaskRepository, UserRepository},
    models::{
        auth::{Profile, UserRole},
        finance::{fits_money_column, FinanceType},
        task::{CreateTaskPayload, Task, TaskDetail, TaskStatus},
    },
    services::photo,
    storage::ObjectStorage,
};

/// Dados do formulário de conclusão, já validados.
#[derive(Debug)]
pub struct CompletionInput {
    pub photo: Vec<u8>,
    pub product_info: String,
    pub serial_no: String,
    pub service_fee: Decimal,
}

impl CompletionInput {
    pub fn from_parts(
        photo: Option<Vec<u8>>,
        product_info: Option<String>,
        serial_no: Option<String>,
        service_fee: Option<String>,
    ) -> Result<Self, AppError> {
        let photo = photo.filter(|bytes| !bytes.is_empty()).ok_or(AppError::MissingPhoto)?;

        Ok(Self {
            photo,
            product_info: product_info.unwrap_or_default().trim().to_string(),
            serial_no: serial_no.unwrap_or_default().trim().to_string(),
            service_fee: parse_service_fee(service_fee.as_deref().unwrap_or(""))?,
        })
    }
}

// Vazio vale zero; negativo ou ilegível é recusado
pub fn parse_service_fee(raw: &str) -> Result<Decimal, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let fee = Decimal::from_str(raw)
        .map_err(|_| AppError::InvalidServiceFee(raw.to_string()))?;

    if (fee.is_sign_negative() && !fee.is_zero()) || !fits_money_column(&fee) {
        return Err(AppError::InvalidServiceFee(raw.to_string()));
    }

    Ok(fee.round_dp(2))
}

// Só o funcionário designado (ou um admin) fecha a tarefa
pub fn can_complete(task: &Task, actor: &Profile) -> bool {
    actor.role == UserRole::Admin || task.assigned_worker_id == Some(actor.id)
}

pub fn income_description(task: &Task) -> String {
    let label = if task.title.trim().is_empty() {
        task.client_name.trim()
    } else {
        task.title.trim()
    };
    format!("Service fee: {label}")
}

#[derive(Clone)]
pub struct TaskService {
    task_repo: TaskRepository,
    company_repo: CompanyRepository,
    user_repo: UserRepository,
    finance_repo: FinanceRepository,
    storage: Arc<dyn ObjectStorage>,
    pool: PgPool,
}

impl TaskService {
    pub fn new(
        task_repo: TaskRepository,
        company_repo: CompanyRepository,
        user_repo: UserRepository,
        finance_repo: FinanceRepository,
        storage: Arc<dyn ObjectStorage>,
        pool: PgPool,
    ) -> Self {
        Self { task_repo, company_repo, user_repo, finance_repo, storage, pool }
    }

    pub async fn list_all(&self) -> Result<Vec<TaskDetail>, AppError> {
        self.task_repo.list_details().await
    }

    pub async fn list_for_worker(&self, worker_id: Uuid) -> Result<Vec<TaskDetail>, AppError> {
        self.task_repo.list_for_worker(worker_id).await
    }

    pub async fn create(&self, payload: &CreateTaskPayload) -> Result<Task, AppError> {
        if !self.company_repo.exists(payload.company_id).await? {
            return Err(AppError::CompanyNotFound);
        }

        if let Some(worker_id) = payload.assigned_worker_id {
            let is_worker = self.user_repo
                .find_profile(worker_id)
                .await?
                .is_some_and(|p| p.role == UserRole::Worker);

            if !is_worker {
                return Err(AppError::InvalidAssignee(worker_id));
            }
        }

        let task = self.task_repo.create(payload).await?;
        tracing::info!("📝 Tarefa {} criada", task.id);
        Ok(task)
    }

    /// Fecha a tarefa: comprime e envia a foto, depois grava o resultado
    /// (e a receita vinculada, se houver valor) numa única transação.
    pub async fn complete(
        &self,
        task_id: Uuid,
        actor: &Profile,
        input: CompletionInput,
    ) -> Result<Task, AppError> {
        let task = self.task_repo
            .find_by_id(task_id)
            .await?
            .ok_or(AppError::TaskNotFound)?;

        if !can_complete(&task, actor) {
            return Err(AppError::Forbidden);
        }
        if task.status == TaskStatus::Completed {
            return Err(AppError::TaskAlreadyCompleted);
        }

        let raw_photo = input.photo;
        let compressed = tokio::task::spawn_blocking(move || photo::compress(&raw_photo))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de compressão: {}", e))??;

        let object_name = photo::object_name(task.id, Utc::now());
        self.storage.upload(&object_name, compressed).await?;
        let photo_url = self.storage.public_url(&object_name);

        let result = self
            .persist_completion(&task, &photo_url, &input.product_info, &input.serial_no, input.service_fee)
            .await;

        if let Err(e) = &result {
            // A foto já está no storage e não é apagada
            tracing::warn!("⚠️ Foto {} ficou órfã: conclusão da tarefa {} falhou ({})", object_name, task.id, e);
        }

        result
    }

    async fn persist_completion(
        &self,
        task: &Task,
        photo_url: &str,
        product_info: &str,
        serial_no: &str,
        service_fee: Decimal,
    ) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;

        let completed = self.task_repo
            .mark_completed(&mut *tx, task.id, photo_url, product_info, serial_no, service_fee)
            .await?
            .ok_or(AppError::TaskAlreadyCompleted)?;

        if service_fee > Decimal::ZERO {
            self.finance_repo
                .create(&mut *tx, FinanceType::Income, &income_description(task), service_fee, Some(task.id))
                .await?;
        }

        tx.commit().await?;

        tracing::info!("✅ Tarefa {} concluída (valor: {})", task.id, service_fee);
        Ok(completed)
    }
}
