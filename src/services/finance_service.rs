// src/services/finance_service.rs

use chrono::{Days, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, TaskRepository},
    models::finance::{
        CreateFinancePayload, FinanceDay, FinanceEntry, FinanceType, UpdateFinancePayload,
    },
};

// Filtro de tipo da visão diária
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl EntryFilter {
    pub fn accepts(&self, kind: FinanceType) -> bool {
        match self {
            EntryFilter::All => true,
            EntryFilter::Income => kind == FinanceType::Income,
            EntryFilter::Expense => kind == FinanceType::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl LedgerTotals {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

pub fn ledger_totals<'a>(entries: impl IntoIterator<Item = &'a FinanceEntry>) -> LedgerTotals {
    entries.into_iter().fold(LedgerTotals::default(), |mut totals, entry| {
        match entry.kind {
            FinanceType::Income => totals.income += entry.amount,
            FinanceType::Expense => totals.expense += entry.amount,
        }
        totals
    })
}

/// Receita vinculada a uma tarefa: editar o valor atualiza o `service_fee`.
pub fn fee_sync_target(entry: &FinanceEntry) -> Option<(Uuid, Decimal)> {
    match (entry.kind, entry.task_id) {
        (FinanceType::Income, Some(task_id)) => Some((task_id, entry.amount)),
        _ => None,
    }
}

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    task_repo: TaskRepository,
    pool: PgPool,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, task_repo: TaskRepository, pool: PgPool) -> Self {
        Self { repo, task_repo, pool }
    }

    pub async fn day(&self, date: NaiveDate, filter: EntryFilter) -> Result<FinanceDay, AppError> {
        let from = date.and_time(NaiveTime::MIN).and_utc();
        let to = from
            .checked_add_days(Days::new(1))
            .ok_or_else(|| anyhow::anyhow!("Data fora do intervalo: {}", date))?;

        let entries = self.repo.list_between(from, to).await?;
        let daily = ledger_totals(entries.iter().map(|detail| &detail.entry));
        let grand_total = ledger_totals(&self.repo.list_all().await?).net();

        // Os totais do dia ignoram o filtro de tipo
        let entries = entries
            .into_iter()
            .filter(|detail| filter.accepts(detail.entry.kind))
            .collect();

        Ok(FinanceDay {
            date,
            daily_income: daily.income,
            daily_expense: daily.expense,
            daily_net: daily.net(),
            grand_total,
            entries,
        })
    }

    pub async fn create(&self, payload: &CreateFinancePayload) -> Result<FinanceEntry, AppError> {
        if let Some(task_id) = payload.task_id {
            if self.task_repo.find_by_id(task_id).await?.is_none() {
                return Err(AppError::TaskNotFound);
            }
        }

        self.repo
            .create(
                &self.pool,
                payload.kind(),
                payload.description.trim(),
                payload.amount,
                payload.task_id,
            )
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateFinancePayload,
    ) -> Result<FinanceEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let entry = self.repo
            .update(&mut *tx, id, payload.description.trim(), payload.amount)
            .await?
            .ok_or(AppError::FinanceEntryNotFound)?;

        if let Some((task_id, fee)) = fee_sync_target(&entry) {
            if self.task_repo.set_service_fee(&mut *tx, task_id, fee).await? {
                tracing::info!("🔄 Valor da tarefa {} sincronizado: {}", task_id, fee);
            } else {
                tracing::warn!("Lançamento {} aponta para tarefa inexistente {}", entry.id, task_id);
            }
        }

        tx.commit().await?;

        Ok(entry)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::FinanceEntryNotFound);
        }
        Ok(())
    }
}
