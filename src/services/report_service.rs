// src/services/report_service.rs

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::{
    common::error::AppError,
    db::{FinanceRepository, TaskRepository},
    models::{
        finance::FinanceEntry,
        reports::{Report, TaskReportRow, WorkerPerformance},
        task::TaskStatus,
    },
    services::finance_service::ledger_totals,
};

pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportPeriod {
    All,
    Month(String),
}

impl ReportPeriod {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let raw = match raw.map(str::trim) {
            None | Some("") | Some("all") => return Ok(ReportPeriod::All),
            Some(raw) => raw,
        };

        let valid = raw.len() == 7
            && NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").is_ok();

        if valid {
            Ok(ReportPeriod::Month(raw.to_string()))
        } else {
            Err(AppError::InvalidPeriod(raw.to_string()))
        }
    }

    // Prefixo sobre o timestamp RFC 3339 em UTC
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        match self {
            ReportPeriod::All => true,
            ReportPeriod::Month(prefix) => at.to_rfc3339().starts_with(prefix.as_str()),
        }
    }
}

pub fn month_key(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

pub fn available_months(finance: &[FinanceEntry]) -> Vec<String> {
    finance
        .iter()
        .map(|entry| month_key(&entry.created_at))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

// Concluídas por funcionário, mais produtivo primeiro
pub fn worker_performance<'a>(tasks: impl IntoIterator<Item = &'a TaskReportRow>) -> Vec<WorkerPerformance> {
    let mut counts: HashMap<String, u32> = HashMap::new();

    for row in tasks.into_iter().filter(|row| row.status == TaskStatus::Completed) {
        let name = row
            .worker_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNASSIGNED);
        *counts.entry(name.to_string()).or_default() += 1;
    }

    let mut performance: Vec<WorkerPerformance> = counts
        .into_iter()
        .map(|(name, count)| WorkerPerformance { name, count })
        .collect();
    performance.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    performance
}

fn percentage(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (part / total * 10_000.0).round() / 100.0
}

/// Reduz o caixa e as tarefas no relatório do período.
pub fn build_report(finance: &[FinanceEntry], tasks: &[TaskReportRow], period: &ReportPeriod) -> Report {
    let totals = ledger_totals(finance.iter().filter(|entry| period.contains(&entry.created_at)));

    let tasks: Vec<&TaskReportRow> = tasks
        .iter()
        .filter(|row| period.contains(&row.created_at))
        .collect();

    let completed = tasks.iter().filter(|row| row.status == TaskStatus::Completed).count() as u32;
    let pending = tasks.iter().filter(|row| row.status == TaskStatus::Pending).count() as u32;

    let income = totals.income.to_f64().unwrap_or_default();
    let expense = totals.expense.to_f64().unwrap_or_default();

    Report {
        income: totals.income,
        expense: totals.expense,
        completed,
        pending,
        performance: worker_performance(tasks.iter().copied()),
        available_months: available_months(finance),
        task_completion_pct: percentage(f64::from(completed), f64::from(completed + pending)),
        income_share_pct: percentage(income, income + expense),
    }
}

#[derive(Clone)]
pub struct ReportService {
    finance_repo: FinanceRepository,
    task_repo: TaskRepository,
}

impl ReportService {
    pub fn new(finance_repo: FinanceRepository, task_repo: TaskRepository) -> Self {
        Self { finance_repo, task_repo }
    }

    pub async fn report(&self, period: &ReportPeriod) -> Result<Report, AppError> {
        let finance = self.finance_repo.list_all().await?;
        let tasks = self.task_repo.list_report_rows().await?;

        Ok(build_report(&finance, &tasks, period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finance::FinanceType;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn money(kind: FinanceType, amount: i64, when: DateTime<Utc>) -> FinanceEntry {
        FinanceEntry {
            id: Uuid::new_v4(),
            kind,
            description: "x".into(),
            amount: Decimal::from(amount),
            task_id: None,
            created_at: when,
        }
    }

    fn task(status: TaskStatus, worker: Option<&str>, when: DateTime<Utc>) -> TaskReportRow {
        TaskReportRow {
            status,
            created_at: when,
            worker_name: worker.map(str::to_string),
        }
    }

    #[fixture]
    fn finance() -> Vec<FinanceEntry> {
        vec![
            money(FinanceType::Income, 1000, at(2026, 9, 3)),
            money(FinanceType::Expense, 250, at(2026, 9, 20)),
            money(FinanceType::Income, 500, at(2026, 10, 1)),
            money(FinanceType::Expense, 500, at(2025, 12, 31)),
        ]
    }

    #[fixture]
    fn tasks() -> Vec<TaskReportRow> {
        vec![
            task(TaskStatus::Completed, Some("Mehmet"), at(2026, 9, 4)),
            task(TaskStatus::Completed, Some("Ali"), at(2026, 9, 5)),
            task(TaskStatus::Completed, Some("Ali"), at(2026, 10, 2)),
            task(TaskStatus::Pending, Some("Ali"), at(2026, 9, 6)),
            task(TaskStatus::Completed, None, at(2026, 10, 3)),
        ]
    }

    #[rstest]
    #[case(None, ReportPeriod::All)]
    #[case(Some("all"), ReportPeriod::All)]
    #[case(Some("2026-09"), ReportPeriod::Month("2026-09".into()))]
    fn period_parsing(#[case] raw: Option<&str>, #[case] expected: ReportPeriod) {
        assert_eq!(ReportPeriod::parse(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("2026-13")]
    #[case("2026-9")]
    #[case("september")]
    fn malformed_periods_are_rejected(#[case] raw: &str) {
        assert!(matches!(ReportPeriod::parse(Some(raw)), Err(AppError::InvalidPeriod(_))));
    }

    #[rstest]
    fn all_time_totals(finance: Vec<FinanceEntry>, tasks: Vec<TaskReportRow>) {
        let report = build_report(&finance, &tasks, &ReportPeriod::All);

        assert_eq!(report.income, Decimal::from(1500));
        assert_eq!(report.expense, Decimal::from(750));
        assert_eq!(report.completed, 4);
        assert_eq!(report.pending, 1);
        assert_eq!(report.task_completion_pct, 80.0);
        assert_eq!(report.income_share_pct, 66.67);
    }

    #[rstest]
    fn month_filter_only_counts_that_month(finance: Vec<FinanceEntry>, tasks: Vec<TaskReportRow>) {
        let period = ReportPeriod::Month("2026-09".into());
        let report = build_report(&finance, &tasks, &period);

        assert_eq!(report.income, Decimal::from(1000));
        assert_eq!(report.expense, Decimal::from(250));
        assert_eq!(report.completed, 2);
        assert_eq!(report.pending, 1);
    }

    #[rstest]
    fn month_totals_add_up_to_all_time(finance: Vec<FinanceEntry>, tasks: Vec<TaskReportRow>) {
        let all = build_report(&finance, &tasks, &ReportPeriod::All);

        let monthly: Vec<Report> = all
            .available_months
            .iter()
            .map(|m| build_report(&finance, &tasks, &ReportPeriod::Month(m.clone())))
            .collect();

        let income: Decimal = monthly.iter().map(|r| r.income).sum();
        let expense: Decimal = monthly.iter().map(|r| r.expense).sum();
        assert_eq!(income, all.income);
        assert_eq!(expense, all.expense);
    }

    #[rstest]
    fn available_months_are_newest_first(finance: Vec<FinanceEntry>) {
        assert_eq!(available_months(&finance), vec!["2026-10", "2026-09", "2025-12"]);
    }

    #[rstest]
    fn performance_is_sorted_and_falls_back_to_unassigned(tasks: Vec<TaskReportRow>) {
        let performance = worker_performance(&tasks);

        assert_eq!(
            performance,
            vec![
                WorkerPerformance { name: "Ali".into(), count: 2 },
                WorkerPerformance { name: "Mehmet".into(), count: 1 },
                WorkerPerformance { name: UNASSIGNED.into(), count: 1 },
            ]
        );
    }

    #[test]
    fn empty_data_gives_zero_percentages() {
        let report = build_report(&[], &[], &ReportPeriod::All);

        assert_eq!(report.task_completion_pct, 0.0);
        assert_eq!(report.income_share_pct, 0.0);
        assert!(report.performance.is_empty());
        assert!(report.available_months.is_empty());
    }
}
