// src/services/export_service.rs

use chrono::NaiveDate;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    common::error::AppError,
    db::{CompanyRepository, FinanceRepository, TaskRepository, UserRepository},
    models::{
        auth::{Profile, UserRole},
        company::Company,
        finance::{FinanceEntry, FinanceType},
        task::{TaskDetail, TaskStatus},
    },
};

// Folga somada à maior célula de cada coluna
const COLUMN_PADDING: usize = 4;
const EMPTY: &str = "-";
// Limites do Excel: caracteres por célula e largura de coluna
pub const MAX_CELL_CHARS: usize = 32_767;
pub const MAX_COLUMN_WIDTH: usize = 255;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(Decimal),
}

impl Cell {
    // Textos maiores que uma célula do Excel aceita são cortados
    fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        match value.char_indices().nth(MAX_CELL_CHARS) {
            Some((cut, _)) => Cell::Text(value[..cut].to_string()),
            None => Cell::Text(value),
        }
    }

    fn optional(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Cell::text(v),
            None => Cell::text(EMPTY),
        }
    }

    fn display_len(&self) -> usize {
        match self {
            Cell::Text(text) => text.chars().count(),
            Cell::Number(number) => number.to_string().chars().count(),
        }
    }
}

/// Uma aba da planilha: cabeçalho legível + uma linha por registro.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest_cell = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(Cell::display_len)
                    .max()
                    .unwrap_or(0);
                header.chars().count().max(longest_cell) + COLUMN_PADDING
            })
            .collect()
    }
}

pub fn task_sheet(tasks: &[TaskDetail]) -> Sheet {
    let rows = tasks
        .iter()
        .map(|detail| {
            let task = &detail.task;
            vec![
                Cell::optional(Some(task.title.as_str())),
                Cell::optional(detail.company_name.as_deref()),
                Cell::optional(detail.worker_name.as_deref()),
                Cell::text(&task.client_name),
                Cell::text(&task.client_phone),
                Cell::text(&task.client_address),
                Cell::optional(task.product_info.as_deref()),
                Cell::optional(task.serial_no.as_deref()),
                Cell::Number(task.service_fee.unwrap_or_default()),
                Cell::text(match task.status {
                    TaskStatus::Pending => "Pending",
                    TaskStatus::Completed => "Completed",
                }),
                Cell::text(task.created_at.format("%d.%m.%Y").to_string()),
            ]
        })
        .collect();

    Sheet {
        name: "Tasks",
        headers: vec![
            "Task Title", "Company", "Worker", "Client", "Phone", "Address",
            "Product Info", "Serial No", "Service Fee (TRY)", "Status", "Created At",
        ],
        rows,
    }
}

pub fn finance_sheet(entries: &[FinanceEntry]) -> Sheet {
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                Cell::text(match entry.kind {
                    FinanceType::Income => "INCOME (+)",
                    FinanceType::Expense => "EXPENSE (-)",
                }),
                Cell::text(&entry.description),
                Cell::Number(entry.amount),
                Cell::text(entry.created_at.format("%d.%m.%Y %H:%M").to_string()),
                Cell::text(if entry.task_id.is_some() { "Task Record" } else { "General" }),
            ]
        })
        .collect();

    Sheet {
        name: "Finance",
        headers: vec!["Type", "Description", "Amount (TRY)", "Date/Time", "Reference"],
        rows,
    }
}

pub fn company_sheet(companies: &[Company]) -> Sheet {
    let rows = companies
        .iter()
        .map(|company| {
            vec![
                Cell::text(&company.name),
                Cell::optional(company.address.as_deref()),
                Cell::optional(company.details.as_deref()),
                Cell::text(company.created_at.format("%d.%m.%Y").to_string()),
            ]
        })
        .collect();

    Sheet {
        name: "Companies",
        headers: vec!["Company Name", "Address", "Details", "Registered At"],
        rows,
    }
}

pub fn worker_sheet(profiles: &[Profile]) -> Sheet {
    let rows = profiles
        .iter()
        .map(|profile| {
            vec![
                Cell::text(&profile.full_name),
                Cell::text(&profile.email),
                Cell::text(match profile.role {
                    UserRole::Admin => "Administrator",
                    UserRole::Worker => "Worker",
                }),
            ]
        })
        .collect();

    Sheet {
        name: "Workers",
        headers: vec!["Full Name", "E-mail", "Role"],
        rows,
    }
}

/// Monta o `.xlsx` em memória. Trabalho síncrono: chamar via `spawn_blocking`.
pub fn build_workbook(sheets: &[Sheet]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        for (index, row) in sheet.rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col as u16, text.as_str())?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row_num, col as u16, number.to_f64().unwrap_or_default())?;
                    }
                }
            }
        }

        for (col, width) in sheet.column_widths().into_iter().enumerate() {
            worksheet.set_column_width(col as u16, width.min(MAX_COLUMN_WIDTH) as f64)?;
        }
        worksheet.set_freeze_panes(1, 0)?;
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn file_name(date: NaiveDate) -> String {
    format!("business_backup_{}.xlsx", date.format("%Y-%m-%d"))
}

#[derive(Clone)]
pub struct ExportService {
    task_repo: TaskRepository,
    finance_repo: FinanceRepository,
    company_repo: CompanyRepository,
    user_repo: UserRepository,
}

impl ExportService {
    pub fn new(
        task_repo: TaskRepository,
        finance_repo: FinanceRepository,
        company_repo: CompanyRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self { task_repo, finance_repo, company_repo, user_repo }
    }

    /// Lê as quatro tabelas inteiras e devolve (nome do arquivo, bytes).
    pub async fn export(&self, today: NaiveDate) -> Result<(String, Vec<u8>), AppError> {
        let sheets = vec![
            task_sheet(&self.task_repo.list_details().await?),
            finance_sheet(&self.finance_repo.list_all().await?),
            company_sheet(&self.company_repo.list().await?),
            worker_sheet(&self.user_repo.list_profiles(None).await?),
        ];

        let bytes = tokio::task::spawn_blocking(move || build_workbook(&sheets))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task da planilha: {}", e))??;

        tracing::info!("💾 Backup gerado ({} bytes)", bytes.len());
        Ok((file_name(today), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn company(name: &str, address: Option<&str>) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.map(str::to_string),
            details: None,
            created_at: Utc::now(),
        }
    }

    fn finance(kind: FinanceType, amount: i64, task_id: Option<Uuid>) -> FinanceEntry {
        FinanceEntry {
            id: Uuid::new_v4(),
            kind,
            description: "Kombi yakıtı".into(),
            amount: Decimal::from(amount),
            task_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn one_row_per_record() {
        let sheet = company_sheet(&[company("ACME", None), company("Beta", Some("İzmir"))]);

        assert_eq!(sheet.rows.len(), 2);
        assert!(sheet.rows.iter().all(|row| row.len() == sheet.headers.len()));
        assert_eq!(sheet.rows[0][1], Cell::text("-"));
    }

    #[test]
    fn widths_cover_header_and_longest_cell() {
        let sheet = company_sheet(&[company("A very long company name indeed", None)]);
        let widths = sheet.column_widths();

        assert_eq!(widths[0], "A very long company name indeed".chars().count() + 4);
        assert_eq!(widths[1], "Address".len() + 4);
        for (col, width) in widths.iter().enumerate() {
            assert!(*width >= sheet.headers[col].chars().count() + 4);
        }
    }

    #[test]
    fn widths_count_characters_not_bytes() {
        let sheet = Sheet {
            name: "T",
            headers: vec!["X"],
            rows: vec![vec![Cell::text("Şişli Çağlayan")]],
        };
        assert_eq!(sheet.column_widths(), vec![14 + 4]);
    }

    #[test]
    fn finance_rows_are_labelled() {
        let sheet = finance_sheet(&[
            finance(FinanceType::Income, 750, Some(Uuid::new_v4())),
            finance(FinanceType::Expense, 120, None),
        ]);

        assert_eq!(sheet.rows[0][0], Cell::text("INCOME (+)"));
        assert_eq!(sheet.rows[0][4], Cell::text("Task Record"));
        assert_eq!(sheet.rows[1][0], Cell::text("EXPENSE (-)"));
        assert_eq!(sheet.rows[1][4], Cell::text("General"));
        assert_eq!(sheet.rows[1][2], Cell::Number(Decimal::from(120)));
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let sheets = vec![
            task_sheet(&[]),
            finance_sheet(&[finance(FinanceType::Income, 10, None)]),
            company_sheet(&[company("ACME", None)]),
            worker_sheet(&[]),
        ];
        let bytes = build_workbook(&sheets).unwrap();

        assert!(bytes.starts_with(b"PK"));
    }

    fn detail(description: String) -> TaskDetail {
        TaskDetail {
            task: crate::models::task::Task {
                id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                assigned_worker_id: None,
                title: "Kombi arızası".into(),
                client_name: "Mehmet Demir".into(),
                client_phone: "0532 111 22 33".into(),
                client_address: "Bornova".into(),
                description: Some(description),
                status: TaskStatus::Pending,
                product_info: Some("x".repeat(40_000)),
                serial_no: None,
                service_fee: None,
                work_photo_url: None,
                created_at: Utc::now(),
                completed_at: None,
            },
            company_name: Some("ACME".into()),
            worker_name: None,
        }
    }

    #[test]
    fn oversized_text_is_cut_to_the_cell_limit() {
        let sheet = task_sheet(&[detail("açıklama".repeat(5_000))]);

        let product_info = &sheet.rows[0][6];
        assert_eq!(product_info.display_len(), MAX_CELL_CHARS);
        assert!(sheet.column_widths().iter().all(|w| *w <= MAX_CELL_CHARS + COLUMN_PADDING));

        let Cell::Text(cut) = Cell::text("ş".repeat(MAX_CELL_CHARS + 1)) else {
            panic!("expected text");
        };
        assert_eq!(cut.chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn workbook_accepts_tasks_with_huge_free_text() {
        let sheets = vec![task_sheet(&[detail("a".repeat(40_000))])];
        let bytes = build_workbook(&sheets).unwrap();

        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn task_sheet_reads_back_with_one_row_per_task() {
        use calamine::{open_workbook_from_rs, Reader, Xlsx};
        use std::io::Cursor;

        let tasks: Vec<TaskDetail> = (0..3).map(|i| detail(format!("iş {i}"))).collect();
        let sheets = vec![task_sheet(&tasks), worker_sheet(&[])];
        let bytes = build_workbook(&sheets).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Tasks").unwrap();

        assert_eq!(range.height(), tasks.len() + 1);
        assert_eq!(range.get_value((0, 0)).map(|c| c.to_string()), Some("Task Title".to_string()));
        assert_eq!(range.get_value((1, 1)).map(|c| c.to_string()), Some("ACME".to_string()));
        assert_eq!(workbook.worksheet_range("Workers").unwrap().height(), 1);
    }

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(file_name(date), "business_backup_2026-10-19.xlsx");
    }
}
