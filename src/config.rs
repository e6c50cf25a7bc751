// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{CompanyRepository, DashboardRepository, FinanceRepository, TaskRepository, UserRepository},
    services::{
        auth::AuthService, export_service::ExportService, finance_service::FinanceService,
        report_service::ReportService, task_service::TaskService, worker_service::WorkerService,
    },
    storage::{LocalDiskStorage, ObjectStorage},
};

// Administrador criado na primeira subida, se configurado
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub bind_addr: String,
    pub storage_dir: PathBuf,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let jwt_ttl_hours: i64 = parse_or(var("JWT_TTL_HOURS"), "JWT_TTL_HOURS", 168)?;
        let max_upload_mb: usize = parse_or(var("MAX_UPLOAD_MB"), "MAX_UPLOAD_MB", 15)?;

        let bootstrap_admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                full_name: var("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            jwt_ttl: chrono::Duration::hours(jwt_ttl_hours),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            storage_dir: PathBuf::from(var("STORAGE_DIR").unwrap_or_else(|| "./storage/task-photos".to_string())),
            public_base_url: var("PUBLIC_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            bootstrap_admin,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw.parse().with_context(|| format!("{key} inválido: {raw}")),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub storage: Arc<dyn ObjectStorage>,

    pub company_repo: CompanyRepository,
    pub dashboard_repo: DashboardRepository,

    pub auth_service: AuthService,
    pub worker_service: WorkerService,
    pub task_service: TaskService,
    pub finance_service: FinanceService,
    pub report_service: ReportService,
    pub export_service: ExportService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let storage: Arc<dyn ObjectStorage> = Arc::new(
            LocalDiskStorage::new(config.storage_dir.clone(), &config.public_base_url)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao preparar o storage: {}", e))?,
        );

        Ok(Self::assemble(&config, db_pool, storage))
    }

    pub fn assemble(config: &AppConfig, db_pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), config.jwt_ttl);
        let worker_service = WorkerService::new(user_repo.clone(), db_pool.clone());
        let task_service = TaskService::new(
            task_repo.clone(),
            company_repo.clone(),
            user_repo.clone(),
            finance_repo.clone(),
            storage.clone(),
            db_pool.clone(),
        );
        let finance_service = FinanceService::new(finance_repo.clone(), task_repo.clone(), db_pool.clone());
        let report_service = ReportService::new(finance_repo.clone(), task_repo.clone());
        let export_service = ExportService::new(task_repo, finance_repo, company_repo.clone(), user_repo);

        Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::builtin()),
            storage,
            company_repo,
            dashboard_repo,
            auth_service,
            worker_service,
            task_service,
            finance_service,
            report_service,
            export_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/servis"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = config(&REQUIRED).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.jwt_ttl, chrono::Duration::hours(168));
        assert_eq!(config.max_upload_bytes, 15 * 1024 * 1024);
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(config(&[("JWT_SECRET", "secret")]).is_err());
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MAX_UPLOAD_MB", "lots"));
        assert!(config(&vars).is_err());
    }

    #[test]
    fn bootstrap_admin_needs_email_and_password() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ADMIN_EMAIL", "admin@servis.com"));
        assert!(config(&vars).unwrap().bootstrap_admin.is_none());

        vars.push(("ADMIN_PASSWORD", "secret1"));
        let admin = config(&vars).unwrap().bootstrap_admin.unwrap();
        assert_eq!(admin.email, "admin@servis.com");
        assert_eq!(admin.full_name, "Administrator");
    }
}
