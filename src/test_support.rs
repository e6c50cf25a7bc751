// src/test_support.rs
//
// Postgres para os testes de repositório e serviço. Cada teste recebe um
// banco novo, já migrado, no mesmo servidor.

use std::{str::FromStr, sync::Arc};

use postgresql_embedded::PostgreSQL;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, PgConnection, PgPool,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    config::{AppConfig, AppState},
    db::{CompanyRepository, TaskRepository},
    models::{
        auth::{Profile, UserRole},
        company::Company,
        task::{CreateTaskPayload, Task},
        worker::CreateWorkerPayload,
    },
    storage::{LocalDiskStorage, ObjectStorage},
};

// `TEST_DATABASE_URL` aponta para um servidor existente; sem ela sobe um embutido
static SERVER_URL: OnceCell<Option<String>> = OnceCell::const_new();

async fn start_embedded() -> Result<String, postgresql_embedded::Error> {
    let mut postgresql = PostgreSQL::default();
    postgresql.setup().await?;
    postgresql.start().await?;
    let url = postgresql.settings().url("postgres");
    // Fica de pé até o processo de testes terminar
    std::mem::forget(postgresql);
    Ok(url)
}

async fn server_url() -> Option<String> {
    SERVER_URL
        .get_or_init(|| async {
            if let Ok(url) = std::env::var("TEST_DATABASE_URL") {
                return Some(url);
            }
            match start_embedded().await {
                Ok(url) => Some(url),
                Err(e) => {
                    eprintln!("Postgres indisponível, testes de banco ignorados: {e}");
                    None
                }
            }
        })
        .await
        .clone()
}

/// Banco novo e migrado. `None` quando não há Postgres para testar.
pub async fn test_pool() -> Option<PgPool> {
    let server = server_url().await?;
    let name = format!("servis_test_{}", Uuid::new_v4().simple());

    let mut admin = PgConnection::connect(&server).await.expect("admin connection");
    sqlx::query(&format!("CREATE DATABASE {name}"))
        .execute(&mut admin)
        .await
        .expect("create test database");
    admin.close().await.ok();

    let options = PgConnectOptions::from_str(&server).expect("server url").database(&name);
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .expect("test pool");
    sqlx::migrate!().run(&pool).await.expect("migrations");

    Some(pool)
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://servis@127.0.0.1:1/servis".to_string()),
        "JWT_SECRET" => Some("test-secret".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub async fn temp_storage(config: &AppConfig) -> Arc<dyn ObjectStorage> {
    let dir = std::env::temp_dir().join(format!("servis-test-{}", Uuid::new_v4()));
    Arc::new(
        LocalDiskStorage::new(dir, &config.public_base_url)
            .await
            .expect("temp storage"),
    )
}

pub async fn state_with(pool: PgPool) -> AppState {
    let config = test_config();
    let storage = temp_storage(&config).await;
    AppState::assemble(&config, pool, storage)
}

pub async fn seed_company(pool: &PgPool) -> Company {
    CompanyRepository::new(pool.clone())
        .create("ACME Klima", Some("İzmir"), None)
        .await
        .expect("company")
}

pub async fn seed_user(state: &AppState, email: &str, role: UserRole) -> Profile {
    state
        .worker_service
        .create(&CreateWorkerPayload {
            email: email.to_string(),
            password: "secret1".to_string(),
            full_name: "Mehmet Demir".to_string(),
            role: Some(role),
        })
        .await
        .expect("user")
}

pub async fn seed_task(state: &AppState, company_id: Uuid, worker_id: Option<Uuid>) -> Task {
    state
        .task_service
        .create(&CreateTaskPayload {
            company_id,
            assigned_worker_id: worker_id,
            title: "Klima bakımı".to_string(),
            client_name: "Ayşe Kaya".to_string(),
            client_phone: "0555 000 00 00".to_string(),
            client_address: "Kadıköy".to_string(),
            description: None,
        })
        .await
        .expect("task")
}

// Status gravado como veio de dados antigos, sem passar pelo serviço
pub async fn set_raw_status(pool: &PgPool, task_id: Uuid, raw: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tasks SET status = $2 WHERE id = $1")
        .bind(task_id)
        .bind(raw)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_task(pool: &PgPool, id: Uuid) -> Task {
    TaskRepository::new(pool.clone())
        .find_by_id(id)
        .await
        .expect("task query")
        .expect("task exists")
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let buffer = image::ImageBuffer::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(buffer)
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .expect("png");
    bytes
}
