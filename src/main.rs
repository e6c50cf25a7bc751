//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;
#[cfg(test)]
mod test_support;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let max_upload_bytes = config.max_upload_bytes;
    let bootstrap_admin = config.bootstrap_admin.clone();

    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some(admin) = bootstrap_admin {
        app_state
            .worker_service
            .ensure_bootstrap_admin(&admin.email, &admin.password, &admin.full_name)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar o administrador inicial: {}", e))?;
    }

    // Tudo abaixo exige token; o papel é checado em cada handler
    let session_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/logout", post(handlers::auth::logout));

    let worker_routes = Router::new()
        .route("/"
               ,get(handlers::workers::list_workers)
               .post(handlers::workers::create_worker)
               .put(handlers::workers::update_worker)
               .delete(handlers::workers::delete_worker)
        );

    let company_routes = Router::new()
        .route("/"
               ,get(handlers::companies::list_companies)
               .post(handlers::companies::create_company)
        )
        .route("/{id}"
               ,put(handlers::companies::update_company)
               .delete(handlers::companies::delete_company)
        );

    let task_routes = Router::new()
        .route("/"
               ,get(handlers::tasks::list_tasks)
               .post(handlers::tasks::create_task)
        )
        .route("/mine", get(handlers::tasks::my_tasks))
        .route("/{id}/complete"
               ,post(handlers::tasks::complete_task)
               .layer(DefaultBodyLimit::max(max_upload_bytes))
        );

    let finance_routes = Router::new()
        .route("/"
               ,get(handlers::finance::get_day)
               .post(handlers::finance::create_entry)
        )
        .route("/{id}"
               ,put(handlers::finance::update_entry)
               .delete(handlers::finance::delete_entry)
        );

    let protected_routes = Router::new()
        .nest("/auth", session_routes)
        .nest("/workers", worker_routes)
        .nest("/companies", company_routes)
        .nest("/tasks", task_routes)
        .nest("/finance", finance_routes)
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/reports", get(handlers::reports::get_report))
        .route("/backup/export", get(handlers::backup::export_backup))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .nest("/api", protected_routes)
        .route("/files/{name}", get(handlers::tasks::serve_file))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
