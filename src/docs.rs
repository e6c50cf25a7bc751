// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::logout,

        // --- Workers ---
        handlers::workers::list_workers,
        handlers::workers::create_worker,
        handlers::workers::update_worker,
        handlers::workers::delete_worker,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::create_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::my_tasks,
        handlers::tasks::complete_task,

        // --- Finance ---
        handlers::finance::get_day,
        handlers::finance::create_entry,
        handlers::finance::update_entry,
        handlers::finance::delete_entry,

        // --- Dashboard / Reports / Backup ---
        handlers::dashboard::get_summary,
        handlers::reports::get_report,
        handlers::backup::export_backup,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::Profile,
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::SuccessResponse,

            // --- Workers ---
            models::worker::CreateWorkerPayload,
            models::worker::UpdateWorkerPayload,

            // --- Companies ---
            models::company::Company,
            models::company::CompanyPayload,

            // --- Tasks ---
            models::task::TaskStatus,
            models::task::Task,
            models::task::TaskDetail,
            models::task::CreateTaskPayload,
            models::task::CompleteTaskForm,

            // --- Finance ---
            models::finance::FinanceType,
            models::finance::FinanceEntry,
            models::finance::FinanceEntryDetail,
            models::finance::FinanceDay,
            models::finance::CreateFinancePayload,
            models::finance::UpdateFinancePayload,

            // --- Dashboard / Reports ---
            models::dashboard::DashboardSummary,
            models::reports::WorkerPerformance,
            models::reports::Report,
        )
    ),
    tags(
        (name = "Auth", description = "Login, sessão e logout"),
        (name = "Workers", description = "Gestão de usuários (admin e funcionários)"),
        (name = "Companies", description = "Firmas atendidas"),
        (name = "Tasks", description = "Ordens de serviço e conclusão com foto"),
        (name = "Finance", description = "Caixa diário e sincronização com tarefas"),
        (name = "Dashboard", description = "Indicadores do painel"),
        (name = "Reports", description = "Relatórios por mês"),
        (name = "Backup", description = "Exportação em planilha")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/workers",
            "/api/companies/{id}",
            "/api/tasks/{id}/complete",
            "/api/finance/{id}",
            "/api/reports",
            "/api/backup/export",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
