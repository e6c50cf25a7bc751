pub mod auth;
pub mod export_service;
pub mod finance_service;
pub mod photo;
pub mod report_service;
pub mod task_service;
pub mod worker_service;
