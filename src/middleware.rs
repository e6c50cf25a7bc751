pub mod auth;
pub mod extract;
pub mod i18n;
pub mod rbac;
