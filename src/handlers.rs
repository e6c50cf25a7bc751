pub mod auth;
pub mod backup;
pub mod companies;
pub mod dashboard;
pub mod finance;
pub mod reports;
pub mod tasks;
pub mod workers;
