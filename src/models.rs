pub mod auth;
pub mod company;
pub mod dashboard;
pub mod finance;
pub mod reports;
pub mod task;
pub mod worker;
