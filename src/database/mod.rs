pub mod accounts;
pub mod manager;
pub mod models;
pub mod policies;
