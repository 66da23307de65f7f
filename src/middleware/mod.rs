pub mod auth;
pub mod require_role;
