pub mod account;
pub mod policy;
