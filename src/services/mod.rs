pub mod policy_service;
pub mod storage;
pub mod user_management;
