pub mod policies;
pub mod users;
