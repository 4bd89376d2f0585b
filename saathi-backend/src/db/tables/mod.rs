pub mod auth;
pub mod emergency;
pub mod medicines;
pub mod memory_aids;
pub mod mood;
pub mod users;
