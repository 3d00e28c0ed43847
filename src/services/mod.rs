pub mod auth;
pub mod database;
pub mod storage;
pub mod token;
pub mod user_store;
