pub mod chat;
pub mod summary_store;
