pub mod chat;
pub mod meeting;
