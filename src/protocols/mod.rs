pub mod chat;
pub mod coach;
