pub mod chat;
pub mod draft;
pub mod email;
pub mod prompt;
