//! Core types for the inbox assistant: emails, drafts, prompt templates,
//! chat state, configuration and the shared error taxonomy.

pub mod config;
pub mod domain;
pub mod errors;

pub use domain::chat::{AgentAction, ChatMessage, ChatReply, ChatRole, ChatSession};
pub use domain::draft::{Draft, DraftId, DraftReply, DRAFT_STATUS};
pub use domain::email::{Category, Email, EmailId, Timestamp, UNCATEGORIZED};
pub use domain::prompt::{
    PromptRegistry, PromptTemplate, ACTION_EXTRACTION, AUTO_REPLY, CATEGORIZATION,
};
pub use errors::{ApplicationError, DomainError};
