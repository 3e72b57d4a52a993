//! LLM orchestration for the inbox assistant.
//!
//! Four operations (categorize, extract action items, draft a reply, chat)
//! run against one of two interchangeable backends:
//!
//! - `ProductionBackend` assembles prompts, calls a hosted model through an
//!   [`LlmClient`] and parses the free-form answer (`parsers`).
//! - `DeterministicBackend` answers from keyword rules, offline.
//!
//! Backend failures never escape as errors. They are converted to text with
//! the [`BACKEND_ERROR_PREFIX`] and flagged on the returned [`Outcome`], so
//! `AgentRuntime` can default a single email and keep a batch going.

pub mod backend;
pub mod deterministic;
pub mod llm;
pub mod parsers;
pub mod production;
pub mod providers;
pub mod router;
pub mod runtime;

pub use backend::{new_context, new_context_for, Backend, BackendHandle};
pub use llm::{is_backend_error, LlmClient, Outcome, BACKEND_ERROR_PREFIX};
pub use router::QueryIntent;
pub use runtime::{AgentRuntime, BatchReport, ItemFailure};
