//! Flat-file persistence for the inbox assistant: three JSON documents
//! (`emails.json`, `prompts.json`, `drafts.json`) under one data directory,
//! plus the sample inbox used for demos.

pub mod files;
pub mod fixtures;
pub mod repositories;

pub use files::{JsonStore, StoreError, DRAFTS_FILE, EMAILS_FILE, PROMPTS_FILE};
pub use fixtures::{MockInbox, SeedResult};
