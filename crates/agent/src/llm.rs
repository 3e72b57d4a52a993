use std::fmt::Display;

use anyhow::Result;
use async_trait::async_trait;
use inboxpilot_core::config::LlmProvider;

/// Prefix carried by every converted backend failure.
pub const BACKEND_ERROR_PREFIX: &str = "Error calling LLM:";

/// Single-prompt text generation against one hosted provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> LlmProvider;
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub fn backend_error_text(error: impl Display) -> String {
    format!("{BACKEND_ERROR_PREFIX} {error}")
}

pub fn is_backend_error(text: &str) -> bool {
    text.starts_with(BACKEND_ERROR_PREFIX)
}

/// A parsed operation result plus the backend failure, if any, that the
/// value was degraded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub backend_error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self { value, backend_error: None }
    }

    /// Parses `raw` with `parse`, flagging it when it is converted error text.
    pub fn from_raw(raw: &str, parse: impl FnOnce(&str) -> T) -> Self {
        let backend_error = is_backend_error(raw).then(|| raw.to_string());
        Self { value: parse(raw), backend_error }
    }

    pub fn is_ok(&self) -> bool {
        self.backend_error.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome { value: f(self.value), backend_error: self.backend_error }
    }
}
