use std::collections::BTreeMap;

use inboxpilot_core::config::{ConfigError, LlmConfig, LlmProvider};
use inboxpilot_core::domain::chat::ChatReply;
use inboxpilot_core::domain::draft::DraftReply;
use inboxpilot_core::domain::email::{Category, Email};
use tracing::info;

use crate::deterministic::DeterministicBackend;
use crate::llm::{LlmClient, Outcome};
use crate::production::ProductionBackend;
use crate::providers;
use crate::router;

/// The active assistant backend. Holds only its fixed configuration, so a
/// provider switch builds a new one rather than mutating this one.
pub enum Backend {
    Production(ProductionBackend),
    Deterministic(DeterministicBackend),
}

pub type BackendHandle = Backend;

/// Builds the backend selected by `config`, resolving `auto` against the
/// credentials that are present.
pub fn new_context(config: &LlmConfig) -> Result<BackendHandle, ConfigError> {
    let provider = config.resolve_provider();
    let backend = Backend::for_provider(provider, config);
    info!(
        event_name = "agent.backend.selected",
        provider = %provider,
        requested = %config.provider,
        "assistant backend ready"
    );
    Ok(backend)
}

/// Same as `new_context` but takes the provider as a raw identifier, as
/// entered by a user switching providers.
pub fn new_context_for(provider_id: &str, config: &LlmConfig) -> Result<BackendHandle, ConfigError> {
    let mut config = config.clone();
    config.provider = provider_id.parse()?;
    new_context(&config)
}

impl Backend {
    pub fn for_provider(provider: LlmProvider, config: &LlmConfig) -> Self {
        match providers::client_for(provider, config) {
            Some(client) => Self::production(client),
            None => Self::Deterministic(DeterministicBackend),
        }
    }

    pub fn production(client: Box<dyn LlmClient>) -> Self {
        Self::Production(ProductionBackend::new(client))
    }

    pub fn provider(&self) -> LlmProvider {
        match self {
            Self::Production(backend) => backend.provider(),
            Self::Deterministic(_) => LlmProvider::Mock,
        }
    }

    pub async fn categorize(&self, subject: &str, body: &str, template: &str) -> Outcome<Category> {
        match self {
            Self::Production(backend) => backend.categorize(subject, body, template).await,
            Self::Deterministic(backend) => Outcome::ok(backend.categorize(subject, body, template)),
        }
    }

    pub async fn extract_action_items(
        &self,
        subject: &str,
        body: &str,
        template: &str,
    ) -> Outcome<Vec<String>> {
        match self {
            Self::Production(backend) => backend.extract_action_items(subject, body, template).await,
            Self::Deterministic(backend) => {
                Outcome::ok(backend.extract_action_items(subject, body, template))
            }
        }
    }

    pub async fn generate_draft(
        &self,
        subject: &str,
        body: &str,
        sender: &str,
        template: &str,
        instruction: Option<&str>,
    ) -> Outcome<DraftReply> {
        match self {
            Self::Production(backend) => {
                backend.generate_draft(subject, body, sender, template, instruction).await
            }
            Self::Deterministic(backend) => {
                Outcome::ok(backend.generate_draft(subject, body, sender, template, instruction))
            }
        }
    }

    /// Routes a free-form question about `email`.
    pub async fn chat(
        &self,
        query: &str,
        email: &Email,
        prompts: &BTreeMap<String, String>,
    ) -> Outcome<ChatReply> {
        router::chat_with_agent(self, query, email, prompts).await
    }

    pub(crate) async fn summarize(&self, email: &Email) -> Outcome<String> {
        match self {
            Self::Production(backend) => backend.summarize(email).await,
            Self::Deterministic(backend) => Outcome::ok(backend.summarize(email)),
        }
    }

    pub(crate) async fn answer(&self, email: &Email, query: &str) -> Outcome<String> {
        match self {
            Self::Production(backend) => backend.answer(email, query).await,
            Self::Deterministic(backend) => Outcome::ok(backend.answer(email, query)),
        }
    }

    pub(crate) fn task_listing(&self, action_items: &[String]) -> String {
        match self {
            Self::Production(backend) => backend.task_listing(action_items),
            Self::Deterministic(backend) => backend.task_listing(action_items),
        }
    }
}
