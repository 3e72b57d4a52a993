use inboxpilot_core::config::{ConfigError, LlmConfig, LlmProvider};
use inboxpilot_core::domain::chat::ChatReply;
use inboxpilot_core::domain::draft::DraftReply;
use inboxpilot_core::domain::email::{Category, Email, EmailId};
use inboxpilot_core::domain::prompt::{
    PromptRegistry, ACTION_EXTRACTION, AUTO_REPLY, CATEGORIZATION,
};
use inboxpilot_core::errors::{ApplicationError, DomainError};
use tracing::{info, warn};

use crate::backend::{new_context, new_context_for, Backend};
use crate::llm::Outcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemFailure {
    pub email_id: EmailId,
    pub error: String,
}

/// Result of a sequential pass over the inbox.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.processed - self.failures.len()
    }
}

/// Email-level entry point over the active backend. Templates come from
/// the registry on every call, so prompt edits apply immediately.
pub struct AgentRuntime {
    backend: Backend,
}

impl AgentRuntime {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        new_context(config).map(Self::new)
    }

    /// Replaces the backend. Stored data is untouched; on error the
    /// current backend stays active.
    pub fn switch_provider(&mut self, provider_id: &str, config: &LlmConfig) -> Result<(), ConfigError> {
        self.backend = new_context_for(provider_id, config)?;
        info!(
            event_name = "agent.backend.switched",
            provider = %self.backend.provider(),
            "assistant backend switched"
        );
        Ok(())
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn provider(&self) -> LlmProvider {
        self.backend.provider()
    }

    /// Categorizes one email in place. A backend failure leaves it
    /// `Uncategorized` and is returned as an error.
    pub async fn categorize_email(
        &self,
        email: &mut Email,
        prompts: &PromptRegistry,
    ) -> Result<Category, ApplicationError> {
        let template = template(prompts, CATEGORIZATION)?;
        let outcome = self.backend.categorize(&email.subject, &email.body, template).await;

        match outcome.backend_error {
            None => {
                email.category = outcome.value.clone();
                Ok(outcome.value)
            }
            Some(error) => {
                email.category = Category::uncategorized();
                Err(ApplicationError::BackendCall(error))
            }
        }
    }

    /// Replaces the action items of one email. A backend failure clears them.
    pub async fn extract_for_email(
        &self,
        email: &mut Email,
        prompts: &PromptRegistry,
    ) -> Result<usize, ApplicationError> {
        let template = template(prompts, ACTION_EXTRACTION)?;
        let outcome = self.backend.extract_action_items(&email.subject, &email.body, template).await;

        match outcome.backend_error {
            None => {
                email.action_items = outcome.value;
                Ok(email.action_items.len())
            }
            Some(error) => {
                email.action_items.clear();
                Err(ApplicationError::BackendCall(error))
            }
        }
    }

    pub async fn categorize_all(&self, emails: &mut [Email], prompts: &PromptRegistry) -> BatchReport {
        let mut report = BatchReport::default();
        for email in emails.iter_mut() {
            report.processed += 1;
            if let Err(error) = self.categorize_email(email, prompts).await {
                record_failure(&mut report, "categorize", email.id, error);
            }
        }
        log_batch("categorize", &report);
        report
    }

    pub async fn extract_all(&self, emails: &mut [Email], prompts: &PromptRegistry) -> BatchReport {
        let mut report = BatchReport::default();
        for email in emails.iter_mut() {
            report.processed += 1;
            if let Err(error) = self.extract_for_email(email, prompts).await {
                record_failure(&mut report, "extract", email.id, error);
            }
        }
        log_batch("extract", &report);
        report
    }

    /// Drafts a reply with the `Auto-Reply` template. The draft is not saved.
    pub async fn draft_reply(
        &self,
        email: &Email,
        prompts: &PromptRegistry,
        instruction: Option<&str>,
    ) -> Result<Outcome<DraftReply>, ApplicationError> {
        let template = template(prompts, AUTO_REPLY)?;
        Ok(self
            .backend
            .generate_draft(&email.subject, &email.body, &email.sender, template, instruction)
            .await)
    }

    pub async fn chat(&self, query: &str, email: &Email, prompts: &PromptRegistry) -> Outcome<ChatReply> {
        self.backend.chat(query, email, &prompts.templates_by_name()).await
    }
}

fn template<'a>(prompts: &'a PromptRegistry, name: &str) -> Result<&'a str, ApplicationError> {
    prompts
        .get_template(name)
        .ok_or_else(|| DomainError::UnknownPrompt(name.to_string()).into())
}

fn record_failure(report: &mut BatchReport, operation: &str, email_id: EmailId, error: ApplicationError) {
    warn!(
        event_name = "agent.batch.item_failed",
        operation,
        email_id = email_id.0,
        error_class = error.error_class(),
        error = %error,
        "item failed, continuing batch"
    );
    report.failures.push(ItemFailure { email_id, error: error.to_string() });
}

fn log_batch(operation: &str, report: &BatchReport) {
    info!(
        event_name = "agent.batch.completed",
        operation,
        processed = report.processed,
        failed = report.failures.len(),
        "batch finished"
    );
}
