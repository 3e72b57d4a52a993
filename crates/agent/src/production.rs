use inboxpilot_core::config::LlmProvider;
use inboxpilot_core::domain::draft::DraftReply;
use inboxpilot_core::domain::email::{Category, Email};
use tracing::{debug, warn};

use crate::llm::{backend_error_text, LlmClient, Outcome};
use crate::parsers::{clean_category, parse_action_items, parse_draft};

pub const NO_TASKS_TEXT: &str = "No specific action items were found in this email.";

/// Model-backed implementation of the four operations. Transport failures
/// never propagate: they come back as `Error calling LLM: ..` text and are
/// flagged on the returned `Outcome`.
pub struct ProductionBackend {
    client: Box<dyn LlmClient>,
}

impl ProductionBackend {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn provider(&self) -> LlmProvider {
        self.client.provider()
    }

    async fn call(&self, operation: &'static str, prompt: &str) -> String {
        debug!(
            event_name = "agent.backend.call_started",
            provider = %self.provider(),
            operation,
            prompt_chars = prompt.len(),
            "calling language model"
        );

        match self.client.complete(prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    event_name = "agent.backend.call_failed",
                    provider = %self.provider(),
                    operation,
                    error = %error,
                    "language model call failed"
                );
                backend_error_text(error)
            }
        }
    }

    pub async fn categorize(&self, subject: &str, body: &str, template: &str) -> Outcome<Category> {
        let prompt = format!("{template}\n\nEmail Subject: {subject}\nEmail Body: {body}\n\nCategory:");
        let raw = self.call("categorize", &prompt).await;
        Outcome::from_raw(&raw, clean_category)
    }

    pub async fn extract_action_items(
        &self,
        subject: &str,
        body: &str,
        template: &str,
    ) -> Outcome<Vec<String>> {
        let prompt = format!(
            "{template}\n\nEmail Subject: {subject}\nEmail Body: {body}\n\nAction Items (JSON):"
        );
        let raw = self.call("extract_action_items", &prompt).await;
        Outcome::from_raw(&raw, parse_action_items)
    }

    pub async fn generate_draft(
        &self,
        subject: &str,
        body: &str,
        sender: &str,
        template: &str,
        instruction: Option<&str>,
    ) -> Outcome<DraftReply> {
        let prompt = draft_prompt(subject, body, sender, template, instruction);
        let raw = self.call("generate_draft", &prompt).await;
        Outcome::from_raw(&raw, |text| parse_draft(text, subject))
    }

    pub async fn summarize(&self, email: &Email) -> Outcome<String> {
        let prompt = format!(
            "Please provide a concise summary of the following email:\n{}",
            email_context(email)
        );
        let raw = self.call("summarize", &prompt).await;
        Outcome::from_raw(&raw, str::to_string)
    }

    pub async fn answer(&self, email: &Email, query: &str) -> Outcome<String> {
        let prompt = format!(
            "{}\n\nUser Question: {query}\n\nPlease answer based on the email context.",
            email_context(email)
        );
        let raw = self.call("answer", &prompt).await;
        Outcome::from_raw(&raw, str::to_string)
    }

    pub fn task_listing(&self, action_items: &[String]) -> String {
        if action_items.is_empty() {
            return NO_TASKS_TEXT.to_string();
        }
        let bullets: Vec<String> = action_items.iter().map(|item| format!("• {item}")).collect();
        format!("Here are the action items extracted from this email:\n{}", bullets.join("\n"))
    }
}

fn draft_prompt(
    subject: &str,
    body: &str,
    sender: &str,
    template: &str,
    instruction: Option<&str>,
) -> String {
    let mut prompt =
        format!("{template}\n\nOriginal Email:\nFrom: {sender}\nSubject: {subject}\nBody: {body}\n\n");
    if let Some(instruction) = instruction.filter(|text| !text.trim().is_empty()) {
        prompt.push_str(&format!("User Instructions: {instruction}\n\n"));
    }
    prompt.push_str("Please provide a subject line and body for the reply.");
    prompt
}

fn email_context(email: &Email) -> String {
    let action_items =
        serde_json::to_string(&email.action_items).unwrap_or_else(|_| "[]".to_string());
    format!(
        "\nEmail Context:\nFrom: {}\nSubject: {}\nBody: {}\nCategory: {}\nAction Items: {}\n",
        email.sender, email.subject, email.body, email.category, action_items
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use inboxpilot_core::config::LlmProvider;
    use inboxpilot_core::domain::email::{Email, EmailId};

    use super::{draft_prompt, ProductionBackend};
    use crate::llm::LlmClient;

    /// Replies with a fixed answer and records every prompt it receives.
    struct ScriptedClient {
        reply: Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        fn provider(&self) -> LlmProvider {
            LlmProvider::OpenAi
        }

        async fn complete(&self, prompt: &str) -> Result<String> {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            self.reply.clone().map_err(|message| anyhow!(message))
        }
    }

    fn backend(reply: Result<&str, &str>) -> (ProductionBackend, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let client = ScriptedClient {
            reply: reply.map(str::to_string).map_err(str::to_string),
            prompts: Arc::clone(&prompts),
        };
        (ProductionBackend::new(Box::new(client)), prompts)
    }

    fn last_prompt(prompts: &Arc<Mutex<Vec<String>>>) -> String {
        prompts.lock().ok().and_then(|prompts| prompts.last().cloned()).unwrap_or_default()
    }

    #[tokio::test]
    async fn categorize_assembles_prompt_and_cleans_answer() {
        let (backend, prompts) = backend(Ok("\"Category: Spam\""));
        let outcome = backend.categorize("Win big", "Claim now", "Pick one.").await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.value.as_str(), "Spam");
        assert_eq!(
            last_prompt(&prompts),
            "Pick one.\n\nEmail Subject: Win big\nEmail Body: Claim now\n\nCategory:"
        );
    }

    #[tokio::test]
    async fn transport_failure_becomes_flagged_error_text() {
        let (backend, _) = backend(Err("401 Unauthorized"));
        let outcome = backend.categorize("Hi", "there", "Pick one.").await;

        assert_eq!(outcome.backend_error.as_deref(), Some("Error calling LLM: 401 Unauthorized"));
        assert_eq!(outcome.value.as_str(), "Error calling LLM: 401 Unauthorized");

        let outcome = backend.extract_action_items("Hi", "there", "List tasks.").await;
        assert!(!outcome.is_ok());
        assert_eq!(outcome.value, vec!["Error calling LLM: 401 Unauthorized"]);
    }

    #[tokio::test]
    async fn extraction_parses_fenced_json() {
        let (backend, prompts) = backend(Ok("```json\n[\"Send report\", \"Book room\"]\n```"));
        let outcome = backend.extract_action_items("Q4", "Send the report", "List tasks.").await;

        assert_eq!(outcome.value, vec!["Send report", "Book room"]);
        assert!(last_prompt(&prompts).ends_with("\n\nAction Items (JSON):"));
    }

    #[tokio::test]
    async fn draft_uses_subject_line_from_answer() {
        let (backend, _) = backend(Ok("Subject: Re: Budget\nApproved, thanks."));
        let outcome =
            backend.generate_draft("Budget", "Please approve", "amanda@company.com", "Reply.", None).await;

        assert_eq!(outcome.value.subject, "Re: Budget");
        assert_eq!(outcome.value.body, "Approved, thanks.");
    }

    #[test]
    fn draft_prompt_includes_instruction_only_when_present() {
        let with = draft_prompt("Lunch", "Tacos?", "mike@company.com", "Reply.", Some("say yes"));
        assert_eq!(
            with,
            "Reply.\n\nOriginal Email:\nFrom: mike@company.com\nSubject: Lunch\nBody: Tacos?\n\nUser Instructions: say yes\n\nPlease provide a subject line and body for the reply."
        );

        let without = draft_prompt("Lunch", "Tacos?", "mike@company.com", "Reply.", None);
        assert!(!without.contains("User Instructions"));
    }

    #[tokio::test]
    async fn summary_prompt_carries_email_context() {
        let (backend, prompts) = backend(Ok("A short summary."));
        let mut email = Email::new(EmailId(2), "ceo@company.com", "Board prep", "Send numbers", None);
        email.action_items = vec!["Send numbers".to_string()];

        let outcome = backend.summarize(&email).await;

        assert_eq!(outcome.value, "A short summary.");
        let prompt = last_prompt(&prompts);
        assert!(prompt.starts_with("Please provide a concise summary of the following email:\n"));
        assert!(prompt.contains("Category: Uncategorized\nAction Items: [\"Send numbers\"]"));
    }

    #[test]
    fn task_listing_wording() {
        let (backend, _) = backend(Ok(""));
        assert_eq!(backend.task_listing(&[]), "No specific action items were found in this email.");
        assert_eq!(
            backend.task_listing(&["Reply to Sam".to_string()]),
            "Here are the action items extracted from this email:\n• Reply to Sam"
        );
    }
}
