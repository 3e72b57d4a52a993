use std::collections::BTreeMap;

use inboxpilot_core::domain::chat::ChatReply;
use inboxpilot_core::domain::email::Email;
use inboxpilot_core::domain::prompt::AUTO_REPLY;

use crate::backend::Backend;
use crate::llm::Outcome;

pub const DRAFT_READY_TEXT: &str = "I've generated a draft reply for you.";
/// Reply instruction used when the registry has no `Auto-Reply` entry.
pub const FALLBACK_REPLY_INSTRUCTION: &str = "Draft a professional reply.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryIntent {
    Summarize,
    Draft,
    Tasks,
    General,
}

impl QueryIntent {
    /// Case-insensitive substring match, checked in priority order.
    pub fn classify(query: &str) -> Self {
        let query = query.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| query.contains(word));

        if mentions(&["summarize", "summary"]) {
            Self::Summarize
        } else if mentions(&["draft", "reply"]) {
            Self::Draft
        } else if mentions(&["task", "action"]) {
            Self::Tasks
        } else {
            Self::General
        }
    }
}

pub async fn chat_with_agent(
    backend: &Backend,
    query: &str,
    email: &Email,
    prompts: &BTreeMap<String, String>,
) -> Outcome<ChatReply> {
    match QueryIntent::classify(query) {
        QueryIntent::Summarize => backend.summarize(email).await.map(ChatReply::text),
        QueryIntent::Draft => {
            let template =
                prompts.get(AUTO_REPLY).map(String::as_str).unwrap_or(FALLBACK_REPLY_INSTRUCTION);
            backend
                .generate_draft(&email.subject, &email.body, &email.sender, template, Some(query))
                .await
                .map(|draft| ChatReply::draft(DRAFT_READY_TEXT, draft))
        }
        QueryIntent::Tasks => Outcome::ok(ChatReply::text(backend.task_listing(&email.action_items))),
        QueryIntent::General => backend.answer(email, query).await.map(ChatReply::text),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use inboxpilot_core::config::LlmProvider;
    use inboxpilot_core::domain::chat::AgentAction;
    use inboxpilot_core::domain::email::{Email, EmailId};
    use inboxpilot_core::domain::prompt::PromptRegistry;

    use super::{chat_with_agent, QueryIntent, DRAFT_READY_TEXT};
    use crate::backend::Backend;
    use crate::deterministic::DeterministicBackend;
    use crate::llm::LlmClient;

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        fn provider(&self) -> LlmProvider {
            LlmProvider::Gemini
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    struct ScriptedClient {
        answer: &'static str,
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
            Ok(self.answer.to_string())
        }
    }

    fn email() -> Email {
        let mut email = Email::new(
            EmailId(5),
            "manager@company.com",
            "Approve budget",
            "Please approve by Friday.",
            None,
        );
        email.action_items = vec!["Approve budget".to_string()];
        email
    }

    #[test]
    fn intent_priority_order() {
        assert_eq!(QueryIntent::classify("Summarize and reply"), QueryIntent::Summarize);
        assert_eq!(QueryIntent::classify("Draft a REPLY saying yes"), QueryIntent::Draft);
        assert_eq!(QueryIntent::classify("What tasks do I have?"), QueryIntent::Tasks);
        assert_eq!(QueryIntent::classify("Any action needed?"), QueryIntent::Tasks);
        assert_eq!(QueryIntent::classify("What should I do?"), QueryIntent::General);
        assert_eq!(QueryIntent::classify("Who sent this?"), QueryIntent::General);
    }

    #[tokio::test]
    async fn draft_intent_attaches_draft_and_uses_query_as_instruction() {
        let backend = Backend::Deterministic(DeterministicBackend);
        let prompts = PromptRegistry::default().templates_by_name();

        let outcome = chat_with_agent(&backend, "draft a reply agreeing", &email(), &prompts).await;

        assert!(outcome.is_ok());
        let reply = outcome.value;
        assert_eq!(reply.action, AgentAction::DraftGenerated);
        assert_eq!(reply.response, DRAFT_READY_TEXT);
        let draft = reply.data.expect("draft attached");
        assert_eq!(draft.subject, "Re: Approve budget");
        assert!(draft.body.contains("User note: draft a reply agreeing"));
    }

    #[tokio::test]
    async fn hosted_draft_intent_returns_parsed_draft() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let client = ScriptedClient {
            answer: "Subject: Re: Approve budget\n\nApproved, thanks for the heads-up.",
            prompts: Arc::clone(&prompts),
        };
        let backend = Backend::production(Box::new(client));
        let templates = PromptRegistry::default().templates_by_name();

        let outcome =
            chat_with_agent(&backend, "Can you draft a reply?", &email(), &templates).await;

        assert!(outcome.is_ok());
        let reply = outcome.value;
        assert_eq!(reply.action, AgentAction::DraftGenerated);
        assert_eq!(reply.response, DRAFT_READY_TEXT);
        let draft = reply.data.expect("draft attached");
        assert_eq!(draft.subject, "Re: Approve budget");
        assert_eq!(draft.body, "Approved, thanks for the heads-up.");

        let sent = prompts.lock().expect("prompt log").clone();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Draft a professional and polite reply"));
        assert!(sent[0].contains("User Instructions: Can you draft a reply?"));
    }

    #[tokio::test]
    async fn task_intent_lists_existing_items_without_backend_call() {
        let backend = Backend::production(Box::new(FailingClient));

        let outcome = chat_with_agent(&backend, "list the tasks", &email(), &BTreeMap::new()).await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.value.action, AgentAction::None);
        assert_eq!(
            outcome.value.response,
            "Here are the action items extracted from this email:\n• Approve budget"
        );
    }

    #[tokio::test]
    async fn failed_summary_surfaces_error_text() {
        let backend = Backend::production(Box::new(FailingClient));

        let outcome = chat_with_agent(&backend, "summary please", &email(), &BTreeMap::new()).await;

        assert_eq!(outcome.value.response, "Error calling LLM: connection refused");
        assert_eq!(outcome.backend_error.as_deref(), Some("Error calling LLM: connection refused"));
    }

    #[tokio::test]
    async fn general_question_gets_capabilities_offline() {
        let backend = Backend::Deterministic(DeterministicBackend);
        let outcome = chat_with_agent(&backend, "Who is Amanda?", &email(), &BTreeMap::new()).await;

        assert!(outcome.value.response.starts_with("I can help you summarize this email"));
        assert!(outcome.value.data.is_none());
    }
}
