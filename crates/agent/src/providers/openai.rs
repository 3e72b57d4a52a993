use anyhow::{anyhow, Result};
use async_trait::async_trait;
use inboxpilot_core::config::{LlmProvider, ProviderSettings};
use serde::{Deserialize, Serialize};

use super::{ensure_success, Endpoint};
use crate::llm::LlmClient;

const SYSTEM_MESSAGE: &str = "You are a helpful email assistant.";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, settings: &ProviderSettings, temperature: f32) -> Self {
        Self { http, endpoint: Endpoint::from_settings(settings), temperature }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.endpoint.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_MESSAGE },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.temperature,
        }
    }
}

fn extract_text(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| anyhow!("OpenAI response contained no choices"))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.endpoint.require_key("OPENAI_API_KEY")?;
        let url = format!("{}/chat/completions", self.endpoint.base_url);

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;
        let response = ensure_success(self.provider(), response).await?;

        extract_text(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use inboxpilot_core::config::AppConfig;
    use serde_json::json;

    use super::{extract_text, ChatCompletionResponse, OpenAiClient};
    use crate::llm::LlmClient;

    fn client() -> OpenAiClient {
        let config = AppConfig::default();
        OpenAiClient::new(reqwest::Client::new(), &config.llm.openai, 0.7)
    }

    #[test]
    fn request_carries_system_and_user_messages() {
        let client = client();
        let body = serde_json::to_value(client.request_body("Categorize this")).expect("serializes");

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a helpful email assistant.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Categorize this");
        assert!((body["temperature"].as_f64().unwrap_or_default() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn first_choice_text_is_trimmed() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "  Important \n"}}]
        }))
        .expect("deserializes");
        assert_eq!(extract_text(response).expect("has text"), "Important");

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).expect("deserializes");
        assert!(extract_text(empty).is_err());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let error = client().complete("hello").await.expect_err("no key configured");
        assert!(error.to_string().contains("OPENAI_API_KEY"));
    }
}
