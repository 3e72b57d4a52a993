use anyhow::{anyhow, Result};
use async_trait::async_trait;
use inboxpilot_core::config::{LlmProvider, ProviderSettings};
use serde::Serialize;
use serde_json::Value;

use super::{ensure_success, Endpoint};
use crate::llm::LlmClient;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Parameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

/// Inference API client for text-generation models.
pub struct HuggingFaceClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    temperature: f32,
    max_new_tokens: u32,
}

impl HuggingFaceClient {
    pub fn new(
        http: reqwest::Client,
        settings: &ProviderSettings,
        temperature: f32,
        max_new_tokens: u32,
    ) -> Self {
        Self { http, endpoint: Endpoint::from_settings(settings), temperature, max_new_tokens }
    }

    fn request_body<'a>(&self, prompt: &'a str) -> InferenceRequest<'a> {
        InferenceRequest {
            inputs: prompt,
            parameters: Parameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
            },
        }
    }
}

/// The API answers with a list of generations, a single object, or an
/// `{"error": ..}` document while a model is loading.
fn extract_text(response: &Value) -> Result<String> {
    if let Some(error) = response.get("error").and_then(Value::as_str) {
        return Err(anyhow!("Hugging Face error: {error}"));
    }

    let generation = match response {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    generation
        .and_then(|item| item.get("generated_text"))
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| anyhow!("Hugging Face response contained no generated_text"))
}

#[async_trait]
impl LlmClient for HuggingFaceClient {
    fn provider(&self) -> LlmProvider {
        LlmProvider::HuggingFace
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.endpoint.require_key("HUGGINGFACE_API_KEY")?;
        let url = format!("{}/{}", self.endpoint.base_url, self.endpoint.model);

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;
        let response = ensure_success(self.provider(), response).await?;
        let payload: Value = response.json().await?;

        extract_text(&payload)
    }
}

#[cfg(test)]
mod tests {
    use inboxpilot_core::config::AppConfig;
    use serde_json::json;

    use super::{extract_text, HuggingFaceClient};

    #[test]
    fn request_disables_prompt_echo() {
        let config = AppConfig::default();
        let client = HuggingFaceClient::new(reqwest::Client::new(), &config.llm.huggingface, 0.7, 500);
        let body = serde_json::to_value(client.request_body("Draft a reply")).expect("serializes");

        assert_eq!(body["inputs"], "Draft a reply");
        assert_eq!(body["parameters"]["max_new_tokens"], 500);
        assert_eq!(body["parameters"]["return_full_text"], false);
    }

    #[test]
    fn generated_text_is_read_from_list_or_object() {
        let listed = json!([{"generated_text": " To-Do "}]);
        assert_eq!(extract_text(&listed).expect("text"), "To-Do");

        let single = json!({"generated_text": "Spam"});
        assert_eq!(extract_text(&single).expect("text"), "Spam");
    }

    #[test]
    fn loading_model_is_an_error() {
        let loading = json!({"error": "Model is currently loading", "estimated_time": 20.0});
        let error = extract_text(&loading).expect_err("error document");
        assert!(error.to_string().contains("currently loading"));

        assert!(extract_text(&json!([])).is_err());
    }
}
