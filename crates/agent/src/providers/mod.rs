//! HTTP adapters for the hosted text-generation services.
//!
//! Each adapter turns one prompt into one request and pulls the generated
//! text back out of the response. Credentials are read at call time, so a
//! missing key surfaces as a call failure rather than a construction error.

pub mod gemini;
pub mod huggingface;
pub mod openai;

use std::time::Duration;

use anyhow::{anyhow, Result};
use inboxpilot_core::config::{LlmConfig, LlmProvider, ProviderSettings};
use reqwest::Response;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::llm::LlmClient;

pub use gemini::GeminiClient;
pub use huggingface::HuggingFaceClient;
pub use openai::OpenAiClient;

/// Builds the transport for a hosted provider. `Mock` has none.
pub fn client_for(provider: LlmProvider, config: &LlmConfig) -> Option<Box<dyn LlmClient>> {
    let http = http_client(config.timeout_secs);
    match provider {
        LlmProvider::Mock => None,
        LlmProvider::OpenAi => {
            Some(Box::new(OpenAiClient::new(http, &config.openai, config.temperature)))
        }
        LlmProvider::Gemini => Some(Box::new(GeminiClient::new(http, &config.gemini))),
        LlmProvider::HuggingFace => Some(Box::new(HuggingFaceClient::new(
            http,
            &config.huggingface,
            config.temperature,
            config.max_new_tokens,
        ))),
    }
}

fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder().timeout(Duration::from_secs(timeout_secs)).build().unwrap_or_else(
        |error| {
            warn!(
                event_name = "agent.http.builder_failed",
                error = %error,
                "falling back to default http client"
            );
            reqwest::Client::new()
        },
    )
}

pub(crate) struct Endpoint {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

impl Endpoint {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn require_key(&self, env_key: &str) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("{env_key} is not set"))
    }
}

/// Fails with the status and response body when the service rejected the call.
pub(crate) async fn ensure_success(provider: LlmProvider, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("{} returned {status}: {}", provider.label(), body.trim()))
}
