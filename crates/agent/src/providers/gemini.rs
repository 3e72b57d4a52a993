use anyhow::{anyhow, Result};
use async_trait::async_trait;
use inboxpilot_core::config::{LlmProvider, ProviderSettings};
use serde::{Deserialize, Serialize};

use super::{ensure_success, Endpoint};
use crate::llm::LlmClient;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self { http, endpoint: Endpoint::from_settings(settings) }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint.base_url, self.endpoint.model)
    }
}

fn request_body(prompt: &str) -> GenerateContentRequest<'_> {
    GenerateContentRequest { contents: [Content { parts: [Part { text: prompt }] }] }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;

    let text: String = parts.into_iter().filter_map(|part| part.text).collect();
    if text.trim().is_empty() {
        return Err(anyhow!("Gemini response contained no text"));
    }
    Ok(text.trim().to_string())
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.endpoint.require_key("GEMINI_API_KEY")?;

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt))
            .send()
            .await?;
        let response = ensure_success(self.provider(), response).await?;

        extract_text(response.json().await?)
    }
}
