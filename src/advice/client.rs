//! Blocking client for a Gemini-style `generateContent` endpoint.
//!
//! One request per call, no retry. The API key comes from the environment
//! at call-site construction, never from persisted state.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AdviceConfig;

/// Environment variable carrying the advice API key.
pub const API_KEY_ENV: &str = "FINSMART_API_KEY";

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("advice API key is not configured (set {API_KEY_ENV})")]
    MissingApiKey,
    #[error("advice request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("advice endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("advice endpoint returned no text")]
    EmptyResponse,
}

pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut client = Self::new(base_url, model);
        client.api_key = Some(api_key.to_string());
        client
    }

    /// Builds a client from the advice configuration, picking the API key
    /// up from `FINSMART_API_KEY`.
    pub fn from_config(config: &AdviceConfig) -> Self {
        let mut client = Self::new(&config.base_url, &config.model);
        client.api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        client
    }

    /// Sends one text-generation request and returns the answer text.
    pub fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        let api_key = self.api_key.as_deref().ok_or(AdviceError::MissingApiKey)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(model = %self.model, "requesting financial advice");
        let response = self.http_client.post(&url).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdviceError::Status(status));
        }

        let body: GenerateContentResponse = response.json()?;
        let text: String = body
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            return Err(AdviceError::EmptyResponse);
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_without_key_is_rejected_before_any_io() {
        let client = GeminiClient::new("https://example.invalid", "test-model");
        let err = client.generate("prompt").unwrap_err();
        assert!(matches!(err, AdviceError::MissingApiKey));
    }

    #[test]
    fn response_text_concatenates_candidate_parts() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Một. "}, {"text": "Hai."}]}},
                {"content": {"parts": [{"text": " Ba."}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .map(|part| part.text)
            .collect();
        assert_eq!(text, "Một. Hai. Ba.");
    }
}
