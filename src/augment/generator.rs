//! Text generation backends

use crate::config::{resolve_secret, AugmentConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Produces text for a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Gemini `generateContent` client
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn from_config(config: &AugmentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let api_key = resolve_secret(&config.api_key_ref);
        if api_key.is_none() {
            tracing::warn!(
                "{} not set, generated text will use fallbacks",
                config.api_key_ref
            );
        }
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Augmentation("API key not configured".to_string()))?;

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Augmentation(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Augmentation(format!(
                "Endpoint returned {}",
                status
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Augmentation(format!("Failed to parse response: {}", e)))?;

        let text = body.text();
        if text.trim().is_empty() {
            return Err(Error::Augmentation("Empty response".to_string()));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Generator for deployments with augmentation disabled; always fails
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Augmentation("augmentation disabled".to_string()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
