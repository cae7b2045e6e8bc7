use async_trait::async_trait;
use anyhow::Result;
use crate::config::AppConfig;
use crate::error::GenerationError;
use crate::providers::traits::CompletionProvider;
use reqwest::Client;
use serde_json::{json, Value};

/// Client for a local Ollama server's `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ollama_url.clone(), config.model.clone())
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = self.endpoint();

        let response = self.client
            .post(&endpoint)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false
            }))
            .send()
            .await
            .map_err(|e| GenerationError::BackendUnreachable(format!("{}: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::BackendError(format!(
                "Status {}, Body: {}",
                status, error_text
            ))
            .into());
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::BackendError(format!("Invalid response body: {}", e)))?;

        if let Some(error) = response_json.get("error") {
            return Err(GenerationError::BackendError(format!("Model returned error: {}", error)).into());
        }

        response_json
            .get("response")
            .and_then(|content| content.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                GenerationError::BackendError(format!(
                    "Invalid response format. Response JSON: {}",
                    response_json
                ))
                .into()
            })
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.model.clone())
    }
}
