//! Interface to the external text-generation backend.
//!
//! The orchestrator speaks to generation through the narrow
//! [`GenerationGateway`] trait: one fully resolved prompt in, plain text out.
//! The shipped implementation targets Ollama's native `/api/generate`
//! endpoint. Calls are bounded by a configurable timeout; failures surface to
//! the caller and are never retried here.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
    #[error("generation backend did not answer within {0:?}")]
    Timeout(Duration),
}

/// External free-text generation capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Gateway backed by a local Ollama server.
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaGateway {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationGateway for OllamaGateway {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        // Decoding options tuned for a steady, non-chatty clinical register.
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.4,
                "top_p": 0.8,
                "repeat_penalty": 1.1,
                "stop": ["Patient:"],
            },
        });

        let request = async {
            let response = self
                .client
                .post(self.endpoint())
                .json(&body)
                .send()
                .await
                .map_err(|e| GatewayError::Unavailable(e.to_string()))?
                .error_for_status()
                .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
            response
                .json::<GenerateResponse>()
                .await
                .map_err(|e| GatewayError::Unavailable(e.to_string()))
        };

        let payload = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        debug!(chars = payload.response.len(), "generation backend replied");
        Ok(payload.response.trim().to_string())
    }
}
