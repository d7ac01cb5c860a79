//! Opaque speech proxies.
//!
//! The interview core never touches audio. These proxies forward synthesis
//! and transcription requests byte-for-byte to dedicated upstream services
//! when they are configured; the payloads are opaque to this crate. When no
//! upstream is configured the endpoints answer 503.

use bytes::Bytes;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("no upstream speech service is configured")]
    NotConfigured,
    #[error("upstream speech service failed: {0}")]
    Upstream(String),
}

/// Forwards speech requests to the configured TTS/STT backends.
pub struct SpeechProxy {
    client: reqwest::Client,
    tts_url: Option<String>,
    stt_url: Option<String>,
}

impl SpeechProxy {
    pub fn new(tts_url: Option<String>, stt_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tts_url,
            stt_url,
        }
    }

    /// Text in, opaque audio bytes out.
    pub async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError> {
        let url = self.tts_url.as_ref().ok_or(SpeechError::NotConfigured)?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| SpeechError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| SpeechError::Upstream(e.to_string()))?;
        response
            .bytes()
            .await
            .map_err(|e| SpeechError::Upstream(e.to_string()))
    }

    /// Opaque audio bytes in, transcribed text out.
    pub async fn transcribe(&self, audio: Bytes) -> Result<String, SpeechError> {
        let url = self.stt_url.as_ref().ok_or(SpeechError::NotConfigured)?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(audio)
            .send()
            .await
            .map_err(|e| SpeechError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| SpeechError::Upstream(e.to_string()))?;
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SpeechError::Upstream(e.to_string()))?;
        Ok(payload
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string())
    }
}
