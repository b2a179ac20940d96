//! Gemini `generateContent` client
//!
//! Differences from OpenAI-style chat APIs that matter here:
//! - the prompt travels in `contents[].parts[]`, the system prompt in `systemInstruction`
//! - audio output is requested through `generationConfig.responseModalities` and
//!   `generationConfig.speechConfig`
//! - audio comes back as base64 `inlineData` parts (raw 16-bit PCM at 24 kHz)
//! - the API key is sent in the `x-goog-api-key` header

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{GenerationRequest, GenerationResponse, GenerationService, Modality, Part};
use crate::error::{PipelineError, Result};
use crate::stages::Stage;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Arc<Client>,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

/// Build the JSON body for a request
pub fn build_body(request: &GenerationRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }],
        }],
    });

    if let Some(instruction) = &request.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }

    if request.modality == Modality::Audio {
        let mut gen_config = json!({ "responseModalities": [request.modality] });
        if let Some(speech) = &request.speech {
            gen_config["speechConfig"] = json!({
                "languageCode": speech.language,
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": speech.voice },
                },
            });
        }
        body["generationConfig"] = gen_config;
    }

    body
}

/// Collect parts from every candidate, in order
pub fn parse_response(stage: Stage, body: &Value) -> Result<GenerationResponse> {
    if let Some(message) = body.pointer("/error/message").and_then(|m| m.as_str()) {
        return Err(PipelineError::generation(stage, message));
    }

    let mut parts = Vec::new();
    let candidates = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .map(|c| c.as_slice())
        .unwrap_or_default();

    for candidate in candidates {
        let candidate_parts = candidate
            .pointer("/content/parts")
            .and_then(|p| p.as_array())
            .map(|p| p.as_slice())
            .unwrap_or_default();

        for part in candidate_parts {
            if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                parts.push(Part::Text(text.to_string()));
            } else if let Some(inline) = part.get("inlineData") {
                let mime_type = inline
                    .get("mimeType")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_string();
                let encoded = inline.get("data").and_then(|d| d.as_str()).unwrap_or_default();
                let data = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| {
                        PipelineError::generation(stage, format!("bad inline data: {}", e))
                    })?;
                parts.push(Part::Inline { mime_type, data });
            }
        }
    }

    Ok(GenerationResponse::new(parts))
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(
        &self,
        stage: Stage,
        request: GenerationRequest,
    ) -> Result<GenerationResponse> {
        let body = build_body(&request);
        debug!(
            stage = %stage,
            model = %request.model,
            modality = ?request.modality,
            prompt_chars = request.prompt.len(),
            "Sending generation request"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::generation(stage, format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                PipelineError::generation(stage, format!("failed to read response body: {}", e))
            })?;

        if !status.is_success() {
            return Err(PipelineError::generation(
                stage,
                format!("API error ({}): {}", status, truncate(&text, 500)),
            ));
        }

        let raw: Value = serde_json::from_str(&text).map_err(|e| {
            PipelineError::generation(
                stage,
                format!("invalid JSON response: {} (body: {})", e, truncate(&text, 500)),
            )
        })?;

        let parsed = parse_response(stage, &raw)?;
        debug!(stage = %stage, parts = parsed.parts.len(), "Generation response received");
        Ok(parsed)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
