//! Generation service boundary
//!
//! Every stage talks to the remote model through [`GenerationService`]. A request is a
//! prompt plus an optional system instruction and the modality the caller wants back;
//! the response is an ordered list of [`Part`]s.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stages::Stage;

pub use gemini::{GeminiClient, GeminiConfig};

/// What kind of output a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Audio,
}

/// Voice selection for audio requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOptions {
    /// BCP-47 language tag, e.g. "en"
    pub language: String,
    /// Name of a prebuilt voice
    pub voice: String,
}

/// A single call to the generation service
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub modality: Modality,
    pub speech: Option<SpeechOptions>,
}

impl GenerationRequest {
    /// Text-in, text-out request
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            prompt: prompt.into(),
            modality: Modality::Text,
            speech: None,
        }
    }

    /// Text-in, audio-out request
    pub fn audio(
        model: impl Into<String>,
        prompt: impl Into<String>,
        speech: SpeechOptions,
    ) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            prompt: prompt.into(),
            modality: Modality::Audio,
            speech: Some(speech),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// One piece of a generation response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Inline { mime_type: String, data: Vec<u8> },
}

/// Ordered parts returned by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub parts: Vec<Part>,
}

impl GenerationResponse {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    /// All text parts joined in response order
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::Inline { .. } => None,
            })
            .collect()
    }

    /// All inline payloads concatenated in response order
    pub fn inline_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            if let Part::Inline { data, .. } = part {
                out.extend_from_slice(data);
            }
        }
        out
    }
}

/// Remote text/speech generation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issue one request. `stage` names the caller for error reporting.
    async fn generate(
        &self,
        stage: Stage,
        request: GenerationRequest,
    ) -> Result<GenerationResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_skips_inline_parts() {
        let response = GenerationResponse::new(vec![
            Part::Text("Hello, ".into()),
            Part::Inline { mime_type: "audio/L16".into(), data: vec![1, 2] },
            Part::Text("world".into()),
        ]);
        assert_eq!(response.text(), "Hello, world");
    }

    #[test]
    fn test_inline_bytes_keep_order_and_duplicates() {
        let response = GenerationResponse::new(vec![
            Part::Inline { mime_type: "audio/L16".into(), data: vec![9, 9] },
            Part::Text("ignored".into()),
            Part::Inline { mime_type: "audio/L16".into(), data: vec![1] },
            Part::Inline { mime_type: "audio/L16".into(), data: vec![9, 9] },
        ]);
        assert_eq!(response.inline_bytes(), vec![9, 9, 1, 9, 9]);
    }

    #[test]
    fn test_request_builders() {
        let req = GenerationRequest::text("m", "p").with_system_instruction("s");
        assert_eq!(req.modality, Modality::Text);
        assert_eq!(req.system_instruction.as_deref(), Some("s"));
        assert!(req.speech.is_none());

        let speech = SpeechOptions { language: "en".into(), voice: "Iapetus".into() };
        let req = GenerationRequest::audio("tts", "say", speech.clone());
        assert_eq!(req.modality, Modality::Audio);
        assert_eq!(req.speech, Some(speech));
    }
}
