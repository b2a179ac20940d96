//! Synthesis stage ("mouth")
//!
//! Asks for spoken audio instead of text. The service returns raw PCM in one or more
//! inline parts; they are concatenated in response order.

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::generation::{GenerationRequest, GenerationService, SpeechOptions};
use super::Stage;

pub const STAGE: Stage = Stage::Synthesis;

/// Voice and delivery settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub language: String,
    pub name: String,
    /// Adjective prepended to the prompt, e.g. "upbeat"
    pub tone: String,
}

pub fn speech_prompt(tone: &str, text: &str) -> String {
    format!("Say the following text in {} {} tone.\n{}", article_for(tone), tone, text)
}

fn article_for(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Produce raw PCM for the given text
pub async fn synthesize(
    service: &dyn GenerationService,
    model: &str,
    text: &str,
    voice: &Voice,
) -> Result<Vec<u8>> {
    info!(chars = text.len(), voice = %voice.name, "Synthesizing narration");

    let speech = SpeechOptions {
        language: voice.language.clone(),
        voice: voice.name.clone(),
    };
    let request = GenerationRequest::audio(model, speech_prompt(&voice.tone, text), speech);
    let pcm = service.generate(STAGE, request).await?.inline_bytes();

    if pcm.is_empty() {
        return Err(PipelineError::NoAudioProduced);
    }

    info!(bytes = pcm.len(), "Received audio");
    Ok(pcm)
}
