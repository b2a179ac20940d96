//! Augmentation stage ("brain")
//!
//! Interleaves the extracted article with commentary in the voice described by a
//! belief profile. Verbatim reproduction of the original is requested in the prompt
//! and not checked afterwards.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::generation::{GenerationRequest, GenerationService};
use super::Stage;

pub const STAGE: Stage = Stage::Augmentation;

/// Beliefs, values, and opinions steering the commentary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeliefProfile {
    source: PathBuf,
    text: String,
}

impl BeliefProfile {
    /// Read the profile from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::storage(path, e))?;
        info!(path = %path.display(), chars = text.len(), "Loaded belief profile");
        Ok(Self {
            source: path.to_path_buf(),
            text,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            source: PathBuf::new(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// System instruction with the profile injected verbatim
pub fn system_instruction(profile: &BeliefProfile) -> String {
    format!(
        r#"You are an AI that adds beliefs, values, and opinions to articles.
Your task is to take the provided article and return it verbatim, but add additional beliefs, values, and opinions
that align with the following core beliefs, values, and opinions:

{}

When responding, first return a piece of the original article text verbatim, then add your beliefs, values, and opinions
that are relevant to that piece of the article's content. The additions should be as close to spoken language as possible.
Avoid repeating the content of the original article when adding the beliefs, values, and opinions.
Do not paraphrase the original article.
Make it clear where the original article ends and your additions begin."#,
        profile.text()
    )
}

pub fn article_prompt(article: &str) -> String {
    format!("Here is the article to process:\n\n{}", article)
}

/// Produce the augmented article
pub async fn augment(
    service: &dyn GenerationService,
    model: &str,
    article: &str,
    profile: &BeliefProfile,
) -> Result<String> {
    info!(article_chars = article.len(), "Prereading article");

    let request = GenerationRequest::text(model, article_prompt(article))
        .with_system_instruction(system_instruction(profile));
    let text = service.generate(STAGE, request).await?.text();

    info!(chars = text.len(), "Augmented article");
    Ok(text)
}
