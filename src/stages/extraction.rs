//! Extraction stage ("eyes")
//!
//! Hands the raw page markup to the generation service and asks for the article body
//! only. The service answers in markdown; images and link targets are stripped here so
//! the narration never reads out URLs.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::error::Result;
use crate::generation::{GenerationRequest, GenerationService};
use super::Stage;

pub const STAGE: Stage = Stage::Extraction;

/// Image reference, plus an optional italic caption on the following line
static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)(\n_([^_]*)_)?").expect("valid image regex"));

/// Inline link; the label is captured
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid link regex"));

/// Prompt that wraps the page markup
pub fn extraction_prompt(markup: &str) -> String {
    format!(
        r#"Extract the main text content from this HTML.
Return ONLY the article text without any HTML tags, navigation elements, ads or other non-content elements.
Format the output as markdown text.

HTML content:
{}"#,
        markup
    )
}

/// Remove image references (and their captions), then collapse links to their labels.
///
/// Images go first: a caption may itself contain link syntax.
pub fn clean_markdown(text: &str) -> String {
    let without_images = IMAGE_RE.replace_all(text, "");
    LINK_RE.replace_all(&without_images, "${1}").into_owned()
}

/// Turn page markup into clean prose
pub async fn extract(service: &dyn GenerationService, model: &str, markup: &str) -> Result<String> {
    info!(markup_bytes = markup.len(), "Trying to read the page");

    let request = GenerationRequest::text(model, extraction_prompt(markup));
    let response = service.generate(STAGE, request).await?;
    let text = clean_markdown(&response.text());

    info!(chars = text.len(), "Extracted article text");
    Ok(text)
}
