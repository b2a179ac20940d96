//! Belief profile derivation
//!
//! Builds a profile for the augmentation stage from an interview transcript: the
//! service lists the speakers' beliefs, values, and opinions with supporting quotes.

use tracing::info;

use crate::error::Result;
use crate::generation::{GenerationRequest, GenerationService};
use super::Stage;

pub const STAGE: Stage = Stage::Profile;

pub fn profile_prompt(transcript: &str) -> String {
    format!(
        r#"Please analyze the following interview transcript and extract the beliefs, values, and opinions expressed by the speakers.
Organize your response into three sections:
1. Beliefs: What factual claims or worldviews are expressed?
2. Values: What principles, ideals, or priorities are emphasized?
3. Opinions: What subjective judgments or preferences are shared?

For each item, include a brief quote or reference to the specific part of the transcript.

Transcript:
{}"#,
        transcript
    )
}

/// Derive a belief profile document from a transcript
pub async fn derive_profile(
    service: &dyn GenerationService,
    model: &str,
    transcript: &str,
) -> Result<String> {
    info!(chars = transcript.len(), "Analyzing transcript for beliefs, values, and opinions");
    let response = service
        .generate(STAGE, GenerationRequest::text(model, profile_prompt(transcript)))
        .await?;
    Ok(response.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationResponse, MockGenerationService, Part};

    #[tokio::test]
    async fn test_derive_profile() {
        let mut service = MockGenerationService::new();
        service
            .expect_generate()
            .withf(|stage, req| {
                *stage == STAGE
                    && req.system_instruction.is_none()
                    && req.prompt.ends_with("Transcript:\nQ: Why? A: Because.")
            })
            .times(1)
            .returning(|_, _| {
                Ok(GenerationResponse::new(vec![Part::Text("1. Beliefs: causality".into())]))
            });

        let profile = derive_profile(&service, "model", "Q: Why? A: Because.").await.unwrap();
        assert_eq!(profile, "1. Beliefs: causality");
    }
}
