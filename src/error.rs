//! Error taxonomy for the narration pipeline
//!
//! Every variant is fatal to a run. Nothing is retried; the only recovery path is
//! re-running the same URL, which reuses whatever stage artifacts are already cached.

use std::path::PathBuf;
use thiserror::Error;

use crate::stages::Stage;

/// Errors produced by the pipeline and its stages
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The article link could not be turned into an identifier
    #[error("invalid article URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Fetching the article markup failed (transport error or non-success status)
    #[error("failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// The generation service returned an error
    #[error("generation failed during {stage}: {reason}")]
    GenerationFailed { stage: Stage, reason: String },

    /// Speech synthesis returned no audio bytes at all
    #[error("no audio data found in the synthesis response")]
    NoAudioProduced,

    /// The storage medium backing the cache or output could not be used
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn generation(stage: Stage, reason: impl Into<String>) -> Self {
        PipelineError::GenerationFailed {
            stage,
            reason: reason.into(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;
