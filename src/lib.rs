//! Article Narrator Library
//!
//! Turns a web article into a narrated WAV file in three generation stages:
//! - extraction ("eyes"): page markup to clean plain text
//! - augmentation ("brain"): commentary woven in from a belief profile
//! - synthesis ("mouth"): spoken audio, wrapped in a WAV container
//!
//! Every stage output is cached on disk under an identifier derived from the URL, so an
//! interrupted run resumes where it stopped.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use article_narrator::{Config, GeminiClient, HttpFetcher, Pipeline};
//! use article_narrator::generation::GeminiConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let service = Arc::new(GeminiClient::new(GeminiConfig::new("KEY"))?);
//!     let fetcher = Arc::new(HttpFetcher::new()?);
//!     let report = Pipeline::from_config(&config, service, fetcher)
//!         .run("https://example.com/news/story.html")
//!         .await?;
//!     println!("{}", report.output.display());
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod generation;
pub mod identifier;
pub mod pipeline;
pub mod stages;
pub mod cli;

// Re-export commonly used types for convenience
pub use cache::{StageCache, StageKind};
pub use config::Config;
pub use error::{PipelineError, Result};
pub use fetch::{HttpFetcher, PageFetcher};
pub use generation::{GeminiClient, GenerationRequest, GenerationResponse, GenerationService, Part};
pub use identifier::ArticleId;
pub use pipeline::{Pipeline, PipelineSettings, PipelineState, RunReport, StageOutcome};

/// Crate version, sent in the fetcher's user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
