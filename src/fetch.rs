//! Article page fetching
//!
//! A plain HTTP GET. Anything other than a success status aborts the run.

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Source of raw article markup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

fn user_agent() -> String {
    format!("article-narrator/{}", crate::VERSION)
}

/// HTTP implementation of [`PageFetcher`]
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// No request timeout beyond the transport's own
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let fail = |reason: String| PipelineError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("unexpected status code: {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fail(format!("failed to read response body: {}", e)))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        info!(
            url = %url,
            status = %status.as_u16(),
            size = body.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Fetched article page"
        );
        Ok(body)
    }
}
