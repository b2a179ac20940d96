//! Article identifier derivation
//!
//! The identifier is the sole cache key for every stage artifact, so it must be a pure
//! function of the URL.

use std::fmt;

use crate::error::{PipelineError, Result};

/// Filesystem-safe short name derived from an article URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleId(String);

impl ArticleId {
    /// Derive the identifier from the last path segment, minus any file extension.
    pub fn from_url(link: &str) -> Result<Self> {
        let parsed = url::Url::parse(link).map_err(|e| PipelineError::InvalidUrl {
            url: link.to_string(),
            reason: e.to_string(),
        })?;

        // Segments stay percent-encoded: `my%20story` rather than `my story`, and an
        // encoded `%2F` can never become a path separator in the cache file name.
        let segment = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default();

        let stem = strip_extension(segment);
        if stem.is_empty() || stem == "." || stem == ".." {
            return Err(PipelineError::InvalidUrl {
                url: link.to_string(),
                reason: "URL path has no usable final segment".to_string(),
            });
        }

        Ok(Self(stem.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remove the text from the final '.' onwards. A leading dot is a hidden name, not an
/// extension.
fn strip_extension(segment: &str) -> &str {
    match segment.rfind('.') {
        Some(pos) if pos > 0 => &segment[..pos],
        _ => segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_html_extension() {
        let id = ArticleId::from_url("https://site/x/article-name.html").unwrap();
        assert_eq!(id.as_str(), "article-name");
    }

    #[test]
    fn test_without_extension() {
        let id = ArticleId::from_url("https://site/x/article-name").unwrap();
        assert_eq!(id.as_str(), "article-name");
    }

    #[test]
    fn test_only_last_extension_removed() {
        let id = ArticleId::from_url("https://site/2024/report.v2.html?ref=rss").unwrap();
        assert_eq!(id.as_str(), "report.v2");
    }

    #[test]
    fn test_trailing_slash_uses_last_named_segment() {
        let id = ArticleId::from_url("https://site/blog/post-title/").unwrap();
        assert_eq!(id.as_str(), "post-title");
    }

    #[test]
    fn test_percent_encoding_preserved() {
        let id = ArticleId::from_url("https://site/x/my%20story.html").unwrap();
        assert_eq!(id.as_str(), "my%20story");

        let id = ArticleId::from_url("https://site/x/a%2Fb.html").unwrap();
        assert_eq!(id.as_str(), "a%2Fb");
        assert!(!id.as_str().contains('/'));
    }

    #[test]
    fn test_deterministic() {
        let link = "https://news.example.com/world/some-story.php";
        assert_eq!(
            ArticleId::from_url(link).unwrap(),
            ArticleId::from_url(link).unwrap()
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = ArticleId::from_url("not a url").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidUrl { .. }));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = ArticleId::from_url("https://site/").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidUrl { .. }));
    }
}
