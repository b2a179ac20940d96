//! Configuration management
//!
//! Built once at process start from an optional TOML file plus command-line overrides,
//! then passed by reference into the pipeline. The API key is never written to the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generation::gemini::GEMINI_BASE_URL;
use crate::stages::Voice;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generation service settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Narration voice
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Where artifacts and the belief profile live
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Resolved at startup from the environment or keyring
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for extraction, augmentation, and profile derivation
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model used for speech synthesis
    #[serde(default = "default_speech_model")]
    pub speech_model: String,
    /// Request timeout in seconds. Unset means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    GEMINI_BASE_URL.to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash-preview-05-20".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            text_model: default_text_model(),
            speech_model: default_speech_model(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// Prebuilt voice name (e.g. Iapetus, Fenrir, Orus, Enceladus)
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_tone")]
    pub tone: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_voice() -> String {
    "Iapetus".to_string()
}

fn default_tone() -> String {
    "upbeat".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            voice: default_voice(),
            tone: default_tone(),
        }
    }
}

impl SpeechConfig {
    pub fn voice(&self) -> Voice {
        Voice {
            language: self.language.clone(),
            name: self.voice.clone(),
            tone: self.tone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `{id}.plain.txt`, `{id}.based.txt` and `{id}.wav`
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Belief profile used by the augmentation stage
    #[serde(default = "default_beliefs")]
    pub beliefs: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_beliefs() -> PathBuf {
    PathBuf::from("bvo/bvo.txt")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            beliefs: default_beliefs(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the platform config file is used when
    /// present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = config_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Render as TOML for display
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub(crate) fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "article-narrator", "article-narrator")
        .context("Failed to get project directories")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.speech.voice, "Iapetus");
        assert_eq!(config.speech.language, "en");
        assert_eq!(config.paths.beliefs, PathBuf::from("bvo/bvo.txt"));
        assert_eq!(config.paths.cache_dir, PathBuf::from("."));
        assert!(config.generation.api_key.is_none());
        assert!(config.generation.timeout_secs.is_none());
    }

    #[test]
    fn test_timeout_is_opt_in() {
        let config: Config = toml::from_str("[generation]\ntimeout_secs = 120\n").unwrap();
        assert_eq!(config.generation.timeout_secs, Some(120));
        assert!(!Config::default().to_toml().unwrap().contains("timeout_secs"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[speech]\nvoice = \"Fenrir\"\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.speech.voice, "Fenrir");
        assert_eq!(config.speech.tone, "upbeat");
        assert_eq!(config.generation.speech_model, "gemini-2.5-flash-preview-tts");
    }

    #[test]
    fn test_save_never_writes_api_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = Config::default();
        config.generation.api_key = Some("super-secret".into());

        config.save_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("super-secret"));

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.generation.text_model, config.generation.text_model);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }
}
