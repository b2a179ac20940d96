//! CLI interface for narrate

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{self, Config};
use crate::credentials;
use crate::fetch::HttpFetcher;
use crate::generation::{GeminiClient, GeminiConfig, GenerationService};
use crate::pipeline::{Pipeline, RunReport, StageOutcome};
use crate::stages;

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Turn a web article into a narrated WAV file", long_about = None)]
#[command(version)]
struct Cli {
    /// Article URL to narrate
    url: Option<String>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options layered over the loaded configuration
#[derive(clap::Args, Debug, Default, Clone)]
struct Overrides {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, env = "NARRATE_CONFIG")]
    config: Option<PathBuf>,
    /// Directory for cached artifacts and the output WAV
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    /// Belief profile used by the augmentation stage
    #[arg(long)]
    beliefs: Option<PathBuf>,
    /// Prebuilt voice name
    #[arg(long)]
    voice: Option<String>,
    /// Speech language tag
    #[arg(long)]
    language: Option<String>,
    /// Delivery adjective, e.g. "upbeat" or "calm"
    #[arg(long)]
    tone: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.cache_dir {
            config.paths.cache_dir = dir.clone();
        }
        if let Some(path) = &self.beliefs {
            config.paths.beliefs = path.clone();
        }
        if let Some(voice) = &self.voice {
            config.speech.voice = voice.clone();
        }
        if let Some(language) = &self.language {
            config.speech.language = language.clone();
        }
        if let Some(tone) = &self.tone {
            config.speech.tone = tone.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive a belief profile from an interview transcript
    Profile {
        /// Transcript file
        transcript: PathBuf,
        /// Also write the profile to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Configure narrate
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
        /// Store the Google API key
        #[arg(long)]
        set_api_key: Option<String>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Profile { transcript, output }) => {
            profile(&cli.overrides, &transcript, output.as_deref()).await
        }
        Some(Commands::Config { show, init, set_api_key }) => {
            configure(&cli.overrides, show, init, set_api_key)
        }
        None => match cli.url {
            Some(url) => narrate(&cli.overrides, &url).await,
            None => {
                Cli::command().print_help()?;
                println!();
                Ok(())
            }
        },
    }
}

fn load_config(overrides: &Overrides) -> Result<Config> {
    let mut config = Config::load(overrides.config.as_deref())?;
    overrides.apply(&mut config);
    config.generation.api_key = Some(credentials::get_api_key()?);
    Ok(config)
}

fn build_service(config: &Config) -> Result<Arc<dyn GenerationService>> {
    let api_key = config
        .generation
        .api_key
        .clone()
        .context("API key not resolved")?;
    let gemini = GeminiConfig::new(api_key)
        .with_base_url(config.generation.base_url.clone())
        .with_timeout(config.generation.timeout_secs.map(Duration::from_secs));
    Ok(Arc::new(GeminiClient::new(gemini)?))
}

async fn narrate(overrides: &Overrides, url: &str) -> Result<()> {
    let config = load_config(overrides)?;
    let service = build_service(&config)?;
    let fetcher = Arc::new(HttpFetcher::new()?);

    let pipeline = Pipeline::from_config(&config, service, fetcher);
    let report = pipeline.run(url).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let mark = |outcome: StageOutcome| match outcome {
        StageOutcome::Ran => "done",
        StageOutcome::Cached => "cached",
    };
    println!("Article:      {}", report.id);
    println!("  extraction:   {}", mark(report.extraction));
    println!("  augmentation: {}", mark(report.augmentation));
    println!("  synthesis:    {}", mark(report.synthesis));
    println!("Narration: {}", report.output.display());
}

async fn profile(
    overrides: &Overrides,
    transcript: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let text = std::fs::read_to_string(transcript)
        .with_context(|| format!("Failed to read transcript {}", transcript.display()))?;

    let config = load_config(overrides)?;
    let service = build_service(&config)?;
    let profile =
        stages::derive_profile(service.as_ref(), &config.generation.text_model, &text).await?;

    println!("{}", profile);
    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, &profile)
            .with_context(|| format!("Failed to write profile to {}", path.display()))?;
        eprintln!("Profile saved to {}", path.display());
    }
    Ok(())
}

fn configure(
    overrides: &Overrides,
    show: bool,
    init: bool,
    set_api_key: Option<String>,
) -> Result<()> {
    if let Some(key) = set_api_key {
        credentials::set_api_key(&key)?;
        println!("Google API key stored.");
    } else if init {
        let path = match &overrides.config {
            Some(path) => path.clone(),
            None => config::config_path()?,
        };
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            Config::default().save_to(&path)?;
            println!("Wrote default config to {}", path.display());
        }
    } else if show {
        let mut config = Config::load(overrides.config.as_deref())?;
        overrides.apply(&mut config);
        print!("{}", config.to_toml()?);
    } else {
        println!("Configuration options:");
        println!("  --show               Show current configuration");
        println!("  --init               Write the default configuration file");
        println!("  --set-api-key KEY    Store the Google API key");
        println!();
        println!(
            "The {} environment variable takes precedence over a stored key.",
            credentials::API_KEY_ENV
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_url_with_overrides() {
        let cli = Cli::try_parse_from([
            "narrate",
            "https://example.com/a/story.html",
            "--voice",
            "Kore",
            "--cache-dir",
            "/tmp/out",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("https://example.com/a/story.html"));
        assert!(cli.command.is_none());
        assert_eq!(cli.overrides.voice.as_deref(), Some("Kore"));
        assert_eq!(cli.overrides.cache_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_parse_without_url() {
        let cli = Cli::try_parse_from(["narrate"]).unwrap();
        assert!(cli.url.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_profile_subcommand() {
        let cli =
            Cli::try_parse_from(["narrate", "profile", "talk.txt", "-o", "bvo/bvo.txt"]).unwrap();
        match cli.command {
            Some(Commands::Profile { transcript, output }) => {
                assert_eq!(transcript, PathBuf::from("talk.txt"));
                assert_eq!(output, Some(PathBuf::from("bvo/bvo.txt")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = Overrides {
            beliefs: Some(PathBuf::from("me.txt")),
            language: Some("de".into()),
            tone: Some("calm".into()),
            ..Default::default()
        };
        let mut config = Config::default();
        overrides.apply(&mut config);

        assert_eq!(config.paths.beliefs, PathBuf::from("me.txt"));
        assert_eq!(config.speech.language, "de");
        assert_eq!(config.speech.tone, "calm");
        assert_eq!(config.speech.voice, "Iapetus");
        assert_eq!(config.paths.cache_dir, PathBuf::from("."));
    }
}
