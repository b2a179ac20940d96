//! Pipeline driver
//!
//! Runs the stages strictly in sequence:
//!
//! ```text
//! Start --(plain cached? else fetch + extract + put)--> Extracted
//!       --(based cached? else augment + put)----------> Augmented
//!       --(wav exists? else synthesize + encode + put)-> Synthesized --> Done
//! ```
//!
//! Any error aborts the run. Artifacts written by earlier stages stay on disk and are
//! reused verbatim by the next run of the same URL.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audio::{encode_wav, WavInfo};
use crate::cache::{StageCache, StageKind};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::generation::GenerationService;
use crate::identifier::ArticleId;
use crate::stages::{self, BeliefProfile, Voice};

/// Progress through a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Extracted,
    Augmented,
    Synthesized,
    Done,
}

/// Whether a stage did work or was served from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Ran,
    Cached,
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub id: ArticleId,
    pub extraction: StageOutcome,
    pub augmentation: StageOutcome,
    pub synthesis: StageOutcome,
    pub output: PathBuf,
}

/// Settings the driver needs from the configuration
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub text_model: String,
    pub speech_model: String,
    pub voice: Voice,
    pub beliefs: PathBuf,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            text_model: config.generation.text_model.clone(),
            speech_model: config.generation.speech_model.clone(),
            voice: config.speech.voice(),
            beliefs: config.paths.beliefs.clone(),
        }
    }
}

/// Sequences the stages around the cache
pub struct Pipeline {
    service: Arc<dyn GenerationService>,
    fetcher: Arc<dyn PageFetcher>,
    cache: StageCache,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        service: Arc<dyn GenerationService>,
        fetcher: Arc<dyn PageFetcher>,
        cache: StageCache,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            service,
            fetcher,
            cache,
            settings,
        }
    }

    pub fn from_config(
        config: &Config,
        service: Arc<dyn GenerationService>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self::new(
            service,
            fetcher,
            StageCache::new(&config.paths.cache_dir),
            PipelineSettings::from(config),
        )
    }

    /// Narrate the article at `link`
    pub async fn run(&self, link: &str) -> Result<RunReport> {
        let id = ArticleId::from_url(link)?;
        info!(url = %link, id = %id, "Starting narration");

        let mut state = PipelineState::Start;
        let result = self.run_stages(link, &id, &mut state).await;
        if let Err(e) = &result {
            warn!(id = %id, state = ?state, error = %e, "Narration failed");
        }
        result
    }

    async fn run_stages(
        &self,
        link: &str,
        id: &ArticleId,
        state: &mut PipelineState,
    ) -> Result<RunReport> {
        let (article, extraction) = self.extracted(link, id).await?;
        advance(state, PipelineState::Extracted);

        let (augmented, augmentation) = self.augmented(id, &article).await?;
        advance(state, PipelineState::Augmented);

        let (output, synthesis) = self.synthesized(id, &augmented).await?;
        advance(state, PipelineState::Synthesized);

        advance(state, PipelineState::Done);
        info!(id = %id, output = %output.display(), "Narration ready");

        Ok(RunReport {
            id: id.clone(),
            extraction,
            augmentation,
            synthesis,
            output,
        })
    }

    async fn extracted(&self, link: &str, id: &ArticleId) -> Result<(String, StageOutcome)> {
        if let Some(text) = self.cache.get_text(StageKind::Plain, id)? {
            info!(id = %id, "Using cached article text");
            return Ok((text, StageOutcome::Cached));
        }

        info!(url = %link, "Navigating the web");
        let markup = self.fetcher.fetch(link).await?;
        let text =
            stages::extract(self.service.as_ref(), &self.settings.text_model, &markup).await?;
        self.cache.put(StageKind::Plain, id, text.as_bytes())?;
        Ok((text, StageOutcome::Ran))
    }

    async fn augmented(&self, id: &ArticleId, article: &str) -> Result<(String, StageOutcome)> {
        if let Some(text) = self.cache.get_text(StageKind::Augmented, id)? {
            info!(id = %id, "Using cached augmented text");
            return Ok((text, StageOutcome::Cached));
        }

        let profile = BeliefProfile::load(&self.settings.beliefs)?;
        let text = stages::augment(
            self.service.as_ref(),
            &self.settings.text_model,
            article,
            &profile,
        )
        .await?;
        self.cache.put(StageKind::Augmented, id, text.as_bytes())?;
        Ok((text, StageOutcome::Ran))
    }

    async fn synthesized(&self, id: &ArticleId, text: &str) -> Result<(PathBuf, StageOutcome)> {
        let path = self.cache.path_for(StageKind::Audio, id);
        if self.cache.contains(StageKind::Audio, id)? {
            match WavInfo::read(&path) {
                Ok(info) => info!(
                    path = %path.display(),
                    duration_secs = %format!("{:.1}", info.duration_secs()),
                    "Narration already exists"
                ),
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "Existing narration is not a readable WAV; keeping it"
                ),
            }
            return Ok((path, StageOutcome::Cached));
        }

        let pcm = stages::synthesize(
            self.service.as_ref(),
            &self.settings.speech_model,
            text,
            &self.settings.voice,
        )
        .await?;
        let wav = encode_wav(&pcm);
        let path = self.cache.put(StageKind::Audio, id, &wav)?;
        Ok((path, StageOutcome::Ran))
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug!(from = ?*state, to = ?next, "Pipeline transition");
    *state = next;
}
