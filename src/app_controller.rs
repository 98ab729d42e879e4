use anyhow::Context;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{Config, ExampleSourceKind};
use crate::audio::{AudioCache, AudioService, GoogleTtsSynthesizer};
use crate::enrichment::{
    parse_input, AttributeResolver, CancelToken, EnrichmentPipeline, ProgressReporter, RunOutcome, RunReport, Stage,
};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::package::AnkiTextAssembler;
use crate::sources::{
    AttributeKind, DictionaryApiSource, GoogleTranslateSource, ReversoSource, SourceAdapter, SourceClient,
    TatoebaSource,
};
use crate::store::{listing, CardStore, Stores};

// @module: Application controller wiring config, sources, stores and the pipeline

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the pipeline with live network sources
    pub fn build_pipeline(&self) -> anyhow::Result<EnrichmentPipeline> {
        let config = &self.config;
        let storage = config.storage.expanded();
        let client = SourceClient::new(&config.sources)?;
        let timeout = config.sources.timeout();

        let translator: Arc<dyn SourceAdapter> = Arc::new(
            GoogleTranslateSource::new(client.clone(), &config.source_language, &config.target_language)
                .with_timeout(timeout),
        );

        let mut example_sources: Vec<Arc<dyn SourceAdapter>> = Vec::new();
        for kind in &config.sources.example_sources {
            let adapter: Arc<dyn SourceAdapter> = match kind {
                ExampleSourceKind::DictionaryApi => Arc::new(
                    DictionaryApiSource::new(client.clone(), &config.source_language).with_timeout(timeout),
                ),
                ExampleSourceKind::Tatoeba => Arc::new(
                    TatoebaSource::new(client.clone(), &config.source_language, &config.target_language)?
                        .with_timeout(timeout),
                ),
                ExampleSourceKind::Reverso => Arc::new(
                    ReversoSource::new(
                        client.clone(),
                        &config.source_language,
                        &config.target_language,
                        config.sources.user_agent.clone(),
                    )?
                    .with_timeout(timeout),
                ),
            };
            example_sources.push(adapter);
        }
        if example_sources.is_empty() {
            warn!("No example sources configured, every example will use the fallback sentence");
        }

        let cache = AudioCache::new(&storage.audio_dir);
        let audio = if config.audio.enabled {
            AudioService::new(
                cache,
                Arc::new(GoogleTtsSynthesizer::new(client)),
                config.audio_language(),
                config.audio.timeout(),
            )
        } else {
            AudioService::disabled(cache)
        };

        let translations = AttributeResolver::new(AttributeKind::Translation, vec![translator]);
        let examples = AttributeResolver::new(AttributeKind::Example, example_sources);
        info!("Example sources in priority order: {}", examples.source_names().join(", "));

        Ok(EnrichmentPipeline::new(
            translations,
            examples,
            audio,
            config.concurrency.clone(),
            storage.deck_name,
        ))
    }

    /// Enrich one raw batch and assemble the package
    pub async fn run(&self, raw_input: &str, cancel: &CancelToken) -> Result<RunReport, AppError> {
        let start_time = Instant::now();
        let storage = self.config.storage.expanded();
        FileManager::ensure_dir(&storage.audio_dir)?;

        let words = parse_input(raw_input);
        let mut stores = Stores::load(&storage.words_db, &storage.cards_db);
        let assembler = AnkiTextAssembler::new(&storage.output);
        let pipeline = self
            .build_pipeline()?
            .with_progress(Arc::new(BarProgress::new()));

        let report = pipeline.run(words, &mut stores, &assembler, cancel).await?;

        if !report.fallbacks.is_empty() {
            warn!("{} attribute(s) fell back to the default value", report.fallbacks.len());
        }
        if report.audio_failures > 0 {
            warn!("{} word(s) have no audio", report.audio_failures);
        }
        match &report.outcome {
            RunOutcome::Packaged { path } => {
                info!("Package with {} card(s) written to {:?}", report.build_set.len(), path)
            }
            RunOutcome::NothingToPackage => info!("No words stored yet, nothing to package"),
            RunOutcome::InterruptedAfterPersist => info!("Stopped before packaging; progress is saved"),
        }
        info!("Finished in {:?}", start_time.elapsed());

        Ok(report)
    }

    /// Render the card store as a table
    pub fn list_cards(&self) -> anyhow::Result<String> {
        let storage = self.config.storage.expanded();
        let cards = CardStore::load(&storage.cards_db);
        Ok(listing::render_card_table(&cards))
    }
}

/// Terminal progress bars, one per fetch stage
pub struct BarProgress {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current: Mutex::new(None),
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn stage_started(&self, stage: Stage, total: usize) {
        let bar = self.multi.add(ProgressBar::new(total as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        bar.set_message(stage.label());
        *self.current.lock() = Some(bar);
    }

    fn word_completed(&self, _stage: Stage, done: usize, _total: usize) {
        if let Some(bar) = self.current.lock().as_ref() {
            bar.set_position(done as u64);
        }
    }

    fn stage_finished(&self, _stage: Stage) {
        if let Some(bar) = self.current.lock().take() {
            bar.finish_and_clear();
        }
    }
}
