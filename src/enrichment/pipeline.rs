/*!
 * Run orchestration: dedup, plan, fetch stages, merge, persist, assemble.
 *
 * The orchestrator is the only code that mutates the stores. Fetch stages hand
 * back per-word values which are merged once every stage has drained.
 */

use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::cancel::CancelToken;
use super::progress::{ProgressReporter, SilentProgress};
use super::resolver::{fallback_value, AttributeResolver, Resolution};
use super::stage::{run_stage, Stage};
use super::word::Word;
use crate::app_config::ConcurrencyConfig;
use crate::audio::{AudioOutcome, AudioService};
use crate::errors::PipelineError;
use crate::package::{PackageAssembler, PackageInput};
use crate::sources::AttributeKind;
use crate::store::{CardEntry, Stores, WordStore};

/// Position of a run in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Dedup,
    FetchTranslations,
    FetchExamples,
    FetchAudio,
    Merge,
    Persisted,
    BuildSetReady,
    Assembling,
    Done,
    Cancelled,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Dedup => "dedup",
            Self::FetchTranslations => "fetch-translations",
            Self::FetchExamples => "fetch-examples",
            Self::FetchAudio => "fetch-audio",
            Self::Merge => "merge",
            Self::Persisted => "persisted",
            Self::BuildSetReady => "build-set-ready",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// States a run has passed through, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTrail {
    states: Vec<PipelineState>,
}

impl StateTrail {
    fn new() -> Self {
        Self { states: vec![PipelineState::Idle] }
    }

    fn enter(&mut self, state: PipelineState) {
        debug!("Pipeline state: {} -> {}", self.current(), state);
        self.states.push(state);
    }

    pub fn current(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }

    pub fn contains(&self, state: PipelineState) -> bool {
        self.states.contains(&state)
    }

    pub fn as_slice(&self) -> &[PipelineState] {
        &self.states
    }
}

/// What a run is going to do, decided right after dedup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPlan {
    /// New words to fetch, in input order
    Enrich { new_words: Vec<Word> },
    /// Nothing new and no package on disk: assemble from the stores
    Rebuild,
    /// Nothing new but a package exists: reassemble it from the stores
    Refresh,
}

impl RunPlan {
    pub fn choose(new_words: Vec<Word>, package_exists: bool) -> Self {
        if !new_words.is_empty() {
            Self::Enrich { new_words }
        } else if package_exists {
            Self::Refresh
        } else {
            Self::Rebuild
        }
    }

    pub fn new_words(&self) -> &[Word] {
        match self {
            Self::Enrich { new_words } => new_words,
            Self::Rebuild | Self::Refresh => &[],
        }
    }
}

impl fmt::Display for RunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enrich { new_words } => write!(f, "enrich {} new word(s)", new_words.len()),
            Self::Rebuild => write!(f, "rebuild package from stores"),
            Self::Refresh => write!(f, "refresh existing package"),
        }
    }
}

/// Words from `input` not yet in the store, first occurrence kept, order preserved
pub fn compute_new_words(input: &[Word], store: &WordStore) -> Vec<Word> {
    let mut seen = HashSet::new();
    input
        .iter()
        .filter(|word| !store.contains(word))
        .filter(|word| seen.insert(word.as_str()))
        .cloned()
        .collect()
}

/// A word whose attribute came from the fallback instead of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackUse {
    pub word: Word,
    pub kind: AttributeKind,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Packaged { path: PathBuf },
    /// The build set had no cards to package
    NothingToPackage,
    /// Cancelled after the stores were saved; no package written
    InterruptedAfterPersist,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub plan: RunPlan,
    pub build_set: Vec<Word>,
    /// Stored words that had no card and were resolved during this run
    pub lazily_resolved: Vec<Word>,
    /// Stored cards whose audio was missing from the cache and was synthesized again
    pub audio_backfilled: Vec<Word>,
    pub fallbacks: Vec<FallbackUse>,
    pub audio_failures: usize,
    pub outcome: RunOutcome,
    pub states: StateTrail,
}

impl RunReport {
    pub fn new_words(&self) -> &[Word] {
        self.plan.new_words()
    }

    pub fn package_path(&self) -> Option<&PathBuf> {
        match &self.outcome {
            RunOutcome::Packaged { path } => Some(path),
            _ => None,
        }
    }

    /// One-line result for the user
    pub fn summary(&self) -> String {
        match &self.outcome {
            RunOutcome::Packaged { path } => {
                format!("Done. {} card(s) written to {}.", self.build_set.len(), path.display())
            }
            RunOutcome::NothingToPackage => "No cards to package yet. Add some words first.".to_string(),
            RunOutcome::InterruptedAfterPersist => {
                "Interrupted. Fetched cards are saved; run again to build the package.".to_string()
            }
        }
    }
}

/// Per-word stage results before merge
struct Fetched {
    translations: BTreeMap<Word, Resolution>,
    examples: BTreeMap<Word, Resolution>,
    audio: BTreeMap<Word, AudioOutcome>,
}

/// Turns a batch of raw words into stored cards and a package
pub struct EnrichmentPipeline {
    translator: AttributeResolver,
    examples: AttributeResolver,
    audio: AudioService,
    concurrency: ConcurrencyConfig,
    deck_name: String,
    progress: Arc<dyn ProgressReporter>,
}

impl EnrichmentPipeline {
    pub fn new(
        translator: AttributeResolver,
        examples: AttributeResolver,
        audio: AudioService,
        concurrency: ConcurrencyConfig,
        deck_name: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            examples,
            audio,
            concurrency,
            deck_name: deck_name.into(),
            progress: Arc::new(SilentProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Run one batch end to end
    ///
    /// A cancellation seen before the stores are saved returns
    /// `PipelineError::Cancelled` and leaves both store files untouched.
    pub async fn run(
        &self,
        input: Vec<Word>,
        stores: &mut Stores,
        assembler: &dyn PackageAssembler,
        cancel: &CancelToken,
    ) -> Result<RunReport, PipelineError> {
        let mut trail = StateTrail::new();
        let mut fallbacks = Vec::new();
        let mut audio_failures = 0;

        trail.enter(PipelineState::Dedup);
        let new_words = compute_new_words(&input, &stores.words);
        let plan = RunPlan::choose(new_words, assembler.output_exists());
        info!("Run plan: {} ({} word(s) submitted)", plan, input.len());

        if let RunPlan::Enrich { new_words } = &plan {
            let fetched = match self.fetch(new_words, cancel, &mut trail).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    trail.enter(PipelineState::Cancelled);
                    return Err(e);
                }
            };

            trail.enter(PipelineState::Merge);
            let merged = merge(new_words, fetched, &mut fallbacks, &mut audio_failures);

            if cancel.is_cancelled() {
                trail.enter(PipelineState::Cancelled);
                return Err(PipelineError::Cancelled { stage: PipelineState::Merge.to_string() });
            }

            for (word, card) in merged {
                stores.cards.upsert(word.clone(), card);
                stores.words.insert(word);
            }
            stores.save_all()?;
            trail.enter(PipelineState::Persisted);
            info!("Saved {} word(s) and {} card(s)", stores.words.len(), stores.cards.len());
        }

        let build_set = stores.words.sorted();
        let lazily_resolved = self
            .resolve_missing(&build_set, stores, cancel, &mut fallbacks, &mut audio_failures)
            .await;
        let audio_backfilled = self
            .backfill_audio(&build_set, plan.new_words(), &lazily_resolved, stores, cancel, &mut audio_failures)
            .await;
        if !lazily_resolved.is_empty() || !audio_backfilled.is_empty() {
            stores.save_cards()?;
        }
        trail.enter(PipelineState::BuildSetReady);

        let outcome = if cancel.is_cancelled() {
            info!("Interrupted after saving; package not assembled");
            RunOutcome::InterruptedAfterPersist
        } else {
            let package = PackageInput::from_stores(&self.deck_name, &build_set, &stores.cards, self.audio.cache());
            if package.is_empty() {
                info!("Build set is empty, no package written");
                RunOutcome::NothingToPackage
            } else {
                trail.enter(PipelineState::Assembling);
                let path = assembler.assemble(&package)?;
                RunOutcome::Packaged { path }
            }
        };
        trail.enter(PipelineState::Done);

        Ok(RunReport {
            plan,
            build_set,
            lazily_resolved,
            audio_backfilled,
            fallbacks,
            audio_failures,
            outcome,
            states: trail,
        })
    }

    /// The three fetch stages, strictly in sequence
    async fn fetch(&self, words: &[Word], cancel: &CancelToken, trail: &mut StateTrail) -> Result<Fetched, PipelineError> {
        let progress = self.progress.as_ref();

        trail.enter(PipelineState::FetchTranslations);
        let translations = run_stage(Stage::Translations, words, self.concurrency.translation, cancel, progress, |word| async move {
            self.translator.resolve(&word).await
        })
        .await?;

        trail.enter(PipelineState::FetchExamples);
        let examples = run_stage(Stage::Examples, words, self.concurrency.example, cancel, progress, |word| async move {
            self.examples.resolve(&word).await
        })
        .await?;

        trail.enter(PipelineState::FetchAudio);
        let audio = run_stage(Stage::Audio, words, self.concurrency.audio, cancel, progress, |word| async move {
            self.audio.ensure(&word).await
        })
        .await?;

        Ok(Fetched { translations, examples, audio })
    }

    /// Resolve stored words that have no card, one at a time
    ///
    /// Stops at a cancellation; cards resolved before it stay in the store.
    async fn resolve_missing(
        &self,
        build_set: &[Word],
        stores: &mut Stores,
        cancel: &CancelToken,
        fallbacks: &mut Vec<FallbackUse>,
        audio_failures: &mut usize,
    ) -> Vec<Word> {
        let missing = stores.cards.missing(build_set);
        if missing.is_empty() {
            return Vec::new();
        }
        info!("Resolving {} stored word(s) without a card", missing.len());

        let mut resolved = Vec::with_capacity(missing.len());
        for word in missing {
            let attributes = async {
                let translation = self.translator.resolve(&word).await;
                let example = self.examples.resolve(&word).await;
                let audio = self.audio.ensure(&word).await;
                (translation, example, audio)
            };
            let (translation, example, audio) = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                attributes = attributes => attributes,
            };

            let card = card_from(&word, Some(translation), Some(example), Some(audio), fallbacks, audio_failures);
            stores.cards.upsert(word.clone(), card);
            resolved.push(word);
        }
        resolved
    }

    /// Retry audio for stored cards whose file is not in the cache
    ///
    /// Words fetched or resolved earlier in this run are skipped; their audio
    /// was just attempted. Only successful syntheses change a card.
    async fn backfill_audio(
        &self,
        build_set: &[Word],
        fetched: &[Word],
        resolved: &[Word],
        stores: &mut Stores,
        cancel: &CancelToken,
        audio_failures: &mut usize,
    ) -> Vec<Word> {
        if !self.audio.is_enabled() || cancel.is_cancelled() {
            return Vec::new();
        }

        let cache = self.audio.cache();
        let silent: Vec<Word> = build_set
            .iter()
            .filter(|word| !fetched.contains(word) && !resolved.contains(word))
            .filter(|word| {
                stores
                    .cards
                    .get(word)
                    .is_some_and(|card| cache.existing_file(&card.audio_file).is_none())
            })
            .cloned()
            .collect();
        if silent.is_empty() {
            return Vec::new();
        }
        info!("Retrying audio for {} stored card(s)", silent.len());

        let mut backfilled = Vec::new();
        for word in silent {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.audio.ensure(&word) => outcome,
            };
            if outcome.is_failure() {
                *audio_failures += 1;
                continue;
            }

            let Some(mut card) = stores.cards.get(&word).cloned() else {
                continue;
            };
            card.audio_file = outcome.file_name().to_string();
            stores.cards.upsert(word.clone(), card);
            backfilled.push(word);
        }
        backfilled
    }
}

/// Combine stage results into one card per word
fn merge(
    words: &[Word],
    mut fetched: Fetched,
    fallbacks: &mut Vec<FallbackUse>,
    audio_failures: &mut usize,
) -> Vec<(Word, CardEntry)> {
    words
        .iter()
        .map(|word| {
            let card = card_from(
                word,
                fetched.translations.remove(word),
                fetched.examples.remove(word),
                fetched.audio.remove(word),
                fallbacks,
                audio_failures,
            );
            (word.clone(), card)
        })
        .collect()
}

fn card_from(
    word: &Word,
    translation: Option<Resolution>,
    example: Option<Resolution>,
    audio: Option<AudioOutcome>,
    fallbacks: &mut Vec<FallbackUse>,
    audio_failures: &mut usize,
) -> CardEntry {
    let mut attribute = |kind: AttributeKind, resolution: Option<Resolution>| match resolution {
        Some(resolution) if !resolution.is_fallback() => resolution.into_value(),
        other => {
            warn!("No {} source answered for '{}', using fallback", kind, word);
            fallbacks.push(FallbackUse { word: word.clone(), kind });
            other.map(Resolution::into_value).unwrap_or_else(|| fallback_value(kind, word))
        }
    };

    let translation = attribute(AttributeKind::Translation, translation);
    let example = attribute(AttributeKind::Example, example);

    let audio_file = match audio {
        Some(outcome) => {
            if outcome.is_failure() {
                *audio_failures += 1;
            }
            outcome.file_name().to_string()
        }
        None => String::new(),
    };

    CardEntry { translation, example, audio_file }
}
