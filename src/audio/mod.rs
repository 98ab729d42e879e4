/*!
 * Pronunciation audio: on-disk cache plus a pluggable speech synthesizer.
 *
 * The synthesizer itself is an external collaborator; this module only
 * decides whether synthesis is needed, bounds it with a timeout and stores
 * the result under a file name derived from the word.
 */

use async_trait::async_trait;
use bytes::Bytes;
use futures::FutureExt;
use log::{debug, warn};
use std::fmt::Debug;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::enrichment::word::Word;
use crate::errors::SourceError;
use crate::file_utils::FileManager;

pub mod google_tts;
pub mod mock;

pub use google_tts::GoogleTtsSynthesizer;

/// Text-to-speech backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Synthesize `text` spoken in `language`, returning encoded audio
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, SourceError>;
}

/// Directory of synthesized audio, one file per word
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file name for a word; path separators and reserved characters
    /// become `-`
    pub fn file_name_for(word: &Word) -> String {
        let safe: String = word
            .as_str()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                c if c.is_control() => '-',
                c => c,
            })
            .collect();
        format!("{}.mp3", safe)
    }

    pub fn path_for(&self, word: &Word) -> PathBuf {
        self.dir.join(Self::file_name_for(word))
    }

    pub fn contains(&self, word: &Word) -> bool {
        FileManager::file_exists(self.path_for(word))
    }

    /// Path of a cached file by name, if it exists
    pub fn existing_file(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.is_empty() {
            return None;
        }
        let path = self.dir.join(file_name);
        FileManager::file_exists(&path).then_some(path)
    }

    pub fn store(&self, word: &Word, audio: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.path_for(word);
        FileManager::write_atomic(&path, audio)?;
        Ok(path)
    }
}

/// Result of ensuring audio for one word
#[derive(Debug, Clone, PartialEq)]
pub enum AudioOutcome {
    /// Already in the cache, nothing synthesized
    Cached { file_name: String },
    Synthesized { file_name: String },
    /// Synthesis or storage failed; the expected file name is still reported
    Failed { file_name: String, reason: String },
    /// Audio is turned off
    Disabled,
}

impl AudioOutcome {
    /// Value recorded in the card's `audio_file` field
    pub fn file_name(&self) -> &str {
        match self {
            Self::Cached { file_name }
            | Self::Synthesized { file_name }
            | Self::Failed { file_name, .. } => file_name,
            Self::Disabled => "",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Cache-first audio provider used by the audio stage
#[derive(Debug, Clone)]
pub struct AudioService {
    cache: AudioCache,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    language: String,
    timeout: Duration,
}

impl AudioService {
    pub fn new(
        cache: AudioCache,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            cache,
            synthesizer: Some(synthesizer),
            language: language.into(),
            timeout,
        }
    }

    /// Service that never synthesizes; cached files are still reused
    pub fn disabled(cache: AudioCache) -> Self {
        Self {
            cache,
            synthesizer: None,
            language: String::new(),
            timeout: Duration::ZERO,
        }
    }

    pub fn cache(&self) -> &AudioCache {
        &self.cache
    }

    /// Whether a synthesizer is configured
    pub fn is_enabled(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Make sure an audio file exists for the word. Never fails.
    pub async fn ensure(&self, word: &Word) -> AudioOutcome {
        let file_name = AudioCache::file_name_for(word);
        if self.cache.contains(word) {
            debug!("Audio cache hit for '{}'", word);
            return AudioOutcome::Cached { file_name };
        }

        let Some(synthesizer) = &self.synthesizer else {
            return AudioOutcome::Disabled;
        };

        let call = AssertUnwindSafe(synthesizer.synthesize(word.as_str(), &self.language)).catch_unwind();
        let reason = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(audio))) if !audio.is_empty() => match self.cache.store(word, &audio) {
                Ok(_) => return AudioOutcome::Synthesized { file_name },
                Err(e) => format!("could not store audio: {:#}", e),
            },
            Ok(Ok(Ok(_))) => "synthesizer returned no audio".to_string(),
            Ok(Ok(Err(e))) => e.to_string(),
            Ok(Err(_panic)) => format!("{} panicked", synthesizer.name()),
            Err(_) => format!("timed out after {:?}", self.timeout),
        };

        warn!("Audio for '{}' unavailable: {}", word, reason);
        AudioOutcome::Failed { file_name, reason }
    }
}
