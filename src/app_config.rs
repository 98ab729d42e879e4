use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the input words (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language of the translations (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Where stores, audio and the package live
    #[serde(default)]
    pub storage: StorageConfig,

    /// External data source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Worker caps per fetch stage
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    /// Pronunciation audio settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Example sentence source identifier
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExampleSourceKind {
    // @source: Structured dictionary API with curated examples
    DictionaryApi,
    // @source: Community sentence-pair corpus
    Tatoeba,
    // @source: Bilingual concordance search
    Reverso,
}

impl ExampleSourceKind {
    // @returns: Lowercase source identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DictionaryApi => "dictionaryapi".to_string(),
            Self::Tatoeba => "tatoeba".to_string(),
            Self::Reverso => "reverso".to_string(),
        }
    }
}

impl std::fmt::Display for ExampleSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ExampleSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dictionaryapi" => Ok(Self::DictionaryApi),
            "tatoeba" => Ok(Self::Tatoeba),
            "reverso" => Ok(Self::Reverso),
            _ => Err(anyhow!("Invalid example source: {}", s)),
        }
    }
}

/// File locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Set of already processed words
    #[serde(default = "default_words_db")]
    pub words_db: PathBuf,

    /// Per-word resolved attributes
    #[serde(default = "default_cards_db")]
    pub cards_db: PathBuf,

    /// Synthesized audio cache directory
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// Package output path
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Deck name written into the package
    #[serde(default = "default_deck_name")]
    pub deck_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            words_db: default_words_db(),
            cards_db: default_cards_db(),
            audio_dir: default_audio_dir(),
            output: default_output(),
            deck_name: default_deck_name(),
        }
    }
}

impl StorageConfig {
    /// Expand a leading `~` in every configured path
    pub fn expanded(&self) -> Self {
        Self {
            words_db: FileManager::expand_home(&self.words_db),
            cards_db: FileManager::expand_home(&self.cards_db),
            audio_dir: FileManager::expand_home(&self.audio_dir),
            output: FileManager::expand_home(&self.output),
            deck_name: self.deck_name.clone(),
        }
    }
}

/// Settings shared by every network source
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_source_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Idle connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// User agent for the concordance site, which rejects bare clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Example sources in priority order
    #[serde(default = "default_example_sources")]
    pub example_sources: Vec<ExampleSourceKind>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_source_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: default_user_agent(),
            example_sources: default_example_sources(),
        }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Maximum concurrent workers for each fetch stage
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConcurrencyConfig {
    #[serde(default = "default_translation_workers")]
    pub translation: usize,

    #[serde(default = "default_example_workers")]
    pub example: usize,

    /// Kept lower than the others since synthesis is heavier
    #[serde(default = "default_audio_workers")]
    pub audio: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            translation: default_translation_workers(),
            example: default_example_workers(),
            audio: default_audio_workers(),
        }
    }
}

/// Pronunciation audio settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AudioConfig {
    /// Whether to synthesize audio at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Synthesis timeout in seconds
    #[serde(default = "default_audio_timeout_secs")]
    pub timeout_secs: u64,

    /// Voice language, defaults to the source language
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_audio_timeout_secs(),
            language: None,
        }
    }
}

impl AudioConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_words_db() -> PathBuf {
    PathBuf::from("words_db.json")
}

fn default_cards_db() -> PathBuf {
    PathBuf::from("cards_db.json")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio")
}

fn default_output() -> PathBuf {
    PathBuf::from("english_words.txt")
}

fn default_deck_name() -> String {
    "English Vocabulary".to_string()
}

fn default_source_timeout_secs() -> u64 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    300
}

fn default_pool_max_idle_per_host() -> usize {
    20
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}

fn default_example_sources() -> Vec<ExampleSourceKind> {
    vec![
        ExampleSourceKind::DictionaryApi,
        ExampleSourceKind::Tatoeba,
        ExampleSourceKind::Reverso,
    ]
}

fn default_translation_workers() -> usize {
    8
}

fn default_example_workers() -> usize {
    8
}

fn default_audio_workers() -> usize {
    6
}

fn default_audio_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = FileManager::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(path, &config_json)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if let Some(voice) = &self.audio.language {
            let primary = voice.split('-').next().unwrap_or(voice);
            crate::language_utils::get_language_name(primary)?;
        }

        if self.concurrency.translation == 0 || self.concurrency.example == 0 || self.concurrency.audio == 0 {
            return Err(anyhow!("Concurrency caps must be at least 1"));
        }

        if self.sources.timeout_secs == 0 {
            return Err(anyhow!("Source timeout must be at least 1 second"));
        }

        Ok(())
    }

    /// Voice language for synthesis
    pub fn audio_language(&self) -> &str {
        self.audio.language.as_deref().unwrap_or(&self.source_language)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            storage: StorageConfig::default(),
            sources: SourcesConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            audio: AudioConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
