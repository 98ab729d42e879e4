/*!
 * Persistent mapping from word to its resolved card attributes.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::enrichment::word::Word;
use crate::errors::StoreError;
use crate::file_utils::FileManager;

/// Resolved attribute bundle for one word
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub example: String,

    /// File name inside the audio cache, empty when no audio was produced
    #[serde(default)]
    pub audio_file: String,
}

/// Word -> card mapping, the single source of truth across runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardStore {
    cards: BTreeMap<Word, CardEntry>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store; a missing or malformed file yields an empty store
    ///
    /// Individual malformed entries are skipped. When several keys normalize to
    /// the same word, an already-normalized key wins, otherwise the first key in
    /// sorted order.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            debug!("No card store at {:?}, starting empty", path);
            return Self::new();
        }

        let content = match FileManager::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read card store, starting empty: {}", e);
                return Self::new();
            }
        };

        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Card store {:?} is malformed, starting empty: {}", path, e);
                return Self::new();
            }
        };

        let mut store = Self::new();
        for (key, value) in raw {
            let Some(word) = Word::normalize(&key) else {
                continue;
            };
            let entry = match serde_json::from_value::<CardEntry>(value) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping malformed card for '{}': {}", key, e);
                    continue;
                }
            };

            if word.as_str() == key || !store.cards.contains_key(&word) {
                store.cards.insert(word, entry);
            } else {
                debug!("Duplicate card key '{}' ignored", key);
            }
        }

        debug!("Loaded {} cards from {:?}", store.len(), path);
        store
    }

    /// Persist as a pretty JSON object keyed by word
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.cards)?;
        FileManager::write_atomic(path, json.as_bytes()).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: format!("{:#}", e),
        })
    }

    pub fn get(&self, word: &Word) -> Option<&CardEntry> {
        self.cards.get(word)
    }

    pub fn contains(&self, word: &Word) -> bool {
        self.cards.contains_key(word)
    }

    /// Insert or overwrite, returning the previous entry
    pub fn upsert(&mut self, word: Word, entry: CardEntry) -> Option<CardEntry> {
        self.cards.insert(word, entry)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Word, &CardEntry)> {
        self.cards.iter()
    }

    /// Words from `words` that have no card yet, in the given order
    pub fn missing(&self, words: &[Word]) -> Vec<Word> {
        words.iter().filter(|w| !self.contains(w)).cloned().collect()
    }
}
