/*!
 * Persistent set of processed words.
 */

use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::enrichment::word::Word;
use crate::errors::StoreError;
use crate::file_utils::FileManager;

/// Both historical on-disk layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum WordStoreFile {
    List(Vec<String>),
    Object { words: Vec<String> },
}

/// Set of every word that has already gone through the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordStore {
    words: BTreeSet<Word>,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store; a missing or malformed file yields an empty store
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            debug!("No word store at {:?}, starting empty", path);
            return Self::new();
        }

        let content = match FileManager::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read word store, starting empty: {}", e);
                return Self::new();
            }
        };

        match serde_json::from_str::<WordStoreFile>(&content) {
            Ok(WordStoreFile::List(words)) | Ok(WordStoreFile::Object { words }) => {
                let store: Self = words.iter().filter_map(|w| Word::normalize(w)).collect();
                debug!("Loaded {} words from {:?}", store.len(), path);
                store
            }
            Err(e) => {
                warn!("Word store {:?} is malformed, starting empty: {}", path, e);
                Self::new()
            }
        }
    }

    /// Persist as a sorted JSON list
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.words)?;
        FileManager::write_atomic(path, json.as_bytes()).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: format!("{:#}", e),
        })
    }

    pub fn contains(&self, word: &Word) -> bool {
        self.words.contains(word)
    }

    /// Returns true when the word was not present before
    pub fn insert(&mut self, word: Word) -> bool {
        self.words.insert(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }

    /// Sorted snapshot, the build set of a run
    pub fn sorted(&self) -> Vec<Word> {
        self.words.iter().cloned().collect()
    }
}

impl FromIterator<Word> for WordStore {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        Self { words: iter.into_iter().collect() }
    }
}

impl Extend<Word> for WordStore {
    fn extend<I: IntoIterator<Item = Word>>(&mut self, iter: I) {
        self.words.extend(iter);
    }
}
