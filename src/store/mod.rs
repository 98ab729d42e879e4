/*!
 * Durable word and card stores.
 *
 * - `word_store`: set of processed words
 * - `card_store`: per-word resolved attributes
 * - `listing`: tabular rendering of the card store
 */

pub mod card_store;
pub mod listing;
pub mod word_store;

pub use card_store::{CardEntry, CardStore};
pub use word_store::WordStore;

use std::path::{Path, PathBuf};

use crate::errors::StoreError;

/// Both stores together with the files they came from
///
/// Only the pipeline orchestrator mutates this; workers hand back values.
#[derive(Debug)]
pub struct Stores {
    pub words: WordStore,
    pub cards: CardStore,
    words_path: PathBuf,
    cards_path: PathBuf,
}

impl Stores {
    /// Load both stores, degrading to empty ones on any read problem
    pub fn load(words_path: impl Into<PathBuf>, cards_path: impl Into<PathBuf>) -> Self {
        let words_path = words_path.into();
        let cards_path = cards_path.into();
        Self {
            words: WordStore::load(&words_path),
            cards: CardStore::load(&cards_path),
            words_path,
            cards_path,
        }
    }

    pub fn words_path(&self) -> &Path {
        &self.words_path
    }

    pub fn cards_path(&self) -> &Path {
        &self.cards_path
    }

    pub fn save_cards(&self) -> Result<(), StoreError> {
        self.cards.save(&self.cards_path)
    }

    pub fn save_all(&self) -> Result<(), StoreError> {
        self.words.save(&self.words_path)?;
        self.save_cards()
    }
}
