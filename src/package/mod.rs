/*!
 * Flashcard package assembly.
 *
 * The pipeline hands a [`PackageInput`] to a [`PackageAssembler`]; the
 * concrete output format lives behind that trait.
 */

use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::audio::AudioCache;
use crate::enrichment::word::Word;
use crate::errors::PackageError;
use crate::store::CardStore;

pub mod anki_text;

pub use anki_text::AnkiTextAssembler;

/// One note in the package, in build-set order
#[derive(Debug, Clone, PartialEq)]
pub struct BuildItem {
    pub word: Word,
    pub translation: String,
    pub example: String,
    /// Audio file name, only set when the file is present in the cache
    pub audio_file: Option<String>,
}

/// Everything an assembler needs to write one package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageInput {
    pub deck_name: String,
    pub items: Vec<BuildItem>,
    /// Existing media files, de-duplicated in first-seen order
    pub media_files: Vec<PathBuf>,
}

impl PackageInput {
    /// Collect build items for `build_set` from the card store
    ///
    /// Words without a card entry are skipped.
    pub fn from_stores(
        deck_name: impl Into<String>,
        build_set: &[Word],
        cards: &CardStore,
        audio: &AudioCache,
    ) -> Self {
        let mut items = Vec::with_capacity(build_set.len());
        let mut media_files = Vec::new();
        let mut seen_media = HashSet::new();

        for word in build_set {
            let Some(card) = cards.get(word) else {
                debug!("No card for '{}', leaving it out of the package", word);
                continue;
            };

            let media = audio.existing_file(&card.audio_file);
            if let Some(path) = &media {
                if seen_media.insert(path.clone()) {
                    media_files.push(path.clone());
                }
            }

            items.push(BuildItem {
                word: word.clone(),
                translation: card.translation.clone(),
                example: card.example.clone(),
                audio_file: media.map(|_| card.audio_file.clone()),
            });
        }

        Self {
            deck_name: deck_name.into(),
            items,
            media_files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Writes a flashcard package
pub trait PackageAssembler: Send + Sync {
    /// Where the package will be written
    fn output_path(&self) -> &Path;

    /// Whether a package from an earlier run is already present
    fn output_exists(&self) -> bool {
        self.output_path().exists()
    }

    /// Write the package and return its path
    fn assemble(&self, input: &PackageInput) -> Result<PathBuf, PackageError>;
}
