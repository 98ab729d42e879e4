/*!
 * External data source adapters.
 *
 * Each adapter wraps one third-party source for one attribute kind:
 * - `google_translate`: machine translation
 * - `dictionary_api`: curated dictionary examples
 * - `tatoeba`: community sentence pairs
 * - `reverso`: bilingual concordance examples scraped from rendered markup
 *
 * All adapters share one injected [`client::SourceClient`].
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::enrichment::word::Word;
use crate::errors::SourceError;

/// Timeout applied when an adapter does not choose its own
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Card attribute an adapter can resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Translation,
    Example,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Translation => write!(f, "translation"),
            Self::Example => write!(f, "example"),
        }
    }
}

/// Common trait for all data sources
///
/// An adapter reports "no value" either as `Ok(None)` or as an error. The
/// attribute resolver treats both the same way and never lets them escape.
#[async_trait]
pub trait SourceAdapter: Send + Sync + Debug {
    /// Short identifier used in logs and resolution records
    fn name(&self) -> &str;

    /// Attribute this source provides
    fn attribute(&self) -> AttributeKind;

    /// Upper bound for one `fetch` call, retries included
    fn timeout(&self) -> Duration {
        DEFAULT_SOURCE_TIMEOUT
    }

    /// Look up the attribute for a word
    async fn fetch(&self, word: &Word) -> Result<Option<String>, SourceError>;
}

pub mod client;
pub mod dictionary_api;
pub mod google_translate;
pub mod mock;
pub mod reverso;
pub mod tatoeba;

pub use client::SourceClient;
pub use dictionary_api::DictionaryApiSource;
pub use google_translate::GoogleTranslateSource;
pub use reverso::ReversoSource;
pub use tatoeba::TatoebaSource;
