use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{AttributeKind, SourceAdapter, SourceClient, DEFAULT_SOURCE_TIMEOUT};
use crate::enrichment::word::Word;
use crate::errors::SourceError;
use crate::language_utils;

pub const TATOEBA_ENDPOINT: &str = "https://tatoeba.org/eng/api_v0/search";

/// Community sentence corpus; prefers sentences that carry a translation
#[derive(Debug, Clone)]
pub struct TatoebaSource {
    client: SourceClient,
    endpoint: String,
    /// ISO 639-3
    from: String,
    /// ISO 639-3
    to: String,
    timeout: Duration,
}

impl TatoebaSource {
    /// Create a search between two languages, given in any ISO flavour
    pub fn new(client: SourceClient, source_language: &str, target_language: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            endpoint: TATOEBA_ENDPOINT.to_string(),
            from: language_utils::normalize_to_part3(source_language)?,
            to: language_utils::normalize_to_part3(target_language)?,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SourceAdapter for TatoebaSource {
    fn name(&self) -> &str {
        "tatoeba"
    }

    fn attribute(&self) -> AttributeKind {
        AttributeKind::Example
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, word: &Word) -> Result<Option<String>, SourceError> {
        let response = self
            .client
            .send_with_retry(self.name(), |http| {
                http.get(&self.endpoint)
                    .query(&[
                        ("query", word.as_str()),
                        ("from", self.from.as_str()),
                        ("to", self.to.as_str()),
                        ("orphans", "no"),
                        ("unapproved", "no"),
                        ("page", "1"),
                    ])
                    .timeout(self.timeout)
            })
            .await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(pick_sentence(&body, &self.to))
    }
}

/// Choose the best sentence from a search response
///
/// The first result with a translation in `target` wins and is rendered as
/// `"sentence — translation"`; otherwise the first result's bare text.
pub fn pick_sentence(body: &Value, target: &str) -> Option<String> {
    let results = body.get("results")?.as_array()?;

    for item in results {
        let Some(text) = non_empty_text(item) else {
            continue;
        };
        if let Some(translation) = find_translation(item.get("translations"), target) {
            return Some(format!("{} — {}", text, translation));
        }
    }

    results.first().and_then(non_empty_text).map(str::to_string)
}

/// Translations come as a list of lists (direct, indirect); flatten one level
fn find_translation<'a>(translations: Option<&'a Value>, target: &str) -> Option<&'a str> {
    let groups = translations?.as_array()?;
    groups
        .iter()
        .flat_map(|group| match group {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .filter(|candidate| {
            candidate
                .get("lang")
                .or_else(|| candidate.get("language"))
                .and_then(Value::as_str)
                .is_some_and(|lang| language_utils::language_codes_match(lang, target))
        })
        .find_map(non_empty_text)
}

fn non_empty_text(value: &Value) -> Option<&str> {
    value
        .get("text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
