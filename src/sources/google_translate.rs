use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{AttributeKind, SourceAdapter, SourceClient, DEFAULT_SOURCE_TIMEOUT};
use crate::enrichment::word::Word;
use crate::errors::SourceError;

/// Public endpoint used by the browser widget
pub const GOOGLE_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Machine translation source, the single authority for translations
#[derive(Debug, Clone)]
pub struct GoogleTranslateSource {
    client: SourceClient,
    endpoint: String,
    source_language: String,
    target_language: String,
    timeout: Duration,
}

impl GoogleTranslateSource {
    /// Create a translator between two ISO 639-1 codes
    pub fn new(client: SourceClient, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: GOOGLE_TRANSLATE_ENDPOINT.to_string(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
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
impl SourceAdapter for GoogleTranslateSource {
    fn name(&self) -> &str {
        "google-translate"
    }

    fn attribute(&self) -> AttributeKind {
        AttributeKind::Translation
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
                        ("client", "gtx"),
                        ("sl", self.source_language.as_str()),
                        ("tl", self.target_language.as_str()),
                        ("dt", "t"),
                        ("q", word.as_str()),
                    ])
                    .timeout(self.timeout)
            })
            .await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(parse_translation(&body))
    }
}

/// Join the translated segments of a `translate_a/single` response
///
/// The payload is `[[["segment", "source", ...], ...], null, "en", ...]`.
pub fn parse_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
