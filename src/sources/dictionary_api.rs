use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{AttributeKind, SourceAdapter, SourceClient, DEFAULT_SOURCE_TIMEOUT};
use crate::enrichment::word::Word;
use crate::errors::SourceError;

pub const DICTIONARY_API_ENDPOINT: &str = "https://api.dictionaryapi.dev/api/v2/entries";

#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
    #[serde(default)]
    definitions: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    example: Option<String>,
}

/// Structured dictionary with curated usage examples
#[derive(Debug, Clone)]
pub struct DictionaryApiSource {
    client: SourceClient,
    endpoint: String,
    language: String,
    timeout: Duration,
}

impl DictionaryApiSource {
    pub fn new(client: SourceClient, language: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: DICTIONARY_API_ENDPOINT.to_string(),
            language: language.into(),
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

    /// `{endpoint}/{language}/{word}` with the word percent-encoded
    pub fn entry_url(&self, word: &Word) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| SourceError::Request(format!("invalid endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Request("endpoint cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.language)
            .push(word.as_str());
        Ok(url)
    }
}

#[async_trait]
impl SourceAdapter for DictionaryApiSource {
    fn name(&self) -> &str {
        "dictionaryapi"
    }

    fn attribute(&self) -> AttributeKind {
        AttributeKind::Example
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, word: &Word) -> Result<Option<String>, SourceError> {
        let url = self.entry_url(word)?;
        let response = match self
            .client
            .send_with_retry(self.name(), |http| http.get(url.clone()).timeout(self.timeout))
            .await
        {
            Ok(response) => response,
            // Unknown words come back as 404
            Err(SourceError::Status { status_code: 404 }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        parse_dictionary_example(&body)
    }
}

/// First non-empty example across entries, meanings and definitions
pub fn parse_dictionary_example(body: &str) -> Result<Option<String>, SourceError> {
    let entries: Vec<DictionaryEntry> =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    Ok(entries
        .iter()
        .flat_map(|entry| &entry.meanings)
        .flat_map(|meaning| &meaning.definitions)
        .filter_map(|definition| definition.example.as_deref())
        .map(str::trim)
        .find(|example| !example.is_empty())
        .map(str::to_string))
}
