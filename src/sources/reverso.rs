use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use url::Url;

use super::{AttributeKind, SourceAdapter, SourceClient, DEFAULT_SOURCE_TIMEOUT};
use crate::enrichment::word::Word;
use crate::errors::SourceError;
use crate::language_utils;

pub const REVERSO_ENDPOINT: &str = "https://context.reverso.net/translation";

/// Opening `div`/`span` tags that carry a class attribute
static CLASSED_OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<(?:div|span)\b[^>]*?\bclass\s*=\s*"([^"]*)"[^>]*>"#)
        .expect("classed tag pattern is valid")
});

static CLOSING_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:div|span)\s*>").expect("closing tag pattern is valid")
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("entity pattern is valid")
});

/// Class names of elements that hold example text, in layout order
const EXAMPLE_TEXT_CLASSES: &[&str] = &["text", "src", "trg", "example-text"];

/// Bilingual concordance search, parsed from the rendered result page
#[derive(Debug, Clone)]
pub struct ReversoSource {
    client: SourceClient,
    endpoint: String,
    /// e.g. "english-russian"
    language_pair: String,
    user_agent: String,
    timeout: Duration,
}

impl ReversoSource {
    pub fn new(
        client: SourceClient,
        source_language: &str,
        target_language: &str,
        user_agent: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let source_name = language_utils::get_language_name(source_language)?.to_lowercase();
        let target_name = language_utils::get_language_name(target_language)?.to_lowercase();
        Ok(Self {
            client,
            endpoint: REVERSO_ENDPOINT.to_string(),
            language_pair: format!("{}-{}", source_name, target_name),
            user_agent: user_agent.into(),
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

    pub fn page_url(&self, word: &Word) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| SourceError::Request(format!("invalid endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Request("endpoint cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.language_pair)
            .push(word.as_str());
        Ok(url)
    }
}

#[async_trait]
impl SourceAdapter for ReversoSource {
    fn name(&self) -> &str {
        "reverso"
    }

    fn attribute(&self) -> AttributeKind {
        AttributeKind::Example
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, word: &Word) -> Result<Option<String>, SourceError> {
        let url = self.page_url(word)?;
        let response = self
            .client
            .send_with_retry(self.name(), |http| {
                http.get(url.clone())
                    .header(reqwest::header::USER_AGENT, &self.user_agent)
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .timeout(self.timeout)
            })
            .await?;

        let html = response
            .text()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        Ok(extract_example(&html))
    }
}

/// First non-empty example text on a result page
///
/// Only markup after the first `example` container is considered.
pub fn extract_example(html: &str) -> Option<String> {
    let start = html.find("class=\"example")?;
    let body = &html[start..];

    for open in CLASSED_OPEN_TAG.captures_iter(body) {
        let (Some(tag), Some(classes)) = (open.get(0), open.get(1)) else {
            continue;
        };
        let is_text = classes
            .as_str()
            .split_whitespace()
            .any(|class| EXAMPLE_TEXT_CLASSES.contains(&class));
        if !is_text {
            continue;
        }

        let rest = &body[tag.end()..];
        let inner = match CLOSING_TAG.find(rest) {
            Some(close) => &rest[..close.start()],
            None => rest,
        };
        let text = clean_markup(inner);
        if !text.is_empty() {
            return Some(text);
        }
    }

    None
}

/// Strip tags, decode common entities and collapse whitespace
pub fn clean_markup(fragment: &str) -> String {
    let without_tags = ANY_TAG.replace_all(fragment, "");
    let decoded = NUMERIC_ENTITY.replace_all(&without_tags, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let decoded = decoded
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
