/*!
 * Mock source implementations for testing.
 *
 * This module provides a mock adapter that simulates different behaviors:
 * - `MockSource::answering()` - Always succeeds with a value derived from the word
 * - `MockSource::empty()` - Reachable but has nothing for any word
 * - `MockSource::failing()` - Always fails with an error
 * - `MockSource::slow()` - Answers after a delay (for timeout testing)
 * - `MockSource::panicking()` - Panics inside `fetch`
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{AttributeKind, SourceAdapter, DEFAULT_SOURCE_TIMEOUT};
use crate::enrichment::word::Word;
use crate::errors::SourceError;

/// Behavior mode for the mock source
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Returns `"{prefix}{word}"`
    Answering { prefix: String },
    /// Returns `Ok(None)`
    Empty,
    /// Returns the given error
    Failing(SourceError),
    /// Sleeps, then answers like `Answering`
    Slow { delay_ms: u64, prefix: String },
    /// Panics inside `fetch`
    Panicking,
}

/// Mock source for testing resolver and pipeline behavior
#[derive(Debug, Clone)]
pub struct MockSource {
    name: String,
    attribute: AttributeKind,
    behavior: MockBehavior,
    /// Per-word answers that take precedence over `behavior`
    overrides: HashMap<String, Option<String>>,
    timeout: Duration,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn new(name: impl Into<String>, attribute: AttributeKind, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            attribute,
            behavior,
            overrides: HashMap::new(),
            timeout: DEFAULT_SOURCE_TIMEOUT,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn answering(name: &str, attribute: AttributeKind, prefix: &str) -> Self {
        Self::new(name, attribute, MockBehavior::Answering { prefix: prefix.to_string() })
    }

    pub fn empty(name: &str, attribute: AttributeKind) -> Self {
        Self::new(name, attribute, MockBehavior::Empty)
    }

    pub fn failing(name: &str, attribute: AttributeKind) -> Self {
        Self::new(
            name,
            attribute,
            MockBehavior::Failing(SourceError::Status { status_code: 503 }),
        )
    }

    pub fn slow(name: &str, attribute: AttributeKind, delay_ms: u64, prefix: &str) -> Self {
        Self::new(
            name,
            attribute,
            MockBehavior::Slow { delay_ms, prefix: prefix.to_string() },
        )
    }

    pub fn panicking(name: &str, attribute: AttributeKind) -> Self {
        Self::new(name, attribute, MockBehavior::Panicking)
    }

    /// Fixed answer for one word, `None` meaning "no value"
    pub fn with_answer(mut self, word: &str, answer: Option<&str>) -> Self {
        self.overrides.insert(word.to_string(), answer.map(str::to_string));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of `fetch` calls so far, shared between clones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Words passed to `fetch`, in call order
    pub fn seen_words(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl SourceAdapter for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self) -> AttributeKind {
        self.attribute
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, word: &Word) -> Result<Option<String>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(word.to_string());

        if let Some(answer) = self.overrides.get(word.as_str()) {
            return Ok(answer.clone());
        }

        match &self.behavior {
            MockBehavior::Answering { prefix } => Ok(Some(format!("{}{}", prefix, word))),
            MockBehavior::Empty => Ok(None),
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::Slow { delay_ms, prefix } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(Some(format!("{}{}", prefix, word)))
            }
            MockBehavior::Panicking => panic!("mock source '{}' panicked", self.name),
        }
    }
}
