/*!
 * Multi-source attribute resolution with cascading fallback.
 *
 * A resolver owns the ordered adapters for one attribute kind. It asks each in
 * turn and returns the first non-empty answer. Adapter errors, empty answers,
 * timeouts and panics are all absorbed and recorded; when every adapter comes
 * up empty the resolver still produces a defined fallback value, so a card is
 * never left blank.
 */

use futures::FutureExt;
use log::{debug, warn};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::word::Word;
use crate::errors::SourceError;
use crate::sources::{AttributeKind, SourceAdapter};

/// Marker stored when no translation source answered
pub const TRANSLATION_NOT_FOUND: &str = "Translation not found";

/// Deterministic value used when every adapter failed
pub fn fallback_value(kind: AttributeKind, word: &Word) -> String {
    match kind {
        AttributeKind::Translation => TRANSLATION_NOT_FOUND.to_string(),
        AttributeKind::Example => format!("I often use the word '{}' in daily conversation.", word),
    }
}

/// Why one adapter produced nothing
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// `Ok(None)` or a blank value
    NoValue,
    Error(SourceError),
    /// The adapter panicked
    Crashed,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            FailureReason::NoValue => write!(f, "{}: no value", self.source),
            FailureReason::Error(e) => write!(f, "{}: {}", self.source, e),
            FailureReason::Crashed => write!(f, "{}: adapter panicked", self.source),
        }
    }
}

/// Outcome of resolving one attribute for one word
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// An adapter answered
    Found {
        value: String,
        source: String,
        /// Higher-priority adapters that failed first
        failures: Vec<SourceFailure>,
    },
    /// Every adapter failed; `value` is the fallback
    Fallback {
        value: String,
        failures: Vec<SourceFailure>,
    },
}

impl Resolution {
    pub fn value(&self) -> &str {
        match self {
            Self::Found { value, .. } | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Self::Found { value, .. } | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn failures(&self) -> &[SourceFailure] {
        match self {
            Self::Found { failures, .. } | Self::Fallback { failures, .. } => failures,
        }
    }
}

/// Tries adapters for one attribute kind in priority order
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    kind: AttributeKind,
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AttributeResolver {
    /// Adapters whose attribute differs from `kind` are dropped with a warning
    pub fn new(kind: AttributeKind, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .filter(|adapter| {
                let matches = adapter.attribute() == kind;
                if !matches {
                    warn!(
                        "Ignoring {} source '{}' for {} resolution",
                        adapter.attribute(),
                        adapter.name(),
                        kind
                    );
                }
                matches
            })
            .collect();
        Self { kind, adapters }
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Adapter names in priority order
    pub fn source_names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// Resolve the attribute for a word. Never fails.
    pub async fn resolve(&self, word: &Word) -> Resolution {
        let mut failures = Vec::new();

        for adapter in &self.adapters {
            let reason = match self.ask(adapter.as_ref(), word).await {
                Ok(value) => {
                    return Resolution::Found {
                        value,
                        source: adapter.name().to_string(),
                        failures,
                    };
                }
                Err(reason) => reason,
            };

            let failure = SourceFailure {
                source: adapter.name().to_string(),
                reason,
            };
            debug!("{} for '{}' missed: {}", self.kind, word, failure);
            failures.push(failure);
        }

        Resolution::Fallback {
            value: fallback_value(self.kind, word),
            failures,
        }
    }

    /// One adapter call under its own timeout, with panics contained
    async fn ask(&self, adapter: &dyn SourceAdapter, word: &Word) -> Result<String, FailureReason> {
        let timeout = adapter.timeout();
        let call = AssertUnwindSafe(adapter.fetch(word)).catch_unwind();

        match tokio::time::timeout(timeout, call).await {
            Err(_) => Err(FailureReason::Error(SourceError::Timeout(timeout.as_millis() as u64))),
            Ok(Err(_panic)) => Err(FailureReason::Crashed),
            Ok(Ok(Err(e))) => Err(FailureReason::Error(e)),
            Ok(Ok(Ok(None))) => Err(FailureReason::NoValue),
            Ok(Ok(Ok(Some(value)))) => {
                let value = value.trim();
                if value.is_empty() {
                    Err(FailureReason::NoValue)
                } else {
                    Ok(value.to_string())
                }
            }
        }
    }
}
