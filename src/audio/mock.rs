/*!
 * Mock synthesizer for testing, so no test ever reaches the speech endpoint.
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::SpeechSynthesizer;
use crate::errors::SourceError;

#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockSynthesizer {
    /// Returns a few fake MP3 bytes for any text
    pub fn working() -> Self {
        Self { fail: false, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn failing() -> Self {
        Self { fail: true, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock-tts"
    }

    async fn synthesize(&self, text: &str, _language: &str) -> Result<Bytes, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::Request("mock synthesizer offline".to_string()));
        }
        Ok(Bytes::from(format!("ID3 {}", text)))
    }
}
