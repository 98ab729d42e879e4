use async_trait::async_trait;
use bytes::Bytes;

use super::SpeechSynthesizer;
use crate::errors::SourceError;
use crate::sources::SourceClient;

pub const GOOGLE_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest text the endpoint accepts in one request
pub const MAX_TTS_CHARS: usize = 200;

/// Speech synthesis through the public translate TTS endpoint
#[derive(Debug, Clone)]
pub struct GoogleTtsSynthesizer {
    client: SourceClient,
    endpoint: String,
}

impl GoogleTtsSynthesizer {
    pub fn new(client: SourceClient) -> Self {
        Self {
            client,
            endpoint: GOOGLE_TTS_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsSynthesizer {
    fn name(&self) -> &str {
        "google-tts"
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, SourceError> {
        let length = text.chars().count();
        if length == 0 || length > MAX_TTS_CHARS {
            return Err(SourceError::Unsupported(format!(
                "text length {} outside 1..={}",
                length, MAX_TTS_CHARS
            )));
        }
        let length = length.to_string();

        let response = self
            .client
            .send_with_retry(self.name(), |http| {
                http.get(&self.endpoint).query(&[
                    ("ie", "UTF-8"),
                    ("q", text),
                    ("tl", language),
                    ("client", "tw-ob"),
                    ("ttsspeed", "1"),
                    ("total", "1"),
                    ("idx", "0"),
                    ("textlen", length.as_str()),
                ])
            })
            .await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        if audio.is_empty() {
            return Err(SourceError::Parse("empty audio body".to_string()));
        }
        Ok(audio)
    }
}
