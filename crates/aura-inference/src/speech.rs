//! Client for the hosted speech-synthesis model.
//!
//! `synthesize` returns `Option` rather than `Result`: any failure —
//! missing credential, non-success status, transport error, oversized
//! payload — yields `None`, and callers must handle the absence of audio.
//! The full audio payload is returned as one buffer; there is no streaming.

use crate::cache::LookupCache;
use crate::config::InferenceApiConfig;
use serde_json::json;
use std::time::Duration;

/// Content type assumed when the provider does not name one.
const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/flac";

/// Maximum text input size for synthesis (64 KiB). Prevents resource
/// exhaustion from oversized synthesis requests.
const MAX_INPUT_BYTES: usize = 64 * 1024;

/// Maximum audio payload size to accept (8 MiB).
const MAX_AUDIO_BYTES: usize = 8 * 1024 * 1024;

/// Maximum number of cached clips before evicting oldest.
const MAX_CACHE_ENTRIES: usize = 500;

/// A synthesized audio payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Raw audio bytes as returned by the provider.
    pub bytes: Vec<u8>,
    /// MIME type reported by the provider.
    pub content_type: String,
}

/// Client for a hosted text-to-speech endpoint.
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    model: String,
    cache: LookupCache<AudioClip>,
}

impl SpeechSynthesizer {
    /// Creates a new synthesizer. A missing token is not an error here: the
    /// synthesizer stays constructible and every call returns `None`.
    pub fn new(config: &InferenceApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            model: config.speech_model.clone(),
            cache: LookupCache::new(MAX_CACHE_ENTRIES),
        }
    }

    /// Returns `true` if a credential is configured.
    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Synthesizes speech for `text`, returning the full audio payload.
    ///
    /// Returns `None` on any failure. Results are cached keyed by the exact
    /// input text.
    pub async fn synthesize(&self, text: &str) -> Option<AudioClip> {
        if text.len() > MAX_INPUT_BYTES {
            tracing::warn!(
                len = text.len(),
                limit = MAX_INPUT_BYTES,
                "speech input exceeds maximum size"
            );
            return None;
        }

        if let Some(clip) = self.cache.get(text) {
            return Some(clip);
        }

        let token = match &self.token {
            Some(token) => token,
            None => {
                tracing::debug!("speech synthesis skipped: inference API token is not set");
                return None;
            }
        };

        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = match self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "inputs": text }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "speech request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "speech provider returned an error response");
            return None;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
            .to_string();

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read speech response body");
                return None;
            }
        };

        if bytes.len() > MAX_AUDIO_BYTES {
            tracing::warn!(len = bytes.len(), "speech payload exceeds maximum size");
            return None;
        }

        let clip = AudioClip {
            bytes: bytes.to_vec(),
            content_type,
        };
        self.cache.insert(text, clip.clone());
        Some(clip)
    }
}
