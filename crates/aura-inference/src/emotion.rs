//! Client for the hosted emotion-classification model.
//!
//! `classify` is deliberately infallible: on any failure — missing
//! credential, transport error, non-success status, malformed body — it
//! resolves to the [`UNKNOWN_EMOTION`] sentinel instead of propagating an
//! error. Callers treat the sentinel as a valid outcome, never as an
//! exception path.

use crate::cache::LookupCache;
use crate::config::InferenceApiConfig;
use crate::error::InferenceError;
use serde_json::{json, Value};
use std::time::Duration;

/// Sentinel label returned when classification is unavailable.
pub const UNKNOWN_EMOTION: &str = "unknown";

/// Maximum number of cached classifications before evicting oldest.
const MAX_CACHE_ENTRIES: usize = 2000;

/// Client for a hosted text-classification endpoint.
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    model: String,
    cache: LookupCache<String>,
}

impl EmotionClassifier {
    /// Creates a new classifier. A missing token is not an error here: the
    /// classifier stays constructible and resolves every call to the
    /// sentinel.
    pub fn new(config: &InferenceApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            model: config.emotion_model.clone(),
            cache: LookupCache::new(MAX_CACHE_ENTRIES),
        }
    }

    /// Returns `true` if a credential is configured.
    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Classifies `text` and returns the highest-confidence label.
    ///
    /// Results are cached keyed by the exact input text; identical inputs
    /// are served without a second network call. Never fails: unavailable
    /// classification resolves to [`UNKNOWN_EMOTION`].
    pub async fn classify(&self, text: &str) -> String {
        if let Some(label) = self.cache.get(text) {
            return label;
        }

        match self.try_classify(text).await {
            Ok(label) => {
                self.cache.insert(text, label.clone());
                label
            }
            Err(e) => {
                tracing::debug!(error = %e, "emotion classification unavailable");
                UNKNOWN_EMOTION.to_string()
            }
        }
    }

    async fn try_classify(&self, text: &str) -> Result<String, InferenceError> {
        let token = self.token.as_ref().ok_or_else(|| {
            InferenceError::Config("inference API token is not set".to_string())
        })?;

        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| InferenceError::Upstream(format!("emotion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::Upstream(format!(
                "emotion provider returned {status}"
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            InferenceError::Upstream(format!("emotion response was not valid JSON: {e}"))
        })?;

        top_label(&body).ok_or_else(|| {
            InferenceError::Upstream("emotion response had no scored labels".to_string())
        })
    }
}

/// Picks the argmax label from a nested `[[{label, score}, ...]]` body.
///
/// Ties keep the first-seen maximum: the scan only replaces the current best
/// on a strictly greater score.
fn top_label(body: &Value) -> Option<String> {
    let scores = body.as_array()?.first()?.as_array()?;

    let mut best: Option<(String, f64)> = None;
    for entry in scores {
        let label = entry.get("label").and_then(Value::as_str)?;
        let score = entry.get("score").and_then(Value::as_f64)?;
        let better = match &best {
            Some((_, top)) => score > *top,
            None => true,
        };
        if better {
            best = Some((label.to_string(), score));
        }
    }
    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_label_picks_highest_score() {
        let body = serde_json::json!([[
            { "label": "sadness", "score": 0.2 },
            { "label": "fear", "score": 0.7 },
            { "label": "joy", "score": 0.1 }
        ]]);
        assert_eq!(top_label(&body), Some("fear".to_string()));
    }

    #[test]
    fn top_label_tie_keeps_first_seen() {
        let body = serde_json::json!([[
            { "label": "anger", "score": 0.5 },
            { "label": "fear", "score": 0.5 }
        ]]);
        assert_eq!(top_label(&body), Some("anger".to_string()));
    }

    #[test]
    fn top_label_rejects_malformed_shapes() {
        assert_eq!(top_label(&serde_json::json!({ "error": "loading" })), None);
        assert_eq!(top_label(&serde_json::json!([])), None);
        assert_eq!(top_label(&serde_json::json!([[]])), None);
        assert_eq!(
            top_label(&serde_json::json!([[{ "label": "joy" }]])),
            None
        );
    }
}
