use aura_types::persona;
use serde::Deserialize;
use std::fmt;

fn default_chat_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_chat_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_inference_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_emotion_model() -> String {
    "j-hartmann/emotion-english-distilroberta-base".to_string()
}

fn default_speech_model() -> String {
    "facebook/mms-tts-eng".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_system_prompt() -> String {
    persona::SYSTEM_PROMPT.to_string()
}

/// Configuration for the generative chat provider.
#[derive(Clone, Deserialize)]
pub struct ChatConfig {
    /// API key for the chat provider. Empty means the chat feature is
    /// disabled for this process.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier sent in the request path.
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Provider base URL (overridable so tests can point at a local server).
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// The persona instruction sent once per conversation.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_chat_model(),
            base_url: default_chat_base_url(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Configuration for the hosted inference API (emotion + speech models).
#[derive(Clone, Deserialize)]
pub struct InferenceApiConfig {
    /// Bearer token for the inference API. `None` disables both features.
    #[serde(default)]
    pub token: Option<String>,

    /// Emotion classification model identifier.
    #[serde(default = "default_emotion_model")]
    pub emotion_model: String,

    /// Speech synthesis model identifier.
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Inference API base URL (overridable so tests can point at a local
    /// server).
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceApiConfig {
    fn default() -> Self {
        Self {
            token: None,
            emotion_model: default_emotion_model(),
            speech_model: default_speech_model(),
            base_url: default_inference_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for InferenceApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceApiConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("emotion_model", &self.emotion_model)
            .field("speech_model", &self.speech_model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
