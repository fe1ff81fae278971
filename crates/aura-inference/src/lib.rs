//! Remote inference clients for the Aura companion backend.
//!
//! Wraps the three hosted APIs the product depends on: a generative chat
//! provider (persona-driven replies over the full conversation history), an
//! emotion classifier (argmax over scored labels), and a speech synthesizer
//! (raw audio bytes). Each client owns its HTTP plumbing and failure policy;
//! the emotion and speech clients share a bounded read-through cache keyed
//! by exact input text, because both calls are pure functions of their
//! input.
//!
//! Failure surfaces differ by design: the chat client returns errors the
//! orchestrator must show the user, the emotion client degrades to the
//! `"unknown"` sentinel, and the speech client returns `None`.

pub mod cache;
pub mod chat;
pub mod config;
pub mod emotion;
pub mod error;
pub mod speech;

pub use cache::LookupCache;
pub use chat::ChatClient;
pub use config::{ChatConfig, InferenceApiConfig};
pub use emotion::{EmotionClassifier, UNKNOWN_EMOTION};
pub use error::InferenceError;
pub use speech::{AudioClip, SpeechSynthesizer};
