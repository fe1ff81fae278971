//! Paced reply chunks for the typing effect.
//!
//! Purely cosmetic: the reply text is already complete when pacing starts.
//! The stream must never alter content, only the cadence of display.

use futures_util::{Stream, StreamExt};
use std::time::Duration;

/// Splits `text` on whitespace and yields each token with a trailing space,
/// sleeping `delay` before each chunk.
///
/// The stream is finite and owns its data; each call produces a fresh,
/// independent sequence.
pub fn pace(text: &str, delay: Duration) -> impl Stream<Item = String> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|token| format!("{token} "))
        .collect();

    tokio_stream::iter(tokens).then(move |token| async move {
        tokio::time::sleep(delay).await;
        token
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_chunk_per_token_in_order() {
        let chunks: Vec<String> = pace("a b c", Duration::ZERO).collect().await;
        assert_eq!(chunks, ["a ", "b ", "c "]);
    }

    #[tokio::test]
    async fn empty_text_yields_no_chunks() {
        let chunks: Vec<String> = pace("", Duration::ZERO).collect().await;
        assert!(chunks.is_empty());

        let chunks: Vec<String> = pace("   \n ", Duration::ZERO).collect().await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn whitespace_runs_collapse_to_single_separators() {
        let chunks: Vec<String> = pace("hello   there\nfriend", Duration::ZERO).collect().await;
        assert_eq!(chunks, ["hello ", "there ", "friend "]);
    }

    #[tokio::test]
    async fn content_is_preserved_in_order() {
        let text = "It sounds like you're going through a lot.";
        let chunks: Vec<String> = pace(text, Duration::ZERO).collect().await;
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined.trim_end(), text);
    }

    #[tokio::test(start_paused = true)]
    async fn each_chunk_waits_the_configured_delay() {
        let delay = Duration::from_millis(50);
        let start = tokio::time::Instant::now();
        let chunks: Vec<String> = pace("a b c", delay).collect().await;
        assert_eq!(chunks.len(), 3);
        // Paused clock auto-advances through each sleep exactly.
        assert_eq!(start.elapsed(), Duration::from_millis(150));
    }
}
