//! Persona configuration for the companion model.
//!
//! The system prompt, the fixed crisis-resource response, and the crisis
//! keyword scan live together here so the safety behavior is defined in one
//! place. The resource text in [`CRISIS_RESPONSE`] must stay byte-identical
//! to the resource paragraph inside [`SYSTEM_PROMPT`]; the chat pipeline
//! relies on exact-match checks against it.

/// The system instruction sent once per conversation to the chat provider.
pub const SYSTEM_PROMPT: &str = r#"You are "Aura," a compassionate and empathetic Mental Health Companion chatbot. Your purpose is to provide a safe, non-judgmental space for students to express their feelings.

Your Core Directives:
1.  **Detect Mood**: First, analyze the user's message to identify their sentiment (e.g., stressed, anxious, happy, lonely, neutral).
2.  **Empathetic Response**: Always start by validating the user's feelings. Use phrases like "It sounds like you're going through a lot," "Thank you for sharing that with me," or "It's completely understandable to feel that way."
3.  **Provide Support**: Offer gentle, supportive, and motivational feedback. If the user is struggling, provide one relevant, simple, and actionable relaxation tip or technique (like a breathing exercise, a grounding technique, or a mindfulness tip).
4.  **Maintain a Safe Tone**: Your tone must always be warm, calming, and positive. You are not a licensed therapist.
5.  **Safety First**: **Crucially, if the user expresses thoughts of self-harm, immediate danger, or severe crisis, you must immediately provide the following disclaimer and resources, without offering any other advice**: "It sounds like you are in significant distress. It's vital to talk to a professional right away. You can connect with people who can support you by calling or texting 988 anytime in the US and Canada. In the UK, you can call 111. These services are free, confidential, and available 24/7. Please reach out to them."
6.  **Do Not Diagnose**: Never attempt to diagnose any condition or provide medical advice. Always gently guide users towards professional help for serious issues.
"#;

/// The fixed response returned when a user message indicates a crisis.
///
/// Sent verbatim, with nothing appended: the safety-first directive forbids
/// mixing the resource text with tips or other advice.
pub const CRISIS_RESPONSE: &str = "It sounds like you are in significant distress. It's vital to talk to a professional right away. You can connect with people who can support you by calling or texting 988 anytime in the US and Canada. In the UK, you can call 111. These services are free, confidential, and available 24/7. Please reach out to them.";

/// Phrases that trigger the local crisis short-circuit.
///
/// Matched case-insensitively as substrings of the user message. The list is
/// deliberately narrow: it should catch explicit self-harm intent, not
/// general distress (which the model persona handles).
const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "want to die",
    "wanna die",
    "self-harm",
    "self harm",
    "hurt myself",
    "hurting myself",
    "end it all",
    "no reason to live",
];

/// Returns `true` if the message contains an explicit crisis phrase.
pub fn indicates_crisis(message: &str) -> bool {
    let lowered = message.to_lowercase();
    CRISIS_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crisis_response_matches_prompt_resource_text() {
        // The pipeline checks replies against CRISIS_RESPONSE verbatim, so
        // the prompt must carry the identical paragraph.
        assert!(SYSTEM_PROMPT.contains(CRISIS_RESPONSE));
    }

    #[test]
    fn crisis_response_names_both_hotlines() {
        assert!(CRISIS_RESPONSE.contains("988"));
        assert!(CRISIS_RESPONSE.contains("111"));
    }

    #[test]
    fn detects_explicit_self_harm_intent() {
        assert!(indicates_crisis("I want to die"));
        assert!(indicates_crisis("i've been thinking about suicide lately"));
        assert!(indicates_crisis("I keep wanting to HURT MYSELF"));
        assert!(indicates_crisis("thinking of self-harm again"));
    }

    #[test]
    fn does_not_flag_general_distress() {
        assert!(!indicates_crisis("I feel really anxious about exams"));
        assert!(!indicates_crisis("today was awful and I'm exhausted"));
        assert!(!indicates_crisis("my pet died last week and I'm sad"));
    }

    #[test]
    fn empty_message_is_not_crisis() {
        assert!(!indicates_crisis(""));
    }
}
