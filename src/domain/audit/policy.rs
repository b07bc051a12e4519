//! Content policy applied to every decoded model reply.
//!
//! The instructions already ask the model for neutral, non-directive language
//! and question-formatted reflection prompts; these checks reject replies that
//! ignore those instructions instead of passing them through.

use serde::Serialize;
use thiserror::Error;

/// Directive phrases that must never reach the caller (matched case-insensitively).
pub const BANNED_PHRASES: [&str; 3] = ["you should", "i recommend", "best option is"];

/// A decoded reply that is well-formed but breaks a content rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputViolation {
    #[error("reply contains directive phrase '{phrase}'")]
    BannedPhrase { phrase: &'static str },

    #[error("reflection question is not phrased as a question: '{text}'")]
    NotAQuestion { text: String },

    #[error("expected {min}-{max} reflection questions, got {actual}")]
    QuestionCount { min: usize, max: usize, actual: usize },

    #[error("required field '{field}' is blank")]
    BlankField { field: &'static str },
}

/// Returns the first banned phrase found in `text` that `source` does not
/// itself contain.
///
/// `source` is the user's own decision text. A phrase the user wrote may be
/// quoted back as evidence without counting as directive language.
pub fn find_banned_phrase(text: &str, source: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    let source = source.to_lowercase();
    BANNED_PHRASES
        .iter()
        .copied()
        .find(|phrase| lowered.contains(phrase) && !source.contains(phrase))
}

/// Scans the JSON rendering of `value` for banned phrases not present in `source`.
pub fn scan_for_directives<T: Serialize>(value: &T, source: &str) -> Result<(), OutputViolation> {
    // Serializing a plain data struct cannot fail; an empty rendering is scanned as-is.
    let rendered = serde_json::to_string(value).unwrap_or_default();
    match find_banned_phrase(&rendered, source) {
        Some(phrase) => Err(OutputViolation::BannedPhrase { phrase }),
        None => Ok(()),
    }
}

/// True when the trimmed text ends with a question mark and has something before it.
pub fn is_interrogative(text: &str) -> bool {
    let trimmed = text.trim_end();
    trimmed.chars().count() > 1 && (trimmed.ends_with('?') || trimmed.ends_with('？'))
}

/// Rejects a blank required string field.
pub fn require_text(field: &'static str, value: &str) -> Result<(), OutputViolation> {
    if value.trim().is_empty() {
        return Err(OutputViolation::BlankField { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_banned_phrases_case_insensitively() {
        assert_eq!(find_banned_phrase("You Should diversify", ""), Some("you should"));
        assert_eq!(find_banned_phrase("I RECOMMEND waiting", ""), Some("i recommend"));
        assert_eq!(find_banned_phrase("The best option is cash", ""), Some("best option is"));
        assert_eq!(find_banned_phrase("This could lead to losses", ""), None);
    }

    #[test]
    fn phrases_from_the_decision_text_are_not_violations() {
        let source = "My advisor said you should buy now before it is too late.";

        assert_eq!(find_banned_phrase("\"you should buy now\"", source), None);
        assert_eq!(
            find_banned_phrase("you should buy now, and I recommend more", source),
            Some("i recommend")
        );
    }

    #[test]
    fn scan_inspects_nested_values() {
        let value = json!({ "scenarios": { "best_case": "Honestly, you should hold." } });
        assert_eq!(
            scan_for_directives(&value, "Sell the house?"),
            Err(OutputViolation::BannedPhrase { phrase: "you should" })
        );
        assert!(scan_for_directives(&json!({ "text": "might result in gains" }), "").is_ok());
    }

    #[test]
    fn interrogative_detection() {
        assert!(is_interrogative("Have you considered the downside?"));
        assert!(is_interrogative("What would change your mind?  "));
        assert!(is_interrogative("それは本当ですか？"));
        assert!(!is_interrogative("Consider the downside."));
        assert!(!is_interrogative("?"));
        assert!(!is_interrogative(""));
    }

    #[test]
    fn lone_question_mark_is_not_a_question_in_either_width() {
        assert!(!is_interrogative("？"));
        assert!(!is_interrogative("  ？ "));
        assert!(is_interrogative("why？"));
    }

    #[test]
    fn require_text_rejects_blank() {
        assert_eq!(
            require_text("objective", "  "),
            Err(OutputViolation::BlankField { field: "objective" })
        );
        assert!(require_text("objective", "Grow savings").is_ok());
    }

    #[test]
    fn violation_messages_are_descriptive() {
        let err = OutputViolation::QuestionCount { min: 3, max: 5, actual: 1 };
        assert_eq!(err.to_string(), "expected 3-5 reflection questions, got 1");
    }
}
