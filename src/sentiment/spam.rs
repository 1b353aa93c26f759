//! Spam heuristic over (review text, rating). Four independent checks,
//! each appending a fixed reason string; two or more flags mark the
//! review as potential spam.

use serde::Serialize;
use std::collections::HashMap;

const SHORT_REVIEW_CHARS: usize = 20;
const CAPS_RATIO_LIMIT: f64 = 0.5;
const EXCLAMATION_LIMIT: usize = 3;
const WORD_REPEAT_LIMIT: usize = 3;
const REPEATED_WORDS_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpamFlagResult {
    pub is_potential_spam: bool,
    pub flags: Vec<String>,
    pub risk_level: RiskLevel,
}

/// Flag suspicious review text. Ratings are on the 1..=5 scale; only the
/// extremes interact with the short-review check.
pub fn detect_spam(text: &str, rating: u8) -> SpamFlagResult {
    let mut flags = Vec::new();
    let len = text.chars().count();

    if len < SHORT_REVIEW_CHARS && (rating == 5 || rating == 1) {
        flags.push("Very short review with extreme rating".to_string());
    }

    if len > 10 {
        let caps = text.chars().filter(|c| c.is_ascii_uppercase()).count();
        if caps as f64 / len as f64 > CAPS_RATIO_LIMIT {
            flags.push("Excessive use of capital letters".to_string());
        }
    }

    if text.matches('!').count() > EXCLAMATION_LIMIT {
        flags.push("Excessive exclamation marks".to_string());
    }

    let mut word_counts: HashMap<String, usize> = HashMap::new();
    for word in text.to_lowercase().split_whitespace() {
        *word_counts.entry(word.to_string()).or_insert(0) += 1;
    }
    let repeated = word_counts
        .values()
        .filter(|&&c| c > WORD_REPEAT_LIMIT)
        .count();
    if repeated > REPEATED_WORDS_LIMIT {
        flags.push("Excessive word repetition".to_string());
    }

    let risk_level = match flags.len() {
        0 => RiskLevel::Low,
        1 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };

    SpamFlagResult {
        is_potential_spam: flags.len() >= 2,
        flags,
        risk_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_review_is_clean() {
        let r = detect_spam(
            "The guides were friendly and the views were stunning throughout.",
            4,
        );
        assert!(!r.is_potential_spam);
        assert!(r.flags.is_empty());
        assert_eq!(r.risk_level, RiskLevel::Low);
    }

    #[test]
    fn shouty_extreme_review_is_flagged() {
        let r = detect_spam("GREAT!!!! AMAZING!!!! BEST!!!!", 5);
        assert!(r.is_potential_spam);
        assert!(r.flags.len() >= 2, "flags: {:?}", r.flags);
        assert_eq!(r.risk_level, RiskLevel::High);
    }

    #[test]
    fn single_flag_is_medium_risk_not_spam() {
        // Long enough, moderate rating; only the exclamation check fires.
        let r = detect_spam("Nice tour overall, lovely views again and again!!!!", 3);
        assert_eq!(r.flags, vec!["Excessive exclamation marks".to_string()]);
        assert!(!r.is_potential_spam);
        assert_eq!(r.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn short_review_with_middling_rating_is_fine() {
        let r = detect_spam("Decent trip.", 3);
        assert!(r.flags.is_empty());
    }

    #[test]
    fn repeated_words_need_three_distinct_offenders() {
        // "best" and "tour" repeat 4x each, but only two distinct words do.
        let two = "best tour best tour best tour best tour";
        assert!(!detect_spam(two, 3)
            .flags
            .iter()
            .any(|f| f.contains("repetition")));

        let three = "best tour ever best tour ever best tour ever best tour ever";
        let r = detect_spam(three, 3);
        assert!(
            r.flags.iter().any(|f| f.contains("repetition")),
            "flags: {:?}",
            r.flags
        );
    }

    #[test]
    fn empty_text_does_not_panic() {
        let r = detect_spam("", 5);
        // Zero-length still counts as a short extreme-rating review.
        assert_eq!(r.flags.len(), 1);
        assert_eq!(r.risk_level, RiskLevel::Medium);
    }
}
