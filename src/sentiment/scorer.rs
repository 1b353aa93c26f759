//! Lexicon token walk. Pure function of the input text and the embedded
//! tables; no I/O, safe to call concurrently.

use serde::Serialize;

use super::lexicon;
use super::Label;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    /// Normalized per-word score, rounded to two decimals.
    pub score: f64,
    pub label: Label,
    /// 0..=100, grows with both polarity strength and evidence count.
    pub confidence: u32,
    pub positive_count: u32,
    pub negative_count: u32,
    pub analyzed_words: u32,
}

impl SentimentResult {
    fn neutral() -> Self {
        Self {
            score: 0.0,
            label: Label::Neutral,
            confidence: 0,
            positive_count: 0,
            negative_count: 0,
            analyzed_words: 0,
        }
    }
}

/// Score a single piece of text.
///
/// Token walk rules:
/// - a negator arms `negation` for the next sentiment word;
/// - an intensifier scales the next sentiment word's weight;
/// - both modifiers survive across non-sentiment words and reset only
///   after a scored word (so "not really good" sees negation *and* the
///   1.5 multiplier);
/// - a negated word contributes the inverted weight dampened by 0.5.
pub fn analyze(text: &str) -> SentimentResult {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            // Keep word characters, whitespace, apostrophe, hyphen;
            // everything else acts as whitespace.
            if c.is_alphanumeric() || c == '_' || c == '\'' || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut total = 0.0_f64;
    let mut analyzed_words = 0_u32;
    let mut positive_count = 0_u32;
    let mut negative_count = 0_u32;
    let mut intensifier = 1.0_f64;
    let mut negation = false;

    for word in cleaned.split_whitespace() {
        if lexicon::is_negator(word) {
            negation = true;
            continue;
        }
        if let Some(multiplier) = lexicon::intensifier(word) {
            intensifier = multiplier;
            continue;
        }

        let (weight, is_positive) = if let Some(w) = lexicon::positive_weight(word) {
            (w, true)
        } else if let Some(w) = lexicon::negative_weight(word) {
            (w, false)
        } else {
            continue;
        };

        let raw = weight * intensifier;
        let applied = if negation { -raw * 0.5 } else { raw };
        match (is_positive, negation) {
            (true, false) | (false, true) => positive_count += 1,
            _ => negative_count += 1,
        }
        total += applied;
        analyzed_words += 1;
        intensifier = 1.0;
        negation = false;
    }

    if analyzed_words == 0 {
        return SentimentResult::neutral();
    }

    let normalized = total / f64::from(analyzed_words);
    let confidence = (normalized.abs() * 40.0 + f64::from(analyzed_words) * 5.0)
        .round()
        .min(100.0) as u32;

    SentimentResult {
        score: (normalized * 100.0).round() / 100.0,
        label: Label::from_score(normalized),
        confidence,
        positive_count,
        negative_count,
        analyzed_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_noise_input_is_neutral() {
        for text in ["", "   ", "???!!!", "the a of"] {
            let r = analyze(text);
            assert_eq!(r.score, 0.0, "input {text:?}");
            assert_eq!(r.label, Label::Neutral);
            assert_eq!(r.confidence, 0);
            assert_eq!(r.analyzed_words, 0);
        }
    }

    #[test]
    fn single_positive_word() {
        let r = analyze("good");
        assert_eq!(r.score, 1.0);
        assert_eq!(r.label, Label::VeryPositive);
        assert_eq!(r.positive_count, 1);
        assert_eq!(r.analyzed_words, 1);
        // |1.0| * 40 + 1 * 5
        assert_eq!(r.confidence, 45);
    }

    #[test]
    fn negation_inverts_and_dampens() {
        let plain = analyze("good");
        let negated = analyze("not good");
        assert!(negated.score < plain.score);
        assert_eq!(negated.score, -0.5);
        assert_eq!(negated.negative_count, 1);
        assert_eq!(negated.positive_count, 0);

        // Negated negative becomes mild positive.
        let r = analyze("not terrible");
        assert_eq!(r.score, 1.5);
        assert_eq!(r.positive_count, 1);
    }

    #[test]
    fn intensifier_scales_the_next_sentiment_word() {
        let plain = analyze("good");
        let boosted = analyze("very good");
        assert_eq!(boosted.score, 1.5);
        assert!(boosted.score > plain.score);

        let dampened = analyze("slightly good");
        assert_eq!(dampened.score, 0.5);
    }

    #[test]
    fn modifiers_persist_across_unrelated_words() {
        // "really" and "not" both skip over "that" and still apply to "good".
        let r = analyze("not really that good");
        assert_eq!(r.score, -0.75);
        assert_eq!(r.negative_count, 1);
    }

    #[test]
    fn modifiers_reset_after_a_scored_word() {
        // "very" applies to "good" only; "bad" gets weight -2 unscaled.
        let r = analyze("very good but bad");
        // total = 1.5 + (-2.0) = -0.5 over 2 words
        assert_eq!(r.score, -0.25);
        assert_eq!(r.positive_count, 1);
        assert_eq!(r.negative_count, 1);
    }

    #[test]
    fn punctuation_acts_as_whitespace_but_apostrophes_survive() {
        let r = analyze("wasn't good, really!");
        // "wasn't" is a negator; "good" is negated: -0.5.
        assert_eq!(r.score, -0.5);
    }

    #[test]
    fn label_is_a_pure_function_of_score() {
        for text in [
            "amazing perfect wonderful",
            "good trip",
            "an average day",
            "bad and boring",
            "terrible awful worst",
            "not good",
            "very bad really terrible",
        ] {
            let r = analyze(text);
            assert_eq!(
                r.label,
                Label::from_score(r.score),
                "label must follow the ladder for {text:?}"
            );
        }
    }

    #[test]
    fn confidence_is_capped_at_100() {
        let long = "amazing ".repeat(40);
        let r = analyze(&long);
        assert_eq!(r.confidence, 100);
    }
}
