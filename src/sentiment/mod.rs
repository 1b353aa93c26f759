//! # Review Sentiment
//!
//! Lexicon-weighted sentiment scoring for short review text, an aggregate
//! roll-up over many reviews, and an independent spam heuristic. All of it
//! is deterministic: pure functions over the static tables in `lexicon`.

mod aggregate;
mod lexicon;
mod scorer;
mod spam;

pub use aggregate::{analyze_reviews, AggregateSentiment, Distribution, Highlights};
pub use scorer::{analyze, SentimentResult};
pub use spam::{detect_spam, RiskLevel, SpamFlagResult};

use serde::{Deserialize, Serialize};

/// Polarity label reported to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

impl Label {
    /// Per-review threshold ladder over the normalized per-word score.
    pub fn from_score(normalized: f64) -> Self {
        if normalized >= 1.0 {
            Label::VeryPositive
        } else if normalized >= 0.3 {
            Label::Positive
        } else if normalized <= -1.0 {
            Label::VeryNegative
        } else if normalized <= -0.3 {
            Label::Negative
        } else {
            Label::Neutral
        }
    }

    /// Aggregate ladder. Intentionally tighter than the per-review one:
    /// averages over many reviews cluster near zero.
    pub fn from_average(average: f64) -> Self {
        if average >= 0.5 {
            Label::VeryPositive
        } else if average >= 0.2 {
            Label::Positive
        } else if average <= -0.5 {
            Label::VeryNegative
        } else if average <= -0.2 {
            Label::Negative
        } else {
            Label::Neutral
        }
    }
}
