//! Roll-up of per-review sentiment into one record per tour: label
//! distribution, mean score, and a handful of highlight snippets.

use serde::Serialize;

use super::scorer::{analyze, SentimentResult};
use super::Label;
use crate::catalog::Review;

const HIGHLIGHT_COUNT: usize = 3;
const SNIPPET_CHARS: usize = 100;

/// Per-label review counts. Also reused for the percent breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub very_positive: u32,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    pub very_negative: u32,
}

impl Distribution {
    fn bump(&mut self, label: Label) {
        match label {
            Label::VeryPositive => self.very_positive += 1,
            Label::Positive => self.positive += 1,
            Label::Neutral => self.neutral += 1,
            Label::Negative => self.negative += 1,
            Label::VeryNegative => self.very_negative += 1,
        }
    }

    fn percent_of(&self, total: u32) -> Distribution {
        let pct = |count: u32| {
            if total == 0 {
                0
            } else {
                ((f64::from(count) / f64::from(total)) * 100.0).round() as u32
            }
        };
        Distribution {
            very_positive: pct(self.very_positive),
            positive: pct(self.positive),
            neutral: pct(self.neutral),
            negative: pct(self.negative),
            very_negative: pct(self.very_negative),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSentiment {
    pub overall: Label,
    pub average_score: f64,
    pub total_reviews: u32,
    pub distribution: Distribution,
    pub distribution_percent: Distribution,
    pub highlights: Highlights,
}

impl AggregateSentiment {
    fn empty() -> Self {
        Self {
            overall: Label::Neutral,
            average_score: 0.0,
            total_reviews: 0,
            distribution: Distribution::default(),
            distribution_percent: Distribution::default(),
            highlights: Highlights::default(),
        }
    }
}

/// Analyze a batch of reviews. Empty input yields the zeroed neutral
/// record rather than an error.
pub fn analyze_reviews(reviews: &[Review]) -> AggregateSentiment {
    if reviews.is_empty() {
        return AggregateSentiment::empty();
    }

    let mut results: Vec<(SentimentResult, &str)> = reviews
        .iter()
        .map(|r| (analyze(r.body()), r.body()))
        .collect();

    let mut distribution = Distribution::default();
    let mut total_score = 0.0;
    for (result, _) in &results {
        distribution.bump(result.label);
        total_score += result.score;
    }

    let total = reviews.len() as u32;
    let average = total_score / f64::from(total);

    results.sort_by(|a, b| b.0.score.total_cmp(&a.0.score));

    let positive: Vec<String> = results
        .iter()
        .take(HIGHLIGHT_COUNT)
        .filter(|(r, _)| r.score > 0.0)
        .map(|(_, text)| snippet(text))
        .collect();
    let tail_start = results.len().saturating_sub(HIGHLIGHT_COUNT);
    let negative: Vec<String> = results[tail_start..]
        .iter()
        .rev()
        .filter(|(r, _)| r.score < 0.0)
        .map(|(_, text)| snippet(text))
        .collect();

    AggregateSentiment {
        overall: Label::from_average(average),
        average_score: (average * 100.0).round() / 100.0,
        total_reviews: total,
        distribution_percent: distribution.percent_of(total),
        distribution,
        highlights: Highlights { positive, negative },
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}
