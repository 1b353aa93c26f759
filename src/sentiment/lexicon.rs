//! # Review Lexicon
//!
//! Static weighted word tables backing the sentiment scorer:
//!
//! - Positive and negative terms with integer weights in `-3..=3`.
//! - Intensifiers that multiply the next sentiment word's weight.
//! - Negators that flip the polarity of the next sentiment word.
//!
//! Loaded once from the embedded `review_lexicon.json`; never mutated at
//! runtime. Lookups are case-sensitive and expect lowercased tokens.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Deserialize)]
struct LexiconFile {
    positive: HashMap<String, i32>,
    negative: HashMap<String, i32>,
    intensifiers: HashMap<String, f64>,
    negators: HashSet<String>,
}

static LEXICON: Lazy<LexiconFile> = Lazy::new(|| {
    let raw = include_str!("../../review_lexicon.json");
    serde_json::from_str::<LexiconFile>(raw).expect("valid review lexicon")
});

/// Weight of a positive term, if the word is one.
#[inline]
pub(crate) fn positive_weight(word: &str) -> Option<f64> {
    LEXICON.positive.get(word).map(|w| f64::from(*w))
}

/// Weight of a negative term, if the word is one.
#[inline]
pub(crate) fn negative_weight(word: &str) -> Option<f64> {
    LEXICON.negative.get(word).map(|w| f64::from(*w))
}

/// Multiplier for an intensifier token, if the word is one.
#[inline]
pub(crate) fn intensifier(word: &str) -> Option<f64> {
    LEXICON.intensifiers.get(word).copied()
}

#[inline]
pub(crate) fn is_negator(word: &str) -> bool {
    LEXICON.negators.contains(word)
}
