//! Intent classification: a fixed ordered list of compiled patterns over
//! the lowercased, trimmed message. First match wins; order is part of
//! the contract (e.g. "how much does it cost" must hit `PriceQuery`
//! before the fallback).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    Greeting,
    TourSearch,
    PriceQuery,
    DurationQuery,
    DifficultyQuery,
    LocationQuery,
    BookingHelp,
    TourDetails,
    PopularTours,
    Help,
    Thanks,
    Goodbye,
    Unknown,
}

static PATTERNS: Lazy<Vec<(Intent, Regex)>> = Lazy::new(|| {
    let compile = |intent, pattern| {
        (
            intent,
            Regex::new(pattern).expect("intent pattern compiles"),
        )
    };
    vec![
        compile(
            Intent::Greeting,
            r"^(hi|hello|hey|good morning|good evening|howdy)",
        ),
        compile(
            Intent::TourSearch,
            r"(find|search|show|looking for|want|need|recommend).*(tour|trip|vacation|adventure)",
        ),
        compile(
            Intent::PriceQuery,
            r"(price|cost|cheap|expensive|budget|afford|how much)",
        ),
        compile(
            Intent::DurationQuery,
            r"(how long|duration|days|week|short|long)",
        ),
        compile(
            Intent::DifficultyQuery,
            r"(easy|medium|difficult|hard|beginner|advanced|family)",
        ),
        compile(
            Intent::LocationQuery,
            r"(where|location|country|place|destination)",
        ),
        compile(
            Intent::BookingHelp,
            r"(book|booking|reserve|reservation|payment)",
        ),
        compile(
            Intent::TourDetails,
            r"(tell me about|details|information|info|what is)",
        ),
        compile(
            Intent::PopularTours,
            r"(popular|best|top|recommended|trending)",
        ),
        compile(Intent::Help, r"(help|assist|support|how do|what can)"),
        compile(Intent::Thanks, r"(thank|thanks|thx|appreciate)"),
        compile(Intent::Goodbye, r"(bye|goodbye|see you|later)"),
    ]
});

/// Classify a message. Expects arbitrary user input; the lowercasing and
/// trimming happen here so callers can pass text through untouched.
pub fn classify(message: &str) -> Intent {
    let normalized = message.to_lowercase();
    let normalized = normalized.trim();
    for (intent, pattern) in PATTERNS.iter() {
        if pattern.is_match(normalized) {
            return *intent;
        }
    }
    Intent::Unknown
}
