//! Free-text search query parser: ordered regex extraction plus
//! first-match-wins keyword tables.
//!
//! Table order is part of the contract. The keyword tables are merged ON
//! TOP of the explicit numeric matches, so "cheap tours under $900" ends
//! up with the cheap-range max, not 900. That overwrite order is kept
//! deliberately; see DESIGN.md before touching it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::catalog::{Difficulty, SortField, SortSpec};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 20;

/// Optional inclusive bounds, either side may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl BoundRange {
    const fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Object-merge: fields present in `other` overwrite, absent ones keep
    /// the current value.
    fn merge(&mut self, other: BoundRange) {
        if other.min.is_some() {
            self.min = other.min;
        }
        if other.max.is_some() {
            self.max = other.max;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Structured filters parsed out of one search string. Built fresh per
/// query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub price_range: BoundRange,
    pub duration_range: BoundRange,
    pub difficulty: Option<Difficulty>,
    /// Matched activity terms plus quoted phrases, in match order.
    pub keywords: Vec<String>,
    pub sort: Option<SortSpec>,
    pub limit: usize,
    pub original_query: String,
}

// --- pattern tables (declared order is observable behavior) ---

static PRICE_KEYWORDS: &[(&str, BoundRange)] = &[
    ("cheap", BoundRange::new(None, Some(500))),
    ("budget", BoundRange::new(None, Some(500))),
    ("affordable", BoundRange::new(None, Some(700))),
    ("mid-range", BoundRange::new(Some(500), Some(1500))),
    ("moderate", BoundRange::new(Some(500), Some(1500))),
    ("expensive", BoundRange::new(Some(1500), None)),
    ("luxury", BoundRange::new(Some(2000), None)),
    ("premium", BoundRange::new(Some(2000), None)),
];

static DURATION_KEYWORDS: &[(&str, BoundRange)] = &[
    ("day trip", BoundRange::new(None, Some(1))),
    ("weekend", BoundRange::new(Some(2), Some(3))),
    ("short", BoundRange::new(None, Some(5))),
    ("week", BoundRange::new(Some(5), Some(10))),
    ("long", BoundRange::new(Some(10), None)),
    ("extended", BoundRange::new(Some(14), None)),
];

static DIFFICULTY_KEYWORDS: &[(&str, Difficulty)] = &[
    ("easy", Difficulty::Easy),
    ("beginner", Difficulty::Easy),
    ("family-friendly", Difficulty::Easy),
    ("family", Difficulty::Easy),
    ("relaxing", Difficulty::Easy),
    ("leisurely", Difficulty::Easy),
    ("moderate", Difficulty::Medium),
    ("medium", Difficulty::Medium),
    ("intermediate", Difficulty::Medium),
    ("challenging", Difficulty::Difficult),
    ("difficult", Difficulty::Difficult),
    ("hard", Difficulty::Difficult),
    ("advanced", Difficulty::Difficult),
    ("extreme", Difficulty::Difficult),
    ("adventure", Difficulty::Difficult),
];

pub(crate) static ACTIVITY_KEYWORDS: &[&str] = &[
    "hiking",
    "trekking",
    "walking",
    "climbing",
    "mountaineering",
    "beach",
    "coastal",
    "sea",
    "ocean",
    "island",
    "forest",
    "jungle",
    "wildlife",
    "safari",
    "nature",
    "city",
    "urban",
    "cultural",
    "historical",
    "museum",
    "adventure",
    "extreme",
    "sport",
    "water",
    "diving",
    "camping",
    "glamping",
    "outdoor",
    "scenic",
    "photography",
    "food",
    "culinary",
    "wine",
    "gastronomy",
    "desert",
    "mountain",
    "valley",
    "river",
    "lake",
    "snow",
    "ski",
    "winter",
    "summer",
    "spring",
    "autumn",
];

static SORT_PHRASES: &[(&str, SortField, i32)] = &[
    ("cheapest", SortField::Price, 1),
    ("lowest price", SortField::Price, 1),
    ("most affordable", SortField::Price, 1),
    ("most expensive", SortField::Price, -1),
    ("highest rated", SortField::RatingsAverage, -1),
    ("best rated", SortField::RatingsAverage, -1),
    ("top rated", SortField::RatingsAverage, -1),
    ("most popular", SortField::RatingsQuantity, -1),
    ("most reviewed", SortField::RatingsQuantity, -1),
    ("shortest", SortField::Duration, 1),
    ("longest", SortField::Duration, -1),
    ("newest", SortField::CreatedAt, -1),
];

static PRICE_UNDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"under\s*\$?(\d+)").expect("regex"));
static PRICE_OVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:over|above)\s*\$?(\d+)").expect("regex"));
static PRICE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?(\d+)\s*(?:[-–]|to)\s*\$?(\d+)").expect("regex"));
static PRICE_MAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"max(?:imum)?\s*\$?(\d+)").expect("regex"));
static DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*day").expect("regex"));
static WEEKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*week").expect("regex"));
static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("regex"));
static LIMIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:top|show|first|limit)\s*(\d+)").expect("regex"));

/// First captured integer, or `None` when absent or out of `u32` range
/// (an unparseable capture simply fails to match, it never errors).
fn capture_u32(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a free-text query into structured filters.
pub fn parse_query(query: &str) -> ParsedQuery {
    let lower = query.to_lowercase();

    let mut parsed = ParsedQuery {
        price_range: BoundRange::default(),
        duration_range: BoundRange::default(),
        difficulty: None,
        keywords: Vec::new(),
        sort: None,
        limit: DEFAULT_LIMIT,
        original_query: query.to_string(),
    };

    // 1) Explicit price patterns, in priority order; a later match
    //    overwrites the fields it sets.
    if let Some(max) = capture_u32(&PRICE_UNDER, &lower) {
        parsed.price_range.max = Some(max);
    }
    if let Some(min) = capture_u32(&PRICE_OVER, &lower) {
        parsed.price_range.min = Some(min);
    }
    if let Some(caps) = PRICE_RANGE.captures(&lower) {
        let min = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let max = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if let (Some(min), Some(max)) = (min, max) {
            parsed.price_range = BoundRange::new(Some(min), Some(max));
        }
    }
    if let Some(max) = capture_u32(&PRICE_MAX, &lower) {
        parsed.price_range.max = Some(max);
    }

    // 2) Price keyword table, first match wins, merged over the explicit
    //    values.
    for (keyword, range) in PRICE_KEYWORDS {
        if lower.contains(keyword) {
            parsed.price_range.merge(*range);
            break;
        }
    }

    // 3) Explicit duration, then the keyword table on top.
    if let Some(days) = capture_u32(&DAYS, &lower) {
        parsed.duration_range =
            BoundRange::new(Some(days.saturating_sub(1)), Some(days + 1));
    }
    if let Some(weeks) = capture_u32(&WEEKS, &lower) {
        let days = weeks * 7;
        parsed.duration_range =
            BoundRange::new(Some(days.saturating_sub(2)), Some(days + 2));
    }
    for (keyword, range) in DURATION_KEYWORDS {
        if lower.contains(keyword) {
            parsed.duration_range.merge(*range);
            break;
        }
    }

    // 4) Difficulty, first match wins.
    for (keyword, difficulty) in DIFFICULTY_KEYWORDS {
        if lower.contains(keyword) {
            parsed.difficulty = Some(*difficulty);
            break;
        }
    }

    // 5) Activity keywords: every match is kept, in declared order.
    for keyword in ACTIVITY_KEYWORDS {
        if lower.contains(keyword) {
            parsed.keywords.push((*keyword).to_string());
        }
    }
    // Quoted phrases become literal keywords (matched against the
    // original query so casing inside quotes survives).
    for caps in QUOTED.captures_iter(query) {
        if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
            parsed.keywords.push(m.as_str().to_string());
        }
    }

    // 6) Sort phrase, first match wins.
    for (phrase, field, direction) in SORT_PHRASES {
        if lower.contains(phrase) {
            parsed.sort = Some(SortSpec {
                field: *field,
                direction: *direction,
            });
            break;
        }
    }

    // 7) Limit, hard-capped.
    if let Some(n) = capture_u32(&LIMIT, &lower) {
        parsed.limit = (n as usize).min(MAX_LIMIT);
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_price_patterns() {
        let p = parse_query("tours under $500");
        assert_eq!(p.price_range, BoundRange::new(None, Some(500)));

        let p = parse_query("something over $300");
        assert_eq!(p.price_range, BoundRange::new(Some(300), None));

        let p = parse_query("tours above 250");
        assert_eq!(p.price_range.min, Some(250));

        let p = parse_query("$1000-$2000 trips");
        assert_eq!(p.price_range, BoundRange::new(Some(1000), Some(2000)));

        let p = parse_query("100 to 400 dollars");
        assert_eq!(p.price_range, BoundRange::new(Some(100), Some(400)));

        let p = parse_query("maximum $750");
        assert_eq!(p.price_range.max, Some(750));
    }

    #[test]
    fn keyword_range_overrides_explicit_price() {
        // Keyword merge lands after the explicit regexes, by contract.
        let p = parse_query("cheap tours under $900");
        assert_eq!(p.price_range.max, Some(500));

        // Keyword without a min leaves an explicit min alone.
        let p = parse_query("cheap tours over $100");
        assert_eq!(p.price_range, BoundRange::new(Some(100), Some(500)));
    }

    #[test]
    fn first_price_keyword_wins() {
        let p = parse_query("luxury but affordable");
        // "affordable" is declared earlier in the table.
        assert_eq!(p.price_range, BoundRange::new(None, Some(700)));
    }

    #[test]
    fn explicit_duration_gets_a_tolerance_band() {
        let p = parse_query("5 day trip");
        // "5 day" sets [4, 6]; the "day trip" keyword then caps max at 1.
        assert_eq!(p.duration_range, BoundRange::new(Some(4), Some(1)));

        let p = parse_query("5 days of hiking");
        assert_eq!(p.duration_range, BoundRange::new(Some(4), Some(6)));

        // "2 week" sets [12, 16], but the "week" keyword range then
        // overwrites both bounds. Keyword-over-explicit is the contract.
        let p = parse_query("2 week adventure");
        assert_eq!(p.duration_range, BoundRange::new(Some(5), Some(10)));
    }

    #[test]
    fn duration_keywords_merge_on_top() {
        let p = parse_query("weekend getaway");
        assert_eq!(p.duration_range, BoundRange::new(Some(2), Some(3)));

        let p = parse_query("a long 3 day outing");
        // Explicit [2, 4], then "long" overwrites min with 10.
        assert_eq!(p.duration_range, BoundRange::new(Some(10), Some(4)));
    }

    #[test]
    fn difficulty_first_match_wins() {
        assert_eq!(
            parse_query("easy family tour").difficulty,
            Some(Difficulty::Easy)
        );
        assert_eq!(
            parse_query("challenging but family friendly").difficulty,
            Some(Difficulty::Easy),
            "\"family\" is declared before \"challenging\""
        );
        assert_eq!(
            parse_query("intermediate trek").difficulty,
            Some(Difficulty::Medium)
        );
        assert_eq!(parse_query("somewhere sunny").difficulty, None);
    }

    #[test]
    fn every_activity_keyword_match_is_kept() {
        let p = parse_query("beach and hiking with wildlife");
        assert_eq!(p.keywords, vec!["hiking", "beach", "wildlife"]);
    }

    #[test]
    fn quoted_phrases_become_literal_keywords() {
        let p = parse_query(r#""scenic route" under $300"#);
        assert!(p.keywords.contains(&"scenic route".to_string()));
        assert_eq!(p.price_range.max, Some(300));

        let p = parse_query("tours like 'Northern Lights'");
        assert!(p.keywords.contains(&"Northern Lights".to_string()));
    }

    #[test]
    fn sort_phrases() {
        let p = parse_query("cheapest beach tours");
        assert_eq!(p.sort, Some(SortSpec::asc(SortField::Price)));

        let p = parse_query("highest rated trips");
        assert_eq!(p.sort, Some(SortSpec::desc(SortField::RatingsAverage)));

        assert_eq!(parse_query("beach trips").sort, None);
    }

    #[test]
    fn limit_is_parsed_and_capped() {
        assert_eq!(parse_query("top 5 tours").limit, 5);
        assert_eq!(parse_query("show 50 tours").limit, MAX_LIMIT);
        assert_eq!(parse_query("beach tours").limit, DEFAULT_LIMIT);
    }

    #[test]
    fn cheap_five_day_hiking_combines_all_filters() {
        let p = parse_query("cheap 5 day hiking tour");
        assert_eq!(p.price_range.max, Some(500));
        assert_eq!(p.duration_range, BoundRange::new(Some(4), Some(6)));
        assert!(p.keywords.contains(&"hiking".to_string()));
    }

    #[test]
    fn parsing_is_stateless_and_repeatable() {
        let q = "luxury 'wine country' trips, top 3, highest rated";
        assert_eq!(parse_query(q), parse_query(q));
    }

    #[test]
    fn absurd_numbers_fail_softly() {
        let p = parse_query("under $99999999999999999999");
        assert_eq!(p.price_range.max, None);
    }
}
