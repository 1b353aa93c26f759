//! # Natural-Language Tour Search
//!
//! Thin orchestration over the parser and the tour catalog: parse the
//! query, run the executable filter, and wrap the results with a
//! human-readable summary. Also hosts suggestion generation for
//! type-ahead.

pub mod parser;

use anyhow::Result;
use serde::Serialize;

use crate::catalog::{Tour, TourDirectory, TourFilter};
pub use parser::{parse_query, BoundRange, ParsedQuery};

const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub parsed_filters: ParsedQuery,
    pub results: usize,
    pub tours: Vec<Tour>,
    pub search_summary: String,
}

/// A parsed bound of zero is kept in `ParsedQuery` for transparency but
/// dropped from the executable filter ("1 day" produces min 0, which
/// would be a no-op bound anyway).
fn nonzero(bound: Option<u32>) -> Option<u32> {
    bound.filter(|v| *v != 0)
}

/// Lower the parsed query into an executable catalog filter.
pub fn to_filter(parsed: &ParsedQuery) -> TourFilter {
    TourFilter {
        price_min: nonzero(parsed.price_range.min).map(f64::from),
        price_max: nonzero(parsed.price_range.max).map(f64::from),
        duration_min: nonzero(parsed.duration_range.min),
        duration_max: nonzero(parsed.duration_range.max),
        difficulty: parsed.difficulty,
        keywords: parsed.keywords.clone(),
        sort: parsed.sort,
        limit: Some(parsed.limit),
    }
}

/// Parse the query, fetch matching tours, and summarize.
pub async fn search(catalog: &dyn TourDirectory, query: &str) -> Result<SearchOutcome> {
    let parsed = parse_query(query);
    let tours = catalog.find(&to_filter(&parsed)).await?;
    let search_summary = summarize(&parsed, tours.len());
    Ok(SearchOutcome {
        parsed_filters: parsed,
        results: tours.len(),
        tours,
        search_summary,
    })
}

/// One-sentence description of the applied filters.
fn summarize(parsed: &ParsedQuery, result_count: usize) -> String {
    let mut parts = Vec::new();

    if let Some(d) = parsed.difficulty {
        parts.push(format!("{d} difficulty"));
    }

    match (nonzero(parsed.price_range.min), nonzero(parsed.price_range.max)) {
        (Some(min), Some(max)) => parts.push(format!("${min}-${max}")),
        (None, Some(max)) => parts.push(format!("under ${max}")),
        (Some(min), None) => parts.push(format!("over ${min}")),
        (None, None) => {}
    }

    match (
        nonzero(parsed.duration_range.min),
        nonzero(parsed.duration_range.max),
    ) {
        (Some(min), Some(max)) => parts.push(format!("{min}-{max} days")),
        (None, Some(max)) => parts.push(format!("up to {max} days")),
        (Some(min), None) => parts.push(format!("{min}+ days")),
        (None, None) => {}
    }

    if !parsed.keywords.is_empty() {
        parts.push(format!("related to \"{}\"", parsed.keywords.join(", ")));
    }

    if parts.is_empty() {
        format!("Found {result_count} tours matching your search")
    } else {
        format!("Showing {result_count} tours: {}", parts.join(", "))
    }
}

/// Type-ahead suggestions for a partial query. Callers gate very short
/// input; anything under two characters is better served by nothing.
pub fn suggestions(partial: &str) -> Vec<String> {
    let lower = partial.to_lowercase();
    let mut out = Vec::new();

    for keyword in parser::ACTIVITY_KEYWORDS {
        let stem = &keyword[..3.min(keyword.len())];
        if keyword.starts_with(&lower) || lower.contains(stem) {
            out.push(format!("{keyword} tours"));
        }
    }

    if lower.contains("cheap") || lower.contains("budget") {
        out.push("budget tours under $500".to_string());
        out.push("cheap adventure tours".to_string());
    }

    if lower.contains("day") || lower.contains("week") {
        out.push("5-day hiking tours".to_string());
        out.push("weekend getaway tours".to_string());
        out.push("2-week adventure".to_string());
    }

    out.truncate(MAX_SUGGESTIONS);
    out
}
