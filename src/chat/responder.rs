//! Per-intent response handlers. Canned intents pick among fixed
//! templates via the injected picker; data-driven intents query the tour
//! catalog with filters extracted from the message.
//!
//! Filter extraction here is independent of the search parser: the
//! chatbot uses looser defaults (a bare "$800" means "up to $800", a day
//! count gets a ±2 band floored at 1).

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ChatEngine, ChatResponse};
use crate::catalog::{Difficulty, SortField, SortSpec, Tour, TourFilter};

const SEARCH_FETCH_LIMIT: usize = 6;
const SEARCH_REPLY_LIMIT: usize = 4;
const QUERY_REPLY_LIMIT: usize = 4;
const FALLBACK_REPLY_LIMIT: usize = 3;
const MIN_SEARCH_TERM_CHARS: usize = 4;

static GREETINGS: &[&str] = &[
    "Hello! Welcome to TripMind! I'm your travel assistant. How can I help you find your perfect adventure today?",
    "Hi there! I'm here to help you discover amazing tours. What kind of adventure are you looking for?",
    "Hey! Ready to explore the world? Tell me what you're looking for - budget, duration, difficulty - and I'll find the perfect tour for you!",
];

static THANKS_REPLIES: &[&str] = &[
    "You're welcome! Happy to help. Let me know if you need anything else!",
    "My pleasure! Feel free to ask if you have more questions about tours!",
    "Anytime! Excited to help you find your perfect adventure!",
];

static DOLLAR_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?(\d+)").expect("regex"));
static BARE_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").expect("regex"));
static DAY_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*day").expect("regex"));

/// Filters the chatbot pulls out of a message before querying the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct MessageFilters {
    pub max_price: Option<f64>,
    pub duration_days: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

/// Extract price/duration/difficulty hints. The three difficulty checks
/// run in declared order and each overwrites the previous, so a message
/// matching several keeps the last one (easy < medium < difficult in
/// precedence terms is NOT the rule here; source order is).
pub(super) fn extract_filters(message: &str) -> MessageFilters {
    let lower = message.to_lowercase();
    let mut filters = MessageFilters::default();

    if let Some(n) = BARE_DOLLAR
        .captures(&lower)
        .and_then(|c| c[1].parse::<u32>().ok())
    {
        filters.max_price = Some(f64::from(n));
    } else if lower.contains("cheap") || lower.contains("budget") {
        filters.max_price = Some(500.0);
    }

    if let Some(n) = DAY_COUNT
        .captures(&lower)
        .and_then(|c| c[1].parse::<u32>().ok())
    {
        filters.duration_days = Some(n);
    }

    if lower.contains("easy") || lower.contains("beginner") {
        filters.difficulty = Some(Difficulty::Easy);
    }
    if lower.contains("medium") || lower.contains("moderate") {
        filters.difficulty = Some(Difficulty::Medium);
    }
    if lower.contains("hard") || lower.contains("difficult") {
        filters.difficulty = Some(Difficulty::Difficult);
    }

    filters
}

impl MessageFilters {
    fn to_tour_filter(self) -> TourFilter {
        TourFilter {
            price_max: self.max_price,
            duration_min: self.duration_days.map(|d| d.saturating_sub(2).max(1)),
            duration_max: self.duration_days.map(|d| d + 2),
            difficulty: self.difficulty,
            limit: Some(SEARCH_FETCH_LIMIT),
            ..TourFilter::default()
        }
    }
}

impl ChatEngine {
    fn pick<'a>(&self, templates: &'a [&'a str]) -> &'a str {
        templates[(self.picker)(templates.len()) % templates.len()]
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Tour>> {
        self.tours.popular(limit).await
    }

    pub(super) fn greeting(&self) -> ChatResponse {
        ChatResponse::canned(
            self.pick(GREETINGS),
            &[
                "Show popular tours",
                "Tours under $1000",
                "Easy family tours",
                "Adventure trips",
            ],
        )
    }

    /// Fixed opener shown before the user has said anything (unlike
    /// `greeting`, never randomized).
    pub fn welcome(&self) -> ChatResponse {
        ChatResponse::canned(
            GREETINGS[0],
            &[
                "Show popular tours",
                "Tours under $1000",
                "Easy family tours",
                "Adventure trips",
            ],
        )
    }

    pub(super) fn thanks(&self) -> ChatResponse {
        ChatResponse::canned(
            self.pick(THANKS_REPLIES),
            &["Show popular tours", "Help me find a tour", "Booking info"],
        )
    }

    pub(super) fn goodbye() -> ChatResponse {
        ChatResponse::canned(
            "Goodbye! Thanks for chatting with TripMind. Have an amazing adventure!",
            &[],
        )
    }

    pub(super) fn booking_help() -> ChatResponse {
        ChatResponse::canned(
            "**Booking with TripMind is easy!**\n\n\
             1. **Browse** - Find your perfect tour\n\
             2. **Select Date** - Choose from available start dates\n\
             3. **Book** - Secure checkout\n\
             4. **Prepare** - Receive confirmation & packing list\n\n\
             **Need help?** Just ask me about any tour and I'll guide you through!",
            &["Show available tours", "Payment methods?", "Cancellation policy"],
        )
    }

    pub(super) fn help() -> ChatResponse {
        ChatResponse::canned(
            "**I'm your TripMind assistant!**\n\n\
             I can help you with:\n\
             * **Find tours** - \"Show me adventure tours\"\n\
             * **Budget search** - \"Tours under $500\"\n\
             * **Duration** - \"5-day trips\"\n\
             * **Difficulty** - \"Easy family tours\"\n\
             * **Recommendations** - \"Popular tours\"\n\
             * **Booking help** - \"How to book?\"\n\n\
             Just type what you're looking for!",
            &["Popular tours", "Budget tours", "Adventure trips", "Family vacations"],
        )
    }

    pub(super) async fn tour_search(&self, message: &str) -> Result<ChatResponse> {
        let filters = extract_filters(message);
        let tours = self.tours.find(&filters.to_tour_filter()).await?;

        if tours.is_empty() {
            let alternatives = self.popular(FALLBACK_REPLY_LIMIT).await?;
            return Ok(ChatResponse::with_tours(
                "I couldn't find tours matching your criteria. Let me show you some alternatives!",
                &alternatives,
                &["Show all tours", "Adjust my budget", "Different difficulty"],
            ));
        }

        let plural = if tours.len() > 1 { "s" } else { "" };
        let message = format!(
            "Great news! I found {} tour{} that match your preferences:",
            tours.len(),
            plural
        );
        let shown = &tours[..tours.len().min(SEARCH_REPLY_LIMIT)];
        Ok(ChatResponse::with_tours(
            message,
            shown,
            &[
                "Tell me more about the first one",
                "Show cheaper options",
                "Different duration",
            ],
        ))
    }

    pub(super) async fn price_query(&self, message: &str) -> Result<ChatResponse> {
        let lower = message.to_lowercase();
        let mut max_price = DOLLAR_AMOUNT
            .captures(&lower)
            .and_then(|c| c[1].parse::<u32>().ok())
            .map_or(1000.0, f64::from);
        if ["cheap", "budget", "affordable"].iter().any(|k| lower.contains(k)) {
            max_price = 500.0;
        }
        if ["expensive", "luxury", "premium"].iter().any(|k| lower.contains(k)) {
            max_price = 10_000.0;
        }

        let filter = TourFilter {
            price_max: Some(max_price),
            sort: Some(SortSpec::asc(SortField::Price)),
            limit: Some(QUERY_REPLY_LIMIT),
            ..TourFilter::default()
        };
        let tours = self.tours.find(&filter).await?;

        if tours.is_empty() {
            let cheapest = self
                .tours
                .find(&TourFilter {
                    sort: Some(SortSpec::asc(SortField::Price)),
                    limit: Some(FALLBACK_REPLY_LIMIT),
                    ..TourFilter::default()
                })
                .await?;
            return Ok(ChatResponse::with_tours(
                format!(
                    "I couldn't find tours under ${max_price:.0}. \
                     Our most affordable tour starts at a great price though!"
                ),
                &cheapest,
                &["Show cheapest tours", "Increase budget", "Payment plans available?"],
            ));
        }

        Ok(ChatResponse::with_tours(
            format!("Here are tours within your budget (under ${max_price:.0}):"),
            &tours,
            &["Show more options", "What's included?", "Group discounts?"],
        ))
    }

    pub(super) async fn duration_query(&self, message: &str) -> Result<ChatResponse> {
        let lower = message.to_lowercase();
        let mut min_duration = 1u32;
        let mut max_duration = 30u32;

        if ["short", "quick", "weekend"].iter().any(|k| lower.contains(k)) {
            max_duration = 5;
        } else if lower.contains("week") {
            min_duration = 5;
            max_duration = 10;
        } else if lower.contains("long") || lower.contains("extended") {
            min_duration = 10;
        }

        if let Some(days) = DAY_COUNT
            .captures(&lower)
            .and_then(|c| c[1].parse::<u32>().ok())
        {
            min_duration = days.saturating_sub(2).max(1);
            max_duration = days + 2;
        }

        let filter = TourFilter {
            duration_min: Some(min_duration),
            duration_max: Some(max_duration),
            limit: Some(QUERY_REPLY_LIMIT),
            ..TourFilter::default()
        };
        let tours = self.tours.find(&filter).await?;

        let span = if min_duration == max_duration {
            format!("{min_duration}-day")
        } else {
            format!("{min_duration}-{max_duration} day")
        };
        Ok(ChatResponse::with_tours(
            format!("Here are {span} tours:"),
            &tours,
            &["Shorter trips", "Longer adventures", "Most popular duration"],
        ))
    }

    pub(super) async fn difficulty_query(&self, message: &str) -> Result<ChatResponse> {
        let lower = message.to_lowercase();
        // Else-if chain: easy wins over difficult here, default medium.
        let difficulty = if ["easy", "beginner", "family", "relax"]
            .iter()
            .any(|k| lower.contains(k))
        {
            Difficulty::Easy
        } else if ["hard", "difficult", "challenging", "advanced", "extreme"]
            .iter()
            .any(|k| lower.contains(k))
        {
            Difficulty::Difficult
        } else {
            Difficulty::Medium
        };

        let filter = TourFilter {
            difficulty: Some(difficulty),
            limit: Some(QUERY_REPLY_LIMIT),
            ..TourFilter::default()
        };
        let tours = self.tours.find(&filter).await?;

        Ok(ChatResponse::with_tours(
            format!("Here are {difficulty} level tours perfect for you:"),
            &tours,
            &[
                "Try different difficulty",
                "Family-friendly options",
                "What gear do I need?",
            ],
        ))
    }

    pub(super) async fn popular_tours(&self) -> Result<ChatResponse> {
        let tours = self.popular(QUERY_REPLY_LIMIT).await?;
        Ok(ChatResponse::with_tours(
            "Here are our most popular tours loved by travelers worldwide:",
            &tours,
            &["Budget-friendly options", "Adventure tours", "Relaxing getaways"],
        ))
    }

    pub(super) async fn tour_details(&self, message: &str) -> Result<ChatResponse> {
        let lower = message.to_lowercase();
        let all = self.tours.find(&TourFilter::default()).await?;
        let matched = all
            .iter()
            .find(|t| lower.contains(&t.name.to_lowercase()) || lower.contains(t.slug.as_str()));

        if let Some(tour) = matched {
            let message = format!(
                "**{}**\n\n{}\n\n\
                 * **Duration:** {} days\n\
                 * **Difficulty:** {}\n\
                 * **Price:** ${:.0} per person\n\
                 * **Group Size:** Max {} people\n\
                 * **Rating:** {} ({} reviews)\n\n\
                 Would you like to book this tour?",
                tour.name,
                tour.summary,
                tour.duration,
                tour.difficulty,
                tour.price,
                tour.max_group_size,
                tour.ratings_average,
                tour.ratings_quantity,
            );
            return Ok(ChatResponse::with_tours(
                message,
                std::slice::from_ref(tour),
                &["Book this tour", "Similar tours", "See reviews"],
            ));
        }

        let options = self.popular(QUERY_REPLY_LIMIT).await?;
        Ok(ChatResponse::with_tours(
            "Which tour would you like to know more about? Here are some options:",
            &options,
            &["Tell me about the first one", "Show all tours"],
        ))
    }

    /// Keyword search for unclassified messages: the first term (longer
    /// than three characters) with any hits wins; otherwise fall back to
    /// popular tours. Never errors on empty results.
    pub(super) async fn fallback_search(&self, message: &str) -> Result<ChatResponse> {
        let lower = message.to_lowercase();
        let terms = lower
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_SEARCH_TERM_CHARS);

        for term in terms {
            let filter = TourFilter {
                keywords: vec![term.to_string()],
                limit: Some(QUERY_REPLY_LIMIT),
                ..TourFilter::default()
            };
            let found = self.tours.find(&filter).await?;
            if !found.is_empty() {
                return Ok(ChatResponse::with_tours(
                    "Based on your query, here's what I found:",
                    &found,
                    &["Tell me more", "Different options", "Help"],
                ));
            }
        }

        let popular = self.popular(FALLBACK_REPLY_LIMIT).await?;
        Ok(ChatResponse::with_tours(
            "I'm not sure I understood that completely. \
             Here are some popular tours you might like, or try asking differently!",
            &popular,
            &["Help", "Popular tours", "Budget tours", "Adventure trips"],
        ))
    }
}
