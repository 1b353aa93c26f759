//! # Chat Engine
//!
//! Stateless intent-to-response mapping for the tour assistant. Every
//! call is independent: classify the message, run the handler for that
//! intent, return a `ChatResponse`. No conversation history is kept.

pub mod intent;
mod responder;

use std::sync::Arc;

use anyhow::Result;
use rand::Rng;
use serde::Serialize;

use crate::catalog::{Difficulty, Tour, TourDirectory};
pub use intent::{classify, Intent};

/// Picks an index in `0..len` for randomized canned templates. Injectable
/// so tests can pin the choice.
pub type TemplatePicker = Arc<dyn Fn(usize) -> usize + Send + Sync>;

fn default_picker() -> TemplatePicker {
    Arc::new(|len| rand::rng().random_range(0..len))
}

/// Compact tour projection for chat replies.
#[derive(Debug, Clone, Serialize)]
pub struct TourCard {
    pub name: String,
    pub slug: String,
    pub image_cover: String,
    pub duration: u32,
    pub price: f64,
    pub ratings_average: f64,
    pub difficulty: Difficulty,
    pub summary: String,
}

impl From<&Tour> for TourCard {
    fn from(t: &Tour) -> Self {
        Self {
            name: t.name.clone(),
            slug: t.slug.clone(),
            image_cover: t.image_cover.clone(),
            duration: t.duration,
            price: t.price,
            ratings_average: t.ratings_average,
            difficulty: t.difficulty,
            summary: t.summary.clone(),
        }
    }
}

/// Reply payload. `message` may carry lightweight markup (bold markers,
/// line breaks, bullets); `suggestions` are follow-up queries for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub tours: Vec<TourCard>,
    pub suggestions: Vec<String>,
}

impl ChatResponse {
    fn canned(message: impl Into<String>, suggestions: &[&str]) -> Self {
        Self {
            message: message.into(),
            tours: Vec::new(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn with_tours(message: impl Into<String>, tours: &[Tour], suggestions: &[&str]) -> Self {
        Self {
            message: message.into(),
            tours: tours.iter().map(TourCard::from).collect(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct ChatEngine {
    tours: Arc<dyn TourDirectory>,
    picker: TemplatePicker,
}

impl ChatEngine {
    pub fn new(tours: Arc<dyn TourDirectory>) -> Self {
        Self {
            tours,
            picker: default_picker(),
        }
    }

    /// Replace the template random source (tests pin it to a fixed index).
    pub fn with_picker(mut self, picker: TemplatePicker) -> Self {
        self.picker = picker;
        self
    }

    /// Classify and respond. Catalog failures propagate; the intentional
    /// fallbacks (no match → popular tours) are handled inside the
    /// individual responders.
    pub async fn process_message(&self, message: &str) -> Result<ChatResponse> {
        let intent = classify(message);
        self.respond(intent, message).await
    }

    async fn respond(&self, intent: Intent, message: &str) -> Result<ChatResponse> {
        match intent {
            Intent::Greeting => Ok(self.greeting()),
            Intent::TourSearch => self.tour_search(message).await,
            Intent::PriceQuery => self.price_query(message).await,
            Intent::DurationQuery => self.duration_query(message).await,
            Intent::DifficultyQuery => self.difficulty_query(message).await,
            Intent::PopularTours => self.popular_tours().await,
            Intent::BookingHelp => Ok(Self::booking_help()),
            Intent::Help => Ok(Self::help()),
            Intent::Thanks => Ok(self.thanks()),
            Intent::Goodbye => Ok(Self::goodbye()),
            Intent::TourDetails => self.tour_details(message).await,
            // The location intent has no dedicated handler; it rides the
            // same fallback search as unknown input.
            Intent::LocationQuery | Intent::Unknown => self.fallback_search(message).await,
        }
    }
}
