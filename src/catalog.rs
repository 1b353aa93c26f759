//! # Tour Catalog
//!
//! In-process data collaborator for the analyzers: tours, reviews, and
//! bookings behind async directory traits, plus an in-memory implementation
//! seeded from JSON config.
//!
//! - Loads from `config/catalog.json` (overridable via service config).
//! - Falls back to a built-in `default_seed()` when the file is missing
//!   or malformed.
//! - Filtering and sorting implement the executable-query semantics the
//!   search parser produces: inclusive range bounds, difficulty equality,
//!   case-insensitive OR-match of keywords over name/summary/description.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fmt, fs, path::Path};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Difficult => write!(f, "difficult"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image_cover: String,
    pub duration: u32,
    pub price: f64,
    pub ratings_average: f64,
    pub ratings_quantity: u32,
    pub difficulty: Difficulty,
    pub summary: String,
    pub description: String,
    pub max_group_size: u32,
    pub created_at: DateTime<Utc>,
}

/// A text-bearing review record. The body may live in either the `review`
/// or the `text` field depending on the producer; `body()` resolves the
/// precedence (`review` first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub tour_id: String,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub rating: f64,
}

impl Review {
    pub fn body(&self) -> &str {
        self.review
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub tour_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Price,
    RatingsAverage,
    RatingsQuantity,
    Duration,
    CreatedAt,
}

/// Sort key plus direction (`1` ascending, `-1` descending), mirroring the
/// shape the query parser emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: i32,
}

impl SortSpec {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: 1,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: -1,
        }
    }
}

impl Default for SortSpec {
    /// Rating-descending, the fallback when no sort phrase was parsed.
    fn default() -> Self {
        Self::desc(SortField::RatingsAverage)
    }
}

/// Executable tour query. All bounds are inclusive; `keywords` require an
/// OR-match over name/summary/description; `limit: None` means unbounded.
#[derive(Debug, Clone, Default)]
pub struct TourFilter {
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub duration_min: Option<u32>,
    pub duration_max: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub keywords: Vec<String>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

impl TourFilter {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
pub trait TourDirectory: Send + Sync {
    async fn find(&self, filter: &TourFilter) -> Result<Vec<Tour>>;
    async fn by_slug(&self, slug: &str) -> Result<Option<Tour>>;
    async fn by_id(&self, id: &str) -> Result<Option<Tour>>;
    /// Top tours by rating, ties broken by review count.
    async fn popular(&self, limit: usize) -> Result<Vec<Tour>>;
}

#[async_trait::async_trait]
pub trait ReviewDirectory: Send + Sync {
    async fn for_tour(&self, tour_id: &str) -> Result<Vec<Review>>;
    async fn all(&self) -> Result<Vec<Review>>;
}

#[async_trait::async_trait]
pub trait BookingDirectory: Send + Sync {
    async fn for_user(&self, user_id: &str) -> Result<Vec<Booking>>;
    /// Tour ids of bookings created at or after `since`, one entry per booking.
    async fn recent_tour_ids(&self, since: DateTime<Utc>) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tours: Vec<Tour>,
    #[serde(default)]
    reviews: Vec<Review>,
    #[serde(default)]
    bookings: Vec<Booking>,
}

/// Catalog backed by plain `Vec`s. Read-only after construction, so it is
/// safe to share behind an `Arc` without further locking.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    tours: Vec<Tour>,
    reviews: Vec<Review>,
    bookings: Vec<Booking>,
}

impl InMemoryCatalog {
    /// Load from a JSON file. Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str::<CatalogFile>(&s) {
                Ok(file) => Self {
                    tours: file.tours,
                    reviews: file.reviews,
                    bookings: file.bookings,
                },
                Err(e) => {
                    warn!(
                        "catalog file {} is not valid JSON ({}); using default seed",
                        path.as_ref().display(),
                        e
                    );
                    Self::default_seed()
                }
            },
            Err(_) => Self::default_seed(),
        }
    }

    pub fn tour_count(&self) -> usize {
        self.tours.len()
    }

    /// Built-in seed with a small but varied set of tours, enough for the
    /// chatbot and recommendation fallbacks to produce sensible output.
    pub fn default_seed() -> Self {
        let now = Utc::now();
        let tour = |id: &str,
                    name: &str,
                    slug: &str,
                    duration: u32,
                    price: f64,
                    ratings_average: f64,
                    ratings_quantity: u32,
                    difficulty: Difficulty,
                    summary: &str,
                    description: &str,
                    age_days: i64| Tour {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            image_cover: format!("{slug}-cover.jpg"),
            duration,
            price,
            ratings_average,
            ratings_quantity,
            difficulty,
            summary: summary.to_string(),
            description: description.to_string(),
            max_group_size: 15,
            created_at: now - Duration::days(age_days),
        };

        let tours = vec![
            tour(
                "t1",
                "The Forest Hiker",
                "the-forest-hiker",
                5,
                397.0,
                4.7,
                37,
                Difficulty::Easy,
                "Breathtaking hike through the Canadian Banff National Park",
                "Guided forest hiking with camping under the stars and wildlife spotting",
                400,
            ),
            tour(
                "t2",
                "The Sea Explorer",
                "the-sea-explorer",
                7,
                497.0,
                4.8,
                23,
                Difficulty::Medium,
                "Exploring the jaw-dropping US east coast by foot and by boat",
                "Coastal walking, beach camping and island hopping with diving stops",
                320,
            ),
            tour(
                "t3",
                "The Snow Adventurer",
                "the-snow-adventurer",
                4,
                997.0,
                4.5,
                13,
                Difficulty::Difficult,
                "Exciting adventure in the snow with snowboarding and skiing",
                "Extreme winter sport for advanced adventurers, ski and snow camping",
                250,
            ),
            tour(
                "t4",
                "The City Wanderer",
                "the-city-wanderer",
                9,
                1197.0,
                4.6,
                27,
                Difficulty::Easy,
                "Living the life of Wanderlust in the US' most beatiful cities",
                "Urban and cultural walking tour with museum visits and food stops",
                200,
            ),
            tour(
                "t5",
                "The Park Camper",
                "the-park-camper",
                10,
                1497.0,
                4.9,
                19,
                Difficulty::Medium,
                "Breathing in Nature in America's most spectacular National Parks",
                "Scenic nature photography, river rafting and camping in the valley",
                150,
            ),
            tour(
                "t6",
                "The Sports Lover",
                "the-sports-lover",
                14,
                2997.0,
                4.4,
                11,
                Difficulty::Difficult,
                "Surfing, kayaking, canyoning, mountain biking and more, all in one tour",
                "Adventure sport marathon for the extreme athlete, water and mountain",
                90,
            ),
            tour(
                "t7",
                "The Wine Taster",
                "the-wine-taster",
                5,
                1997.0,
                4.5,
                30,
                Difficulty::Easy,
                "Exquisite wines, scenic views, exclusive barrel tastings",
                "Culinary and wine gastronomy tour through sun-soaked vineyards",
                60,
            ),
            tour(
                "t8",
                "The Star Gazer",
                "the-star-gazer",
                9,
                2997.0,
                4.7,
                22,
                Difficulty::Medium,
                "The most remote and stunningly beautiful places for seeing the night sky",
                "Desert camping and night photography far from the city lights",
                30,
            ),
        ];

        let review = |tour_id: &str, text: &str, rating: f64| Review {
            tour_id: tour_id.to_string(),
            review: Some(text.to_string()),
            text: None,
            rating,
        };

        let reviews = vec![
            review("t1", "Amazing tour, the guides were very friendly and helpful", 5.0),
            review("t1", "Really good experience, beautiful scenery and easy pace", 4.0),
            review("t1", "The trail was crowded and the lunch was disappointing", 2.0),
            review("t2", "Absolutely wonderful week, unforgettable sunsets on the coast", 5.0),
            review("t2", "Boring stops and a rude skipper, not worth the price", 2.0),
            review("t5", "Perfect camping trip, clean gear and professional staff", 5.0),
            review("t5", "Great value, highly recommend the rafting day", 4.5),
        ];

        let booking = |tour_id: &str, user_id: &str, age_days: i64| Booking {
            tour_id: tour_id.to_string(),
            user_id: user_id.to_string(),
            created_at: now - Duration::days(age_days),
        };

        let bookings = vec![
            booking("t1", "u1", 45),
            booking("t2", "u1", 20),
            booking("t5", "u2", 12),
            booking("t5", "u3", 8),
            booking("t8", "u2", 3),
        ];

        Self {
            tours,
            reviews,
            bookings,
        }
    }

    fn matches(&self, tour: &Tour, filter: &TourFilter) -> bool {
        if let Some(min) = filter.price_min {
            if tour.price < min {
                return false;
            }
        }
        if let Some(max) = filter.price_max {
            if tour.price > max {
                return false;
            }
        }
        if let Some(min) = filter.duration_min {
            if tour.duration < min {
                return false;
            }
        }
        if let Some(max) = filter.duration_max {
            if tour.duration > max {
                return false;
            }
        }
        if let Some(d) = filter.difficulty {
            if tour.difficulty != d {
                return false;
            }
        }
        if !filter.keywords.is_empty() {
            // One regex per keyword, OR across keywords and fields.
            let hit = filter.keywords.iter().any(|k| {
                match RegexBuilder::new(&regex::escape(k))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(re) => {
                        re.is_match(&tour.name)
                            || re.is_match(&tour.summary)
                            || re.is_match(&tour.description)
                    }
                    Err(_) => false,
                }
            });
            if !hit {
                return false;
            }
        }
        true
    }

    fn sort_tours(tours: &mut [Tour], spec: SortSpec) {
        tours.sort_by(|a, b| {
            let ord = match spec.field {
                SortField::Price => a.price.total_cmp(&b.price),
                SortField::RatingsAverage => a.ratings_average.total_cmp(&b.ratings_average),
                SortField::RatingsQuantity => a.ratings_quantity.cmp(&b.ratings_quantity),
                SortField::Duration => a.duration.cmp(&b.duration),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            if spec.direction < 0 {
                ord.reverse()
            } else {
                ord
            }
        });
    }
}

#[async_trait::async_trait]
impl TourDirectory for InMemoryCatalog {
    async fn find(&self, filter: &TourFilter) -> Result<Vec<Tour>> {
        let mut out: Vec<Tour> = self
            .tours
            .iter()
            .filter(|t| self.matches(t, filter))
            .cloned()
            .collect();
        Self::sort_tours(&mut out, filter.sort.unwrap_or_default());
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn by_slug(&self, slug: &str) -> Result<Option<Tour>> {
        Ok(self.tours.iter().find(|t| t.slug == slug).cloned())
    }

    async fn by_id(&self, id: &str) -> Result<Option<Tour>> {
        Ok(self.tours.iter().find(|t| t.id == id).cloned())
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Tour>> {
        let mut out = self.tours.clone();
        out.sort_by(|a, b| {
            b.ratings_average
                .total_cmp(&a.ratings_average)
                .then(b.ratings_quantity.cmp(&a.ratings_quantity))
        });
        out.truncate(limit);
        Ok(out)
    }
}

#[async_trait::async_trait]
impl ReviewDirectory for InMemoryCatalog {
    async fn for_tour(&self, tour_id: &str) -> Result<Vec<Review>> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| r.tour_id == tour_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Review>> {
        Ok(self.reviews.clone())
    }
}

#[async_trait::async_trait]
impl BookingDirectory for InMemoryCatalog {
    async fn for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn recent_tour_ids(&self, since: DateTime<Utc>) -> Result<Vec<String>> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.created_at >= since)
            .map(|b| b.tour_id.clone())
            .collect())
    }
}

/// Count occurrences, highest first. Ties broken by the caller.
pub fn count_by_id(ids: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id.clone()).or_insert(0) += 1;
    }
    counts
}
