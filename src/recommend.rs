//! # Recommendation Engine
//!
//! Content-based tour recommendations over booking history plus
//! popularity fallbacks. Heuristics only: a preference profile averaged
//! from booked tours drives a catalog query, and every pick carries a
//! short human-readable reason.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::catalog::{
    count_by_id, BookingDirectory, Difficulty, SortField, SortSpec, Tour, TourDirectory,
    TourFilter,
};

const TRENDING_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_LIMIT: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub tour: Tour,
    pub reason: String,
}

/// What a user's booking history says about their taste. Price and
/// duration are plain means; difficulty is the most frequent one.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceProfile {
    pub avg_price: f64,
    pub avg_duration: f64,
    pub preferred_difficulty: Difficulty,
}

impl PreferenceProfile {
    fn from_tours(tours: &[Tour]) -> Self {
        let n = tours.len() as f64;
        let avg_price = tours.iter().map(|t| t.price).sum::<f64>() / n;
        let avg_duration = tours.iter().map(|t| f64::from(t.duration)).sum::<f64>() / n;

        let mut counts: HashMap<Difficulty, usize> = HashMap::new();
        for t in tours {
            *counts.entry(t.difficulty).or_insert(0) += 1;
        }
        // Stable tie-break: scan in a fixed order so equal counts always
        // resolve the same way.
        let preferred_difficulty = [Difficulty::Easy, Difficulty::Medium, Difficulty::Difficult]
            .into_iter()
            .max_by_key(|d| counts.get(d).copied().unwrap_or(0))
            .unwrap_or(Difficulty::Medium);

        Self {
            avg_price,
            avg_duration,
            preferred_difficulty,
        }
    }
}

pub struct Recommender {
    tours: Arc<dyn TourDirectory>,
    bookings: Arc<dyn BookingDirectory>,
}

impl Recommender {
    pub fn new(tours: Arc<dyn TourDirectory>, bookings: Arc<dyn BookingDirectory>) -> Self {
        Self { tours, bookings }
    }

    /// Personalized picks. Users without booking history get the popular
    /// list.
    pub async fn personalized(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>> {
        let bookings = self.bookings.for_user(user_id).await?;
        if bookings.is_empty() {
            return self.popular(limit).await;
        }

        let mut booked_ids = Vec::new();
        let mut booked_tours = Vec::new();
        for booking in &bookings {
            if let Some(tour) = self.tours.by_id(&booking.tour_id).await? {
                booked_ids.push(tour.id.clone());
                booked_tours.push(tour);
            }
        }
        if booked_tours.is_empty() {
            return self.popular(limit).await;
        }

        let profile = PreferenceProfile::from_tours(&booked_tours);

        // Price within +-50% of the average; duration within
        // +-max(2, avg/2), floored at one day.
        let price_band = profile.avg_price * 0.5;
        let duration_band = (profile.avg_duration * 0.5).max(2.0);
        let filter = TourFilter {
            price_min: Some(profile.avg_price - price_band),
            price_max: Some(profile.avg_price + price_band),
            duration_min: Some((profile.avg_duration - duration_band).max(1.0) as u32),
            duration_max: Some((profile.avg_duration + duration_band) as u32),
            difficulty: Some(profile.preferred_difficulty),
            sort: Some(SortSpec::desc(SortField::RatingsAverage)),
            limit: None,
            ..TourFilter::default()
        };

        let mut picks: Vec<Tour> = self
            .tours
            .find(&filter)
            .await?
            .into_iter()
            .filter(|t| !booked_ids.contains(&t.id))
            .take(limit)
            .collect();

        // Top up with popular tours when the content query comes up short.
        if picks.len() < limit {
            let exclude: Vec<String> = booked_ids
                .iter()
                .chain(picks.iter().map(|t| &t.id))
                .cloned()
                .collect();
            for tour in self.tours.popular(limit + exclude.len()).await? {
                if picks.len() >= limit {
                    break;
                }
                if !exclude.contains(&tour.id) {
                    picks.push(tour);
                }
            }
        }

        Ok(picks
            .into_iter()
            .map(|tour| {
                let reason = preference_reason(&tour, &profile);
                Recommendation { tour, reason }
            })
            .collect())
    }

    /// Top tours by rating, ties broken by review count.
    pub async fn popular(&self, limit: usize) -> Result<Vec<Recommendation>> {
        let tours = self.tours.popular(limit).await?;
        Ok(tours
            .into_iter()
            .map(|tour| {
                let reason = if tour.ratings_average >= 4.5 {
                    "Top rated tour".to_string()
                } else {
                    "Popular among travelers".to_string()
                };
                Recommendation { tour, reason }
            })
            .collect())
    }

    /// Tours resembling the given one: same difficulty, or price within
    /// +-30%, or duration within +-2 days. Unknown slug yields an empty
    /// list rather than an error.
    pub async fn similar(&self, slug: &str, limit: usize) -> Result<Vec<Recommendation>> {
        let Some(base) = self.tours.by_slug(slug).await? else {
            return Ok(Vec::new());
        };

        let price_band = base.price * 0.3;
        let mut candidates: Vec<Tour> = self
            .tours
            .find(&TourFilter::default())
            .await?
            .into_iter()
            .filter(|t| t.id != base.id)
            .filter(|t| {
                t.difficulty == base.difficulty
                    || (t.price - base.price).abs() <= price_band
                    || t.duration.abs_diff(base.duration) <= 2
            })
            .collect();
        candidates.sort_by(|a, b| b.ratings_average.total_cmp(&a.ratings_average));
        candidates.truncate(limit);

        Ok(candidates
            .into_iter()
            .map(|tour| {
                let reason = similarity_reason(&tour, &base);
                Recommendation { tour, reason }
            })
            .collect())
    }

    /// Tours booked within the last 30 days, ranked by booking count
    /// (ties broken by rating). Falls back to popular when nothing was
    /// booked recently.
    pub async fn trending(&self, limit: usize) -> Result<Vec<Recommendation>> {
        let since = Utc::now() - Duration::days(TRENDING_WINDOW_DAYS);
        let recent = self.bookings.recent_tour_ids(since).await?;
        if recent.is_empty() {
            return self.popular(limit).await;
        }

        let counts = count_by_id(&recent);
        let mut tours = Vec::new();
        for id in counts.keys() {
            if let Some(tour) = self.tours.by_id(id).await? {
                tours.push(tour);
            }
        }
        tours.sort_by(|a, b| {
            counts[&b.id]
                .cmp(&counts[&a.id])
                .then(b.ratings_average.total_cmp(&a.ratings_average))
        });
        tours.truncate(limit);

        Ok(tours
            .into_iter()
            .map(|tour| Recommendation {
                tour,
                reason: "Trending this month".to_string(),
            })
            .collect())
    }
}

/// First matching reason wins; "Popular choice" is the catch-all.
fn preference_reason(tour: &Tour, profile: &PreferenceProfile) -> String {
    if tour.difficulty == profile.preferred_difficulty {
        return format!("Matches your preferred {} difficulty", tour.difficulty);
    }
    if tour.ratings_average >= 4.5 {
        return "Highly rated by travelers".to_string();
    }
    if (tour.price - profile.avg_price).abs() < profile.avg_price * 0.2 {
        return "Within your typical budget".to_string();
    }
    if (f64::from(tour.duration) - profile.avg_duration).abs() <= 2.0 {
        return "Similar duration to your past trips".to_string();
    }
    "Popular choice".to_string()
}

fn similarity_reason(tour: &Tour, base: &Tour) -> String {
    if tour.difficulty == base.difficulty {
        return format!("Same {} difficulty level", tour.difficulty);
    }
    if (tour.price - base.price).abs() < base.price * 0.2 {
        return "Similar price range".to_string();
    }
    if tour.duration.abs_diff(base.duration) <= 1 {
        return "Similar trip duration".to_string();
    }
    "You might also like".to_string()
}
