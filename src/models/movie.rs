use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::services::metrics::{derive_catalog_metrics, derive_metrics};

pub const DEFAULT_RUNTIME_MINUTES: u32 = 90;
pub const DEFAULT_RATING: f64 = 5.0;

/// The three 0-100 mood metrics attached to every normalized movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub emotional_intensity: u8,
    pub cognitive_load: u8,
    pub comfort_score: u8,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Metrics {
    /// Neutral 50/50/50 triple used when nothing is known
    pub fn neutral() -> Self {
        Self {
            emotional_intensity: 50,
            cognitive_load: 50,
            comfort_score: 50,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [
            self.emotional_intensity as f64,
            self.cognitive_load as f64,
            self.comfort_score as f64,
        ]
    }
}

/// Which deriver computes the metrics when a movie is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsSource {
    /// On-demand single movie lookups
    Additive,
    /// Library-wide imports
    GenreWeighted,
}

/// Canonical movie record consumed by the recommendation core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMovie {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "default_runtime")]
    pub runtime_minutes: u32,
    #[serde(default = "default_rating")]
    pub rating_out_of10: f64,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub region_tags: BTreeSet<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub votes: Option<u64>,
}

fn default_runtime() -> u32 {
    DEFAULT_RUNTIME_MINUTES
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

impl NormalizedMovie {
    /// Builds the canonical record and caches its metrics
    pub fn from_raw(raw: RawMovie, source: MetricsSource) -> Self {
        let genres = parse_genres(raw.genre.as_deref());
        let runtime_minutes = parse_runtime(raw.runtime.as_deref());
        let rating_out_of10 = parse_rating(raw.imdb_rating.as_deref());

        let mut movie = Self {
            id: raw.imdb_id,
            title: raw.title,
            year: parse_year(raw.year.as_deref()),
            genres,
            runtime_minutes,
            rating_out_of10,
            metrics: Metrics::neutral(),
            region_tags: raw
                .region_tags
                .into_iter()
                .map(|r| r.to_lowercase())
                .collect(),
            director: raw.director.filter(|d| !is_missing(d)),
            votes: parse_votes(raw.imdb_votes.as_deref()),
        };
        movie.refresh_metrics(source);
        movie
    }

    /// Recomputes and stores the metrics; idempotent for the same inputs
    pub fn refresh_metrics(&mut self, source: MetricsSource) {
        self.metrics = match source {
            MetricsSource::Additive => {
                derive_metrics(&self.genres, self.runtime_minutes, self.rating_out_of10)
            }
            MetricsSource::GenreWeighted => {
                derive_catalog_metrics(&self.genres, self.runtime_minutes, self.rating_out_of10)
            }
        };
    }

    /// Case-insensitive genre membership
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    pub fn has_any_genre(&self, genres: &[&str]) -> bool {
        genres.iter().any(|g| self.has_genre(g))
    }
}

// ============================================================================
// Catalog ingestion types (OMDb shape)
// ============================================================================

/// Raw catalog record as returned by the external catalog API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawMovie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Runtime", default)]
    pub runtime: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "regionTags", default)]
    pub region_tags: Vec<String>,
}

fn is_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("n/a")
}

fn parse_genres(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !is_missing(s) => s
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_runtime(raw: Option<&str>) -> u32 {
    raw.and_then(|s| {
        s.split_whitespace()
            .next()
            .and_then(|n| n.parse::<u32>().ok())
    })
    .unwrap_or(DEFAULT_RUNTIME_MINUTES)
}

fn parse_rating(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, 10.0))
        .unwrap_or(DEFAULT_RATING)
}

/// Takes the first four digits, so "2010–2014" resolves to 2010
fn parse_year(raw: Option<&str>) -> Option<i32> {
    let s = raw?;
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).take(4).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

fn parse_votes(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.replace(',', "").trim().parse().ok())
}
