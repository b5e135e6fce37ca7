use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user's review of a catalog movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Catalog id of the reviewed movie
    pub id: String,
    /// Star rating, 0-5
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub rewatch: bool,
}

/// Aggregate statistics over a user's reviewed movies ("cinema DNA")
///
/// Always rebuilt from the review log and catalog, never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_movies_saved: usize,
    #[serde(default = "neutral_metric")]
    pub avg_emotional: f64,
    #[serde(default = "neutral_metric")]
    pub avg_cognitive: f64,
    #[serde(default = "neutral_metric")]
    pub avg_comfort: f64,
    #[serde(default)]
    pub genre_counts: BTreeMap<String, u32>,
    #[serde(default)]
    pub top_directors: Vec<String>,
    #[serde(default = "default_ratio")]
    pub rewatch_rate: f64,
    #[serde(default = "default_ratio")]
    pub hidden_gem_affinity: f64,
    #[serde(default = "default_avg_runtime")]
    pub avg_runtime: f64,
    #[serde(default = "default_avg_rating")]
    pub avg_rating: f64,
    #[serde(default = "default_ratio")]
    pub percent_older_decades: f64,
}

fn neutral_metric() -> f64 {
    50.0
}

fn default_ratio() -> f64 {
    0.2
}

fn default_avg_runtime() -> f64 {
    110.0
}

fn default_avg_rating() -> f64 {
    6.0
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_movies_saved: 0,
            avg_emotional: neutral_metric(),
            avg_cognitive: neutral_metric(),
            avg_comfort: neutral_metric(),
            genre_counts: BTreeMap::new(),
            top_directors: Vec::new(),
            rewatch_rate: default_ratio(),
            hidden_gem_affinity: default_ratio(),
            avg_runtime: default_avg_runtime(),
            avg_rating: default_avg_rating(),
            percent_older_decades: default_ratio(),
        }
    }
}

impl UserStats {
    /// Genres sorted by count descending, ties by name
    pub fn top_genres(&self, n: usize) -> Vec<String> {
        let mut genres: Vec<(&String, &u32)> = self.genre_counts.iter().collect();
        genres.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        genres.into_iter().take(n).map(|(g, _)| g.clone()).collect()
    }
}

/// Persisted pointer to the user's archetype, e.g. `{"id": "comfort_watcher"}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchetypeRef {
    pub id: String,
}

/// Profile blobs as stored by the host; a derived, possibly stale copy
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub archetype: Option<ArchetypeRef>,
    #[serde(default)]
    pub dna: Option<UserStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_missing_fields_use_neutral_defaults() {
        let stats: UserStats = serde_json::from_str(r#"{"totalMoviesSaved": 3}"#).unwrap();
        assert_eq!(stats.total_movies_saved, 3);
        assert_eq!(stats.avg_emotional, 50.0);
        assert_eq!(stats.rewatch_rate, 0.2);
        assert_eq!(stats.avg_runtime, 110.0);
    }

    #[test]
    fn test_top_genres_orders_by_count_then_name() {
        let mut stats = UserStats::default();
        stats.genre_counts.insert("Drama".to_string(), 3);
        stats.genre_counts.insert("Comedy".to_string(), 3);
        stats.genre_counts.insert("Horror".to_string(), 1);

        assert_eq!(stats.top_genres(2), vec!["Comedy", "Drama"]);
    }
}
