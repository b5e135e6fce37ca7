//! Builds [`UserStats`] from the review log and the current catalog.

use std::collections::{BTreeMap, HashMap};

use crate::models::{NormalizedMovie, Review, UserStats};

pub const HIDDEN_GEM_MIN_RATING: f64 = 7.0;
pub const HIDDEN_GEM_MAX_VOTES: u64 = 50_000;
pub const OLDER_DECADES_BEFORE: i32 = 2000;
const TOP_DIRECTORS: usize = 3;

/// Highly rated but little-voted; unknown vote counts never qualify
pub fn is_hidden_gem(movie: &NormalizedMovie) -> bool {
    movie.rating_out_of10 >= HIDDEN_GEM_MIN_RATING
        && movie.votes.is_some_and(|v| v < HIDDEN_GEM_MAX_VOTES)
}

/// Recomputes the aggregate stats from scratch
///
/// Reviews pointing at movies no longer in the catalog are skipped.
pub fn compute_stats(reviews: &[Review], catalog: &[NormalizedMovie]) -> UserStats {
    let by_id: HashMap<&str, &NormalizedMovie> =
        catalog.iter().map(|m| (m.id.as_str(), m)).collect();

    // movie id -> (review count, flagged rewatch)
    let mut reviewed: BTreeMap<&str, (usize, bool)> = BTreeMap::new();
    for review in reviews {
        if by_id.contains_key(review.id.as_str()) {
            let entry = reviewed.entry(review.id.as_str()).or_insert((0, false));
            entry.0 += 1;
            entry.1 |= review.rewatch;
        }
    }

    if reviewed.is_empty() {
        return UserStats::default();
    }

    let movies: Vec<&NormalizedMovie> = reviewed
        .keys()
        .filter_map(|id| by_id.get(id).copied())
        .collect();
    let n = movies.len() as f64;
    let avg = |f: fn(&NormalizedMovie) -> f64| movies.iter().map(|m| f(*m)).sum::<f64>() / n;
    let fraction = |pred: fn(&NormalizedMovie) -> bool| {
        movies.iter().filter(|m| pred(**m)).count() as f64 / n
    };

    let mut genre_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut director_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for movie in &movies {
        for genre in &movie.genres {
            *genre_counts.entry(genre.clone()).or_insert(0) += 1;
        }
        if let Some(director) = movie.director.as_deref() {
            *director_counts.entry(director).or_insert(0) += 1;
        }
    }

    let mut directors: Vec<(&str, u32)> = director_counts.into_iter().collect();
    directors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let rewatched = reviewed
        .values()
        .filter(|(count, flagged)| *count > 1 || *flagged)
        .count();

    UserStats {
        total_movies_saved: movies.len(),
        avg_emotional: avg(|m| m.metrics.emotional_intensity as f64),
        avg_cognitive: avg(|m| m.metrics.cognitive_load as f64),
        avg_comfort: avg(|m| m.metrics.comfort_score as f64),
        genre_counts,
        top_directors: directors
            .into_iter()
            .take(TOP_DIRECTORS)
            .map(|(d, _)| d.to_string())
            .collect(),
        rewatch_rate: rewatched as f64 / n,
        hidden_gem_affinity: fraction(is_hidden_gem),
        avg_runtime: avg(|m| m.runtime_minutes as f64),
        avg_rating: avg(|m| m.rating_out_of10),
        percent_older_decades: fraction(|m| m.year.is_some_and(|y| y < OLDER_DECADES_BEFORE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metrics;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn movie(id: &str, genres: &[&str], year: i32, director: &str, votes: u64) -> NormalizedMovie {
        NormalizedMovie {
            id: id.to_string(),
            title: id.to_uppercase(),
            year: Some(year),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            runtime_minutes: 100,
            rating_out_of10: 8.0,
            metrics: Metrics {
                emotional_intensity: 80,
                cognitive_load: 40,
                comfort_score: 60,
            },
            region_tags: BTreeSet::new(),
            director: Some(director.to_string()),
            votes: Some(votes),
        }
    }

    fn review(id: &str, rewatch: bool) -> Review {
        Review {
            id: id.to_string(),
            rating: 4.0,
            text: String::new(),
            date: Utc::now(),
            rewatch,
        }
    }

    #[test]
    fn test_no_reviews_means_empty_stats() {
        let catalog = vec![movie("a", &["Drama"], 2010, "X", 1_000_000)];
        let stats = compute_stats(&[], &catalog);
        assert_eq!(stats.total_movies_saved, 0);
    }

    #[test]
    fn test_reviews_for_evicted_movies_are_skipped() {
        let catalog = vec![movie("a", &["Drama"], 2010, "X", 1_000_000)];
        let stats = compute_stats(&[review("gone", false), review("a", false)], &catalog);
        assert_eq!(stats.total_movies_saved, 1);
    }

    #[test]
    fn test_aggregates() {
        let catalog = vec![
            movie("a", &["Drama", "Romance"], 1995, "Kieslowski", 20_000),
            movie("b", &["Drama"], 2015, "Kieslowski", 900_000),
            movie("c", &["Comedy"], 1985, "Reiner", 30_000),
            movie("d", &["Horror"], 2020, "Peele", 10),
        ];
        let reviews = vec![
            review("a", false),
            review("a", false),
            review("b", true),
            review("c", false),
        ];

        let stats = compute_stats(&reviews, &catalog);
        assert_eq!(stats.total_movies_saved, 3);
        assert_eq!(stats.avg_emotional, 80.0);
        assert_eq!(stats.genre_counts.get("Drama"), Some(&2));
        assert_eq!(stats.genre_counts.get("Horror"), None);
        assert_eq!(stats.top_directors, vec!["Kieslowski", "Reiner"]);
        assert!((stats.rewatch_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((stats.hidden_gem_affinity - 2.0 / 3.0).abs() < 1e-9);
        assert!((stats.percent_older_decades - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.avg_runtime, 100.0);
        assert_eq!(stats.avg_rating, 8.0);
    }

    #[test]
    fn test_hidden_gem_requires_known_votes() {
        let mut m = movie("a", &["Drama"], 2010, "X", 100);
        assert!(is_hidden_gem(&m));
        m.votes = None;
        assert!(!is_hidden_gem(&m));
        m.votes = Some(100);
        m.rating_out_of10 = 6.9;
        assert!(!is_hidden_gem(&m));
    }
}
