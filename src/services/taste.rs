//! Taste card export and pairwise comparison.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CardMetrics, TasteCard, TasteComparison, UserStats, TASTE_CARD_VERSION};

const METRIC_WEIGHT: f64 = 0.4;
const GENRE_WEIGHT: f64 = 0.6;
const TOP_N: usize = 3;

/// Cosine similarity; zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Anonymized export of the user's stats
pub fn export_card(stats: &UserStats, display_name: &str, now: DateTime<Utc>) -> TasteCard {
    TasteCard {
        version: TASTE_CARD_VERSION,
        display_name: display_name.trim().to_string(),
        metrics: CardMetrics {
            ei: stats.avg_emotional.round(),
            cl: stats.avg_cognitive.round(),
            cs: stats.avg_comfort.round(),
        },
        genre_histogram: stats.genre_counts.clone(),
        timestamp: now,
    }
}

fn top_by_weight(mut weighted: Vec<(String, u32)>) -> Vec<String> {
    weighted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let mut seen = BTreeSet::new();
    weighted
        .into_iter()
        .filter(|(genre, _)| seen.insert(genre.clone()))
        .take(TOP_N)
        .map(|(genre, _)| genre)
        .collect()
}

pub fn compare(a: &TasteCard, b: &TasteCard) -> TasteComparison {
    let metric_similarity = cosine_similarity(&a.metrics.as_array(), &b.metrics.as_array());

    let genres: BTreeSet<&String> = a
        .genre_histogram
        .keys()
        .chain(b.genre_histogram.keys())
        .collect();
    let count = |histogram: &BTreeMap<String, u32>, genre: &String| {
        histogram.get(genre).copied().unwrap_or(0)
    };

    let vector_a: Vec<f64> = genres
        .iter()
        .map(|g| count(&a.genre_histogram, *g) as f64)
        .collect();
    let vector_b: Vec<f64> = genres
        .iter()
        .map(|g| count(&b.genre_histogram, *g) as f64)
        .collect();
    let genre_similarity = cosine_similarity(&vector_a, &vector_b);

    let raw = METRIC_WEIGHT * metric_similarity + GENRE_WEIGHT * genre_similarity;
    let score = (raw * 100.0).round().clamp(0.0, 100.0) as u8;

    let mut shared = Vec::new();
    let mut one_sided = Vec::new();
    for genre in &genres {
        let (ca, cb) = (count(&a.genre_histogram, *genre), count(&b.genre_histogram, *genre));
        match (ca > 0, cb > 0) {
            (true, true) => shared.push(((*genre).clone(), ca + cb)),
            (true, false) => one_sided.push(((*genre).clone(), ca)),
            (false, true) => one_sided.push(((*genre).clone(), cb)),
            (false, false) => {}
        }
    }

    TasteComparison {
        score,
        matches: top_by_weight(shared),
        divergences: top_by_weight(one_sided),
        names: (a.display_name.clone(), b.display_name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn card(name: &str, metrics: (f64, f64, f64), genres: &[(&str, u32)]) -> TasteCard {
        TasteCard {
            version: TASTE_CARD_VERSION,
            display_name: name.to_string(),
            metrics: CardMetrics {
                ei: metrics.0,
                cl: metrics.1,
                cs: metrics.2,
            },
            genre_histogram: genres.iter().map(|(g, c)| (g.to_string(), *c)).collect(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_identical_cards_score_100() {
        let a = card("Ana", (70.0, 40.0, 55.0), &[("Drama", 5), ("Comedy", 2)]);
        let result = compare(&a, &a.clone());
        assert_eq!(result.score, 100);
        assert_eq!(result.matches, vec!["Drama", "Comedy"]);
        assert!(result.divergences.is_empty());
    }

    #[test]
    fn test_opposite_disjoint_cards_score_low() {
        let a = card("Ana", (100.0, 0.0, 0.0), &[("Horror", 9), ("Thriller", 4)]);
        let b = card("Ben", (0.0, 0.0, 100.0), &[("Family", 7), ("Animation", 3)]);

        let result = compare(&a, &b);
        assert!(result.score < 30);
        assert!(result.matches.is_empty());
        assert_eq!(result.divergences, vec!["Horror", "Family", "Thriller"]);
        assert_eq!(result.names, ("Ana".to_string(), "Ben".to_string()));
    }

    #[test]
    fn test_matches_sorted_by_combined_weight() {
        let a = card("A", (50.0, 50.0, 50.0), &[("Drama", 1), ("Comedy", 4), ("War", 2), ("Crime", 1)]);
        let b = card("B", (50.0, 50.0, 50.0), &[("Drama", 2), ("Comedy", 1), ("War", 5), ("Crime", 1)]);

        let result = compare(&a, &b);
        assert_eq!(result.matches, vec!["War", "Comedy", "Drama"]);
    }

    #[test]
    fn test_empty_cards_do_not_produce_nan() {
        let a = card("A", (0.0, 0.0, 0.0), &[]);
        let b = card("B", (0.0, 0.0, 0.0), &[]);
        let result = compare(&a, &b);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_cosine_of_zero_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 1.0], &[4.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_export_card_carries_no_titles() {
        let mut stats = UserStats {
            total_movies_saved: 4,
            avg_emotional: 61.6,
            ..UserStats::default()
        };
        stats.genre_counts.insert("Drama".to_string(), 4);
        stats.top_directors = vec!["Someone Famous".to_string()];

        let now = Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap();
        let card = export_card(&stats, " Ana ", now);
        assert_eq!(card.version, TASTE_CARD_VERSION);
        assert_eq!(card.display_name, "Ana");
        assert_eq!(card.metrics.ei, 62.0);
        assert_eq!(card.genre_histogram.get("Drama"), Some(&4));

        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("Someone Famous"));
        let parsed = TasteCard::from_json(&json).unwrap();
        assert_eq!(parsed, card);
    }
}
