//! Mood metric derivation.
//!
//! Two derivers share the 0-100 output range. [`derive_metrics`] applies
//! additive genre bonuses and is used for single movies looked up on demand;
//! [`derive_catalog_metrics`] averages a per-genre lookup table and is used
//! for library-wide imports. Both keep the same directional ordering: long,
//! dark, dramatic movies score more intense and less comforting than short
//! family comedies.

use crate::models::Metrics;

const INTENSE_GENRES: &[&str] = &["Drama", "Thriller", "Action", "Horror"];
const LIGHT_GENRES: &[&str] = &["Comedy", "Family", "Animation"];
const CEREBRAL_GENRES: &[&str] = &["Sci-Fi", "Mystery", "Documentary", "Biography"];
const COZY_GENRES: &[&str] = &["Comedy", "Romance", "Animation", "Family"];
const DARK_GENRES: &[&str] = &["Horror", "Thriller", "Crime"];

fn intersects<S: AsRef<str>>(genres: &[S], set: &[&str]) -> bool {
    genres
        .iter()
        .any(|g| set.iter().any(|s| s.eq_ignore_ascii_case(g.as_ref())))
}

fn to_metric(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Additive metric derivation for a single movie
pub fn derive_metrics<S: AsRef<str>>(
    genres: &[S],
    runtime_minutes: u32,
    rating_out_of10: f64,
) -> Metrics {
    let rating = rating_out_of10.clamp(0.0, 10.0);
    let runtime = runtime_minutes as f64;

    let mut emotional = 50.0;
    if intersects(genres, INTENSE_GENRES) {
        emotional += 20.0;
    }
    if intersects(genres, LIGHT_GENRES) {
        emotional -= 10.0;
    }
    emotional += rating * 2.0;

    let mut cognitive = 40.0;
    if intersects(genres, CEREBRAL_GENRES) {
        cognitive += 20.0;
    }
    cognitive += (runtime - 90.0).max(0.0) / 2.0;

    let mut comfort = 50.0;
    if intersects(genres, COZY_GENRES) {
        comfort += 30.0;
    }
    if intersects(genres, DARK_GENRES) {
        comfort -= 20.0;
    }
    comfort += rating * 3.0;

    Metrics {
        emotional_intensity: to_metric(emotional),
        cognitive_load: to_metric(cognitive),
        comfort_score: to_metric(comfort),
    }
}

/// Per-genre (emotional, cognitive, comfort) contributions
fn genre_profile(genre: &str) -> Option<(f64, f64, f64)> {
    let profile = match genre.to_ascii_lowercase().as_str() {
        "drama" => (80.0, 60.0, 40.0),
        "war" => (90.0, 70.0, 15.0),
        "comedy" => (20.0, 25.0, 85.0),
        "action" => (75.0, 30.0, 45.0),
        "thriller" => (80.0, 55.0, 25.0),
        "horror" => (85.0, 35.0, 10.0),
        "romance" => (65.0, 30.0, 75.0),
        "animation" => (35.0, 25.0, 85.0),
        "family" => (30.0, 20.0, 90.0),
        "sci-fi" => (60.0, 85.0, 40.0),
        "mystery" => (60.0, 80.0, 35.0),
        "documentary" => (40.0, 80.0, 50.0),
        "biography" => (60.0, 70.0, 50.0),
        "history" => (60.0, 75.0, 40.0),
        "crime" => (70.0, 65.0, 25.0),
        "adventure" => (60.0, 40.0, 65.0),
        "fantasy" => (55.0, 50.0, 65.0),
        "music" => (50.0, 25.0, 75.0),
        "musical" => (50.0, 20.0, 80.0),
        "western" => (55.0, 45.0, 45.0),
        "sport" => (60.0, 30.0, 65.0),
        _ => return None,
    };
    Some(profile)
}

/// Genre-weighted metric derivation used for catalog imports
///
/// Unknown genres are ignored; a movie with no known genre starts neutral.
pub fn derive_catalog_metrics<S: AsRef<str>>(
    genres: &[S],
    runtime_minutes: u32,
    rating_out_of10: f64,
) -> Metrics {
    let known: Vec<(f64, f64, f64)> = genres
        .iter()
        .filter_map(|g| genre_profile(g.as_ref()))
        .collect();

    let (mut emotional, mut cognitive, mut comfort) = if known.is_empty() {
        (50.0, 50.0, 50.0)
    } else {
        let n = known.len() as f64;
        let sum = known
            .iter()
            .fold((0.0, 0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1, acc.2 + p.2));
        (sum.0 / n, sum.1 / n, sum.2 / n)
    };

    if runtime_minutes > 120 {
        emotional += 10.0;
        cognitive += 15.0;
        comfort -= 10.0;
    } else if runtime_minutes < 90 {
        comfort += 15.0;
    }

    if rating_out_of10 > 8.0 {
        comfort += 10.0;
    } else if rating_out_of10 < 5.0 {
        comfort -= 15.0;
    }

    Metrics {
        emotional_intensity: to_metric(emotional),
        cognitive_load: to_metric(cognitive),
        comfort_score: to_metric(comfort),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INCEPTION: &[&str] = &["Action", "Adventure", "Sci-Fi", "Thriller"];
    const TOY_STORY: &[&str] = &["Animation", "Adventure", "Comedy", "Family"];

    #[test]
    fn test_additive_inception_vs_toy_story() {
        let inception = derive_metrics(INCEPTION, 148, 8.8);
        let toy_story = derive_metrics(TOY_STORY, 81, 8.3);

        assert_eq!(inception.emotional_intensity, 88);
        assert_eq!(inception.cognitive_load, 89);
        assert_eq!(inception.comfort_score, 56);
        assert_eq!(toy_story.comfort_score, 100);

        assert!(inception.emotional_intensity > toy_story.emotional_intensity);
        assert!(inception.cognitive_load > toy_story.cognitive_load);
        assert!(toy_story.comfort_score > inception.comfort_score);
    }

    #[test]
    fn test_catalog_inception_vs_toy_story() {
        let inception = derive_catalog_metrics(INCEPTION, 148, 8.8);
        let toy_story = derive_catalog_metrics(TOY_STORY, 81, 8.3);

        assert!(inception.emotional_intensity > toy_story.emotional_intensity);
        assert!(inception.cognitive_load > toy_story.cognitive_load);
        assert!(toy_story.comfort_score > inception.comfort_score);
    }

    #[test]
    fn test_outputs_stay_in_range_for_extreme_inputs() {
        let genre_sets: Vec<Vec<&str>> = vec![
            vec![],
            vec!["Comedy", "Romance", "Animation", "Family"],
            vec!["Horror", "Thriller", "Crime", "War"],
            vec!["Sci-Fi", "Documentary", "Drama"],
            vec!["Unknown Genre"],
        ];

        for genres in &genre_sets {
            for runtime in [0, 45, 90, 121, 400, 10_000] {
                for rating in [-3.0, 0.0, 5.0, 10.0, 42.0] {
                    for metrics in [
                        derive_metrics(genres, runtime, rating),
                        derive_catalog_metrics(genres, runtime, rating),
                    ] {
                        assert!(metrics.emotional_intensity <= 100);
                        assert!(metrics.cognitive_load <= 100);
                        assert!(metrics.comfort_score <= 100);
                    }
                }
            }
        }
    }

    #[test]
    fn test_comedy_is_more_comforting_than_action() {
        let comedy = derive_metrics(&["Comedy"], 85, 8.0);
        let action = derive_metrics(&["Action"], 150, 8.0);
        assert!(comedy.comfort_score > action.comfort_score);

        let comedy = derive_catalog_metrics(&["Comedy"], 85, 8.0);
        let action = derive_catalog_metrics(&["Action"], 150, 8.0);
        assert!(comedy.comfort_score > action.comfort_score);
    }

    #[test]
    fn test_drama_is_more_intense_than_family_comedy() {
        let drama = derive_metrics(&["Drama", "Thriller"], 110, 7.0);
        let comedy = derive_metrics(&["Comedy", "Family"], 110, 7.0);
        assert!(drama.emotional_intensity > comedy.emotional_intensity);

        let drama = derive_catalog_metrics(&["Drama", "Thriller"], 110, 7.0);
        let comedy = derive_catalog_metrics(&["Comedy", "Family"], 110, 7.0);
        assert!(drama.emotional_intensity > comedy.emotional_intensity);
    }

    #[test]
    fn test_long_sci_fi_is_heavier_than_short_romance() {
        let sci_fi = derive_metrics(&["Sci-Fi"], 160, 7.5);
        let romance = derive_metrics(&["Drama", "Romance"], 100, 7.5);
        assert!(sci_fi.cognitive_load > romance.cognitive_load);

        let sci_fi = derive_catalog_metrics(&["Sci-Fi"], 160, 7.5);
        let romance = derive_catalog_metrics(&["Drama", "Romance"], 100, 7.5);
        assert!(sci_fi.cognitive_load > romance.cognitive_load);
    }

    #[test]
    fn test_genre_matching_ignores_case() {
        assert_eq!(
            derive_metrics(&["sci-fi"], 100, 6.0),
            derive_metrics(&["Sci-Fi"], 100, 6.0)
        );
    }

    #[test]
    fn test_unknown_genres_start_neutral() {
        let metrics = derive_catalog_metrics(&["Made Up"], 100, 6.0);
        assert_eq!(metrics, Metrics::neutral());
    }
}
