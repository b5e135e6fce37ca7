//! Taste archetype classification.
//!
//! Each of the six archetypes gets a weighted score in [0, 1] from the
//! user's aggregate stats. The highest score wins; ties go to the archetype
//! declared first in [`ARCHETYPES`].

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::models::UserStats;

/// Stable archetype identifiers, in declaration (tie-break) order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeId {
    EmotionalPurist,
    ComfortWatcher,
    IntellectualExplorer,
    AdrenalineSeeker,
    NostalgiaLover,
    EclecticDabbler,
}

impl ArchetypeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchetypeId::EmotionalPurist => "emotional_purist",
            ArchetypeId::ComfortWatcher => "comfort_watcher",
            ArchetypeId::IntellectualExplorer => "intellectual_explorer",
            ArchetypeId::AdrenalineSeeker => "adrenaline_seeker",
            ArchetypeId::NostalgiaLover => "nostalgia_lover",
            ArchetypeId::EclecticDabbler => "eclectic_dabbler",
        }
    }
}

impl Display for ArchetypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArchetypeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ARCHETYPES
            .iter()
            .map(|a| a.id)
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown archetype '{}'", s))
    }
}

/// Fixed persona definition
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Archetype {
    pub id: ArchetypeId,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub traits: &'static [&'static str],
}

pub const ARCHETYPES: [Archetype; 6] = [
    Archetype {
        id: ArchetypeId::EmotionalPurist,
        label: "The Emotional Purist",
        description: "You watch to feel. Stories that leave a mark matter more than spectacle.",
        icon: "💧",
        traits: &["Empathetic", "Story-driven", "Loves character arcs"],
    },
    Archetype {
        id: ArchetypeId::ComfortWatcher,
        label: "The Comfort Watcher",
        description: "Movies are a warm blanket. You return to what feels good.",
        icon: "🛋️",
        traits: &["Cozy", "Loyal to favorites", "Low-stress viewing"],
    },
    Archetype {
        id: ArchetypeId::IntellectualExplorer,
        label: "The Intellectual Explorer",
        description: "You want to be challenged, puzzled, and surprised.",
        icon: "🧠",
        traits: &["Curious", "Puzzle-solver", "Seeks the unusual"],
    },
    Archetype {
        id: ArchetypeId::AdrenalineSeeker,
        label: "The Adrenaline Seeker",
        description: "Pace, stakes, and momentum. Slow burns need not apply.",
        icon: "⚡",
        traits: &["High-energy", "Thrill-driven", "Crowd-pleaser"],
    },
    Archetype {
        id: ArchetypeId::NostalgiaLover,
        label: "The Nostalgia Lover",
        description: "The classics still hold up, and you love revisiting them.",
        icon: "📼",
        traits: &["Sentimental", "Classic-minded", "Rewatcher"],
    },
    Archetype {
        id: ArchetypeId::EclecticDabbler,
        label: "The Eclectic Dabbler",
        description: "No single lane. You sample a bit of everything.",
        icon: "🎲",
        traits: &["Open-minded", "Balanced", "Genre-hopper"],
    },
];

pub fn archetype(id: ArchetypeId) -> &'static Archetype {
    ARCHETYPES
        .iter()
        .find(|a| a.id == id)
        .unwrap_or(&ARCHETYPES[5])
}

pub const REWATCH_REASON_THRESHOLD: f64 = 0.4;
pub const HIDDEN_GEM_REASON_THRESHOLD: f64 = 0.5;
pub const OLDER_DECADES_REASON_THRESHOLD: f64 = 0.4;

/// Classification output; derived per request, never the source of truth
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeResult {
    pub archetype: &'static Archetype,
    pub confidence_percent: u8,
    pub dominant_traits: Vec<&'static str>,
    pub reasons: Vec<String>,
    pub scores: Vec<(ArchetypeId, f64)>,
}

/// Normalized signals the six score formulas read
#[derive(Debug, Clone, Copy)]
struct Signals {
    emotional: f64,
    cognitive: f64,
    comfort: f64,
    rewatch_rate: f64,
    hidden_gem_affinity: f64,
    percent_older_decades: f64,
    drama_romance: f64,
    sci_fi_mystery: f64,
    action_thriller: f64,
    romance_classic: f64,
    short_runtime_bias: f64,
    avg_runtime_shortness: f64,
    imdb_rating_bias: f64,
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn genre_fraction(stats: &UserStats, genres: &[&str], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let count: u32 = stats
        .genre_counts
        .iter()
        .filter(|(g, _)| genres.iter().any(|x| x.eq_ignore_ascii_case(g)))
        .map(|(_, c)| *c)
        .sum();
    count as f64 / total
}

impl Signals {
    fn from_stats(stats: &UserStats) -> Self {
        let total: f64 = stats.genre_counts.values().map(|c| *c as f64).sum();

        let short_runtime_bias = if stats.avg_runtime < 100.0 {
            1.0
        } else if stats.avg_runtime < 120.0 {
            0.5
        } else {
            0.0
        };

        Self {
            emotional: unit(stats.avg_emotional / 100.0),
            cognitive: unit(stats.avg_cognitive / 100.0),
            comfort: unit(stats.avg_comfort / 100.0),
            rewatch_rate: unit(stats.rewatch_rate),
            hidden_gem_affinity: unit(stats.hidden_gem_affinity),
            percent_older_decades: unit(stats.percent_older_decades),
            drama_romance: genre_fraction(stats, &["Drama", "Romance"], total),
            sci_fi_mystery: genre_fraction(stats, &["Sci-Fi", "Mystery"], total),
            action_thriller: genre_fraction(stats, &["Action", "Thriller"], total),
            romance_classic: genre_fraction(stats, &["Romance", "Classic", "History"], total),
            short_runtime_bias,
            avg_runtime_shortness: (1.0 - stats.avg_runtime / 180.0).max(0.0),
            imdb_rating_bias: ((stats.avg_rating - 5.0) / 5.0).max(0.0),
        }
    }

    fn score(&self, id: ArchetypeId) -> f64 {
        match id {
            ArchetypeId::EmotionalPurist => {
                0.6 * self.emotional
                    + 0.2 * self.rewatch_rate
                    + 0.2 * (2.0 * self.drama_romance).min(1.0)
            }
            ArchetypeId::ComfortWatcher => {
                0.6 * self.comfort + 0.3 * self.rewatch_rate + 0.1 * self.short_runtime_bias
            }
            ArchetypeId::IntellectualExplorer => {
                0.5 * self.cognitive
                    + 0.3 * self.hidden_gem_affinity
                    + 0.2 * (2.0 * self.sci_fi_mystery).min(1.0)
            }
            ArchetypeId::AdrenalineSeeker => {
                0.7 * (2.0 * self.action_thriller).min(1.0)
                    + 0.2 * self.avg_runtime_shortness
                    + 0.1 * self.imdb_rating_bias
            }
            ArchetypeId::NostalgiaLover => {
                0.6 * self.percent_older_decades
                    + 0.3 * self.rewatch_rate
                    + 0.1 * (2.0 * self.romance_classic).min(1.0)
            }
            ArchetypeId::EclecticDabbler => {
                let spread = std_dev(&[
                    self.emotional,
                    self.cognitive,
                    self.comfort,
                    self.action_thriller,
                    self.drama_romance,
                ]);
                (1.0 - 3.0 * spread).max(0.0)
            }
        }
    }
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn reasons_for(id: ArchetypeId, stats: &UserStats) -> Vec<String> {
    let mut reasons = vec![match id {
        ArchetypeId::EmotionalPurist => format!(
            "Your picks average {:.0}/100 emotional intensity",
            stats.avg_emotional
        ),
        ArchetypeId::ComfortWatcher => format!(
            "Your picks average {:.0}/100 on comfort",
            stats.avg_comfort
        ),
        ArchetypeId::IntellectualExplorer => format!(
            "Your picks average {:.0}/100 cognitive load",
            stats.avg_cognitive
        ),
        ArchetypeId::AdrenalineSeeker => "Action and thrillers dominate your history".to_string(),
        ArchetypeId::NostalgiaLover => "Older decades make up a big share of your library".to_string(),
        ArchetypeId::EclecticDabbler => "Your taste is spread evenly across moods and genres".to_string(),
    }];

    if stats.rewatch_rate > REWATCH_REASON_THRESHOLD {
        reasons.push("You often come back to favorites".to_string());
    }
    if stats.hidden_gem_affinity > HIDDEN_GEM_REASON_THRESHOLD {
        reasons.push("You seek out hidden gems".to_string());
    }
    if id == ArchetypeId::NostalgiaLover
        && stats.percent_older_decades > OLDER_DECADES_REASON_THRESHOLD
    {
        reasons.push(format!(
            "{:.0}% of your movies were released before 2000",
            stats.percent_older_decades * 100.0
        ));
    }

    reasons
}

/// Assigns a taste archetype, or `None` when the user has saved nothing
pub fn classify(stats: &UserStats) -> Option<ArchetypeResult> {
    if stats.total_movies_saved == 0 {
        return None;
    }

    let signals = Signals::from_stats(stats);
    let scores: Vec<(ArchetypeId, f64)> = ARCHETYPES
        .iter()
        .map(|a| (a.id, signals.score(a.id)))
        .collect();

    // strict comparison keeps the first declared archetype on ties
    let mut winner = scores[0];
    for candidate in &scores[1..] {
        if candidate.1 > winner.1 {
            winner = *candidate;
        }
    }

    let total: f64 = scores.iter().map(|(_, s)| s).sum();
    let confidence_percent = if total > 0.0 {
        (100.0 * winner.1 / total).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    let archetype = archetype(winner.0);

    tracing::debug!(
        archetype = %winner.0,
        score = winner.1,
        confidence = confidence_percent,
        "Classified archetype"
    );

    Some(ArchetypeResult {
        archetype,
        confidence_percent,
        dominant_traits: archetype.traits.to_vec(),
        reasons: reasons_for(winner.0, stats),
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(genres: &[(&str, u32)]) -> UserStats {
        let mut stats = UserStats {
            total_movies_saved: genres.iter().map(|(_, c)| *c as usize).sum(),
            ..UserStats::default()
        };
        for (genre, count) in genres {
            stats.genre_counts.insert(genre.to_string(), *count);
        }
        stats
    }

    #[test]
    fn test_empty_stats_yield_none() {
        let stats = UserStats::default();
        assert!(classify(&stats).is_none());
    }

    #[test]
    fn test_drama_heavy_emotional_profile_is_emotional_purist() {
        let mut stats = stats_with(&[("Drama", 8), ("Comedy", 2)]);
        stats.avg_emotional = 85.0;
        stats.rewatch_rate = 0.8;

        let result = classify(&stats).unwrap();
        assert_eq!(result.archetype.id, ArchetypeId::EmotionalPurist);
        assert_eq!(result.archetype.id.as_str(), "emotional_purist");
        assert!(result.confidence_percent > 0);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("come back to favorites")));
    }

    #[test]
    fn test_action_heavy_profile_is_adrenaline_seeker() {
        let mut stats = stats_with(&[("Action", 6), ("Thriller", 4)]);
        stats.avg_runtime = 95.0;
        stats.avg_rating = 8.0;
        stats.rewatch_rate = 0.0;
        stats.avg_comfort = 30.0;
        stats.avg_emotional = 40.0;

        let result = classify(&stats).unwrap();
        assert_eq!(result.archetype.id, ArchetypeId::AdrenalineSeeker);
    }

    #[test]
    fn test_cerebral_profile_is_intellectual_explorer() {
        let mut stats = stats_with(&[("Sci-Fi", 5), ("Mystery", 5)]);
        stats.avg_cognitive = 90.0;
        stats.avg_emotional = 40.0;
        stats.avg_comfort = 30.0;
        stats.hidden_gem_affinity = 0.9;
        stats.rewatch_rate = 0.0;
        stats.percent_older_decades = 0.0;

        let result = classify(&stats).unwrap();
        assert_eq!(result.archetype.id, ArchetypeId::IntellectualExplorer);
        assert!(result.reasons.iter().any(|r| r.contains("hidden gems")));
    }

    #[test]
    fn test_uniform_signals_are_eclectic() {
        let mut stats = stats_with(&[("Documentary", 1)]);
        stats.avg_emotional = 0.0;
        stats.avg_cognitive = 0.0;
        stats.avg_comfort = 0.0;
        stats.rewatch_rate = 0.0;
        stats.hidden_gem_affinity = 0.0;
        stats.percent_older_decades = 0.0;
        stats.avg_runtime = 180.0;
        stats.avg_rating = 5.0;

        let result = classify(&stats).unwrap();
        assert_eq!(result.archetype.id, ArchetypeId::EclecticDabbler);
        assert_eq!(result.confidence_percent, 100);
    }

    #[test]
    fn test_ties_go_to_first_declared_archetype() {
        let mut stats = stats_with(&[("Documentary", 1)]);
        stats.avg_emotional = 50.0;
        stats.avg_cognitive = 0.0;
        stats.avg_comfort = 50.0;
        stats.rewatch_rate = 0.0;
        stats.hidden_gem_affinity = 0.0;
        stats.percent_older_decades = 0.0;
        stats.avg_runtime = 180.0;
        stats.avg_rating = 5.0;

        let result = classify(&stats).unwrap();
        let score_of = |id: ArchetypeId| {
            result
                .scores
                .iter()
                .find(|(candidate, _)| *candidate == id)
                .unwrap()
                .1
        };
        assert_eq!(
            score_of(ArchetypeId::EmotionalPurist),
            score_of(ArchetypeId::ComfortWatcher)
        );
        assert_eq!(result.archetype.id, ArchetypeId::EmotionalPurist);
    }

    #[test]
    fn test_confidence_is_share_of_total() {
        let mut stats = stats_with(&[("Drama", 8), ("Comedy", 2)]);
        stats.avg_emotional = 85.0;
        stats.rewatch_rate = 0.8;

        let result = classify(&stats).unwrap();
        let total: f64 = result.scores.iter().map(|(_, s)| s).sum();
        let winner = result
            .scores
            .iter()
            .find(|(id, _)| *id == ArchetypeId::EmotionalPurist)
            .unwrap()
            .1;
        assert_eq!(
            result.confidence_percent,
            (100.0 * winner / total).round() as u8
        );
    }

    #[test]
    fn test_archetype_id_parsing() {
        assert_eq!(
            "comfort_watcher".parse::<ArchetypeId>(),
            Ok(ArchetypeId::ComfortWatcher)
        );
        assert!("film_buff".parse::<ArchetypeId>().is_err());
    }
}
