//! Natural-language query interpretation and hidden-gem reasoning.
//!
//! Both paths try the optional text generator first and fall back to a
//! deterministic heuristic whenever it is absent, errors, or returns
//! something unusable.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::{NormalizedMovie, UserStats};
use crate::services::decision::{Company, DecisionOptions, Mood};
use crate::services::dna::{is_hidden_gem, HIDDEN_GEM_MAX_VOTES};
use crate::services::providers::TextGenerator;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterpretationSource {
    Ai,
    Heuristic,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryInterpretation {
    pub options: DecisionOptions,
    pub source: InterpretationSource,
}

// Checked in order; the first mood with a hit wins
const MOOD_KEYWORDS: &[(Mood, &[&str])] = &[
    (
        Mood::Exciting,
        &["exciting", "thrill", "thrilling", "action", "adrenaline", "intense", "edge of my seat"],
    ),
    (
        Mood::Thoughtful,
        &["think", "thoughtful", "mind", "smart", "deep", "cerebral", "puzzle", "mind-bending"],
    ),
    (Mood::Vibing, &["vibe", "vibes", "vibing", "chill", "laid back", "laid-back"]),
    (Mood::Good, &["feel good", "feel-good", "uplifting", "happy", "cheerful"]),
    (Mood::Comfort, &["cozy", "comfort", "comforting", "light", "relax", "relaxing", "easy", "funny"]),
];

const COMPANY_KEYWORDS: &[(Company, &[&str])] = &[
    (Company::Family, &["family", "kids", "children", "parents"]),
    (
        Company::Couple,
        &["date", "partner", "girlfriend", "boyfriend", "wife", "husband", "couple"],
    ),
    (Company::Friends, &["friends", "buddies", "party", "roommates"]),
    (Company::Alone, &["alone", "myself", "solo"]),
];

const SHORT_EVENING_MINUTES: u32 = 90;
const LONG_EVENING_MINUTES: u32 = 180;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*(hours?|hrs?|h|minutes?|mins?|m)\b")
            .expect("duration pattern is valid")
    })
}

fn matches_keyword(text: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.contains('-') {
        text.contains(keyword)
    } else {
        words.iter().any(|w| *w == keyword)
    }
}

fn parse_minutes(text: &str) -> Option<u32> {
    if let Some(captures) = duration_pattern().captures(text) {
        let amount: f64 = captures[1].parse().ok()?;
        let minutes = if captures[2].starts_with('h') {
            amount * 60.0
        } else {
            amount
        };
        return Some(minutes.round() as u32);
    }

    let words: Vec<&str> = text.split(|c: char| !c.is_alphanumeric()).collect();
    if words.iter().any(|w| matches!(*w, "short" | "quick" | "quickie")) {
        Some(SHORT_EVENING_MINUTES)
    } else if words.iter().any(|w| matches!(*w, "long" | "epic")) || text.contains("all night") {
        Some(LONG_EVENING_MINUTES)
    } else {
        None
    }
}

/// Keyword parser used whenever the text generator cannot be relied on
pub fn parse_query_heuristic(query: &str) -> DecisionOptions {
    let text = query.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mood = MOOD_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| matches_keyword(&text, &words, k)))
        .map(|(mood, _)| *mood);

    let company = COMPANY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| matches_keyword(&text, &words, k)))
        .map(|(company, _)| *company);

    DecisionOptions {
        mood,
        company,
        time: parse_minutes(&text),
        epsilon: None,
        region: None,
    }
}

/// Shape the generator is asked to produce
#[derive(Debug, Deserialize)]
struct GeneratedQuery {
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    time: Option<u32>,
}

fn mood_from_label(label: &str) -> Option<Mood> {
    [Mood::Comfort, Mood::Exciting, Mood::Thoughtful, Mood::Vibing, Mood::Good]
        .into_iter()
        .find(|m| format!("{:?}", m).eq_ignore_ascii_case(label.trim()))
}

fn company_from_label(label: &str) -> Option<Company> {
    [Company::Alone, Company::Couple, Company::Family, Company::Friends]
        .into_iter()
        .find(|c| format!("{:?}", c).eq_ignore_ascii_case(label.trim()))
}

/// Pulls the first JSON object out of free text; `None` if nothing usable
fn parse_generated(output: &str) -> Option<DecisionOptions> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    if end <= start {
        return None;
    }

    let generated: GeneratedQuery = serde_json::from_str(&output[start..=end]).ok()?;
    let options = DecisionOptions {
        mood: generated.mood.as_deref().and_then(mood_from_label),
        company: generated.company.as_deref().and_then(company_from_label),
        time: generated.time.filter(|t| *t > 0),
        epsilon: None,
        region: None,
    };

    if options.mood.is_none() && options.company.is_none() && options.time.is_none() {
        None
    } else {
        Some(options)
    }
}

fn query_prompt(query: &str) -> String {
    format!(
        "Turn this movie request into JSON with keys \"mood\" (one of Comfort, Exciting, \
         Thoughtful, Vibing, Good), \"company\" (one of Alone, Couple, Family, Friends) and \
         \"time\" (minutes available). Reply with JSON only.\nRequest: {}",
        query
    )
}

/// Interprets a free-text request, preferring the generator when it cooperates
pub async fn interpret_query(
    query: &str,
    generator: Option<&dyn TextGenerator>,
) -> QueryInterpretation {
    if let Some(generator) = generator {
        match generator.generate(&query_prompt(query)).await {
            Ok(output) => {
                if let Some(options) = parse_generated(&output) {
                    return QueryInterpretation {
                        options,
                        source: InterpretationSource::Ai,
                    };
                }
                tracing::warn!(
                    provider = generator.name(),
                    "Generated query was not usable JSON, using keyword parser"
                );
            }
            Err(e) => {
                tracing::warn!(
                    provider = generator.name(),
                    error = %e,
                    "Text generation failed, using keyword parser"
                );
            }
        }
    }

    QueryInterpretation {
        options: parse_query_heuristic(query),
        source: InterpretationSource::Heuristic,
    }
}

/// Hidden gems that share a genre with the user's favorites, best rated first
pub fn find_hidden_gems<'a>(
    catalog: &'a [NormalizedMovie],
    stats: &UserStats,
    limit: usize,
) -> Vec<&'a NormalizedMovie> {
    let favorites = stats.top_genres(3);

    let mut gems: Vec<&NormalizedMovie> = catalog
        .iter()
        .filter(|m| is_hidden_gem(m))
        .filter(|m| favorites.is_empty() || favorites.iter().any(|g| m.has_genre(g)))
        .collect();

    gems.sort_by(|a, b| {
        b.rating_out_of10
            .total_cmp(&a.rating_out_of10)
            .then_with(|| a.id.cmp(&b.id))
    });
    gems.truncate(limit);
    gems
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GemReason {
    pub text: String,
    pub source: InterpretationSource,
}

/// Deterministic one-sentence explanation of a hidden gem
pub fn template_gem_reason(movie: &NormalizedMovie, stats: &UserStats) -> String {
    let genres = if movie.genres.is_empty() {
        "under-the-radar".to_string()
    } else {
        movie.genres.join("/").to_lowercase()
    };
    let mut text = format!(
        "{} is a {:.1}/10 {} pick with fewer than {} votes",
        movie.title,
        movie.rating_out_of10,
        genres,
        HIDDEN_GEM_MAX_VOTES
    );

    if let Some(shared) = stats
        .top_genres(3)
        .into_iter()
        .find(|g| movie.has_genre(g))
    {
        text.push_str(&format!(", right next to your love of {}", shared.to_lowercase()));
    }
    text.push('.');
    text
}

const MAX_GENERATED_REASON_CHARS: usize = 400;

pub async fn gem_reason(
    movie: &NormalizedMovie,
    stats: &UserStats,
    generator: Option<&dyn TextGenerator>,
) -> GemReason {
    if let Some(generator) = generator {
        let prompt = format!(
            "In one sentence, tell a fan of {} why \"{}\" ({}) is worth watching.",
            stats.top_genres(3).join(", "),
            movie.title,
            movie.genres.join(", ")
        );
        match generator.generate(&prompt).await {
            Ok(output) => {
                let trimmed = output.trim();
                if !trimmed.is_empty() && trimmed.chars().count() <= MAX_GENERATED_REASON_CHARS {
                    return GemReason {
                        text: trimmed.to_string(),
                        source: InterpretationSource::Ai,
                    };
                }
                tracing::warn!(
                    provider = generator.name(),
                    movie_id = %movie.id,
                    "Generated gem reason unusable, using template"
                );
            }
            Err(e) => {
                tracing::warn!(
                    provider = generator.name(),
                    movie_id = %movie.id,
                    error = %e,
                    "Gem reasoning failed, using template"
                );
            }
        }
    }

    GemReason {
        text: template_gem_reason(movie, stats),
        source: InterpretationSource::Heuristic,
    }
}
