//! Mood/company/time based decision engine.
//!
//! Filters the catalog by region and runtime, scores every candidate against
//! the requested mood, then fills three slots with epsilon exploration.
//! Randomness (tie-break jitter, exploration) comes from the caller's RNG so
//! a seeded generator reproduces a ranking exactly.

use chrono::Datelike;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{Metrics, NormalizedMovie, UserProfile};
use crate::services::regret::{estimate_risk_with, RegretRisk, RiskLabel, RiskThresholds};

pub const DEFAULT_TIME_MINUTES: u32 = 120;
pub const RESULT_SLOTS: usize = 3;
/// Runtime filter is dropped when fewer candidates than this survive it
pub const MIN_FILTERED_CANDIDATES: usize = 5;
/// Exploration only kicks in when the remaining pool is larger than this
pub const EXPLORATION_MIN_POOL: usize = 5;
pub const EXPLORATION_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mood {
    Comfort,
    Exciting,
    Thoughtful,
    Vibing,
    Good,
}

impl Mood {
    /// Mood score on the 0-100 metric scale
    fn score(&self, metrics: &Metrics) -> f64 {
        let e = metrics.emotional_intensity as f64;
        let c = metrics.cognitive_load as f64;
        let f = metrics.comfort_score as f64;
        match self {
            Mood::Comfort => f,
            Mood::Exciting => e,
            Mood::Thoughtful => c,
            Mood::Vibing => (f + c) / 2.0,
            Mood::Good => (e + c) / 2.0,
        }
    }

    fn affirmation(&self) -> &'static str {
        match self {
            Mood::Comfort => "a cozy, low-stress watch for tonight",
            Mood::Exciting => "keeps the energy high from start to finish",
            Mood::Thoughtful => "gives you something to chew on afterwards",
            Mood::Vibing => "easygoing but still interesting",
            Mood::Good => "an uplifting pick that still has some depth",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Company {
    Alone,
    Couple,
    Family,
    Friends,
}

/// Recommendation request; unset fields resolve to defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DecisionOptions {
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub company: Option<Company>,
    /// Available time in minutes
    #[serde(default)]
    pub time: Option<u32>,
    /// Exploration probability, 0-1
    #[serde(default)]
    pub epsilon: Option<f64>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Options after default resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub mood: Mood,
    pub company: Company,
    pub time: u32,
    pub epsilon: f64,
    pub region: Option<String>,
}

impl DecisionOptions {
    pub fn resolve(&self) -> ResolvedOptions {
        let epsilon = self
            .epsilon
            .filter(|e| e.is_finite())
            .map(|e| e.clamp(0.0, 1.0))
            .unwrap_or(0.0);

        ResolvedOptions {
            mood: self.mood.unwrap_or(Mood::Comfort),
            company: self.company.unwrap_or(Company::Alone),
            time: self.time.unwrap_or(DEFAULT_TIME_MINUTES),
            epsilon,
            region: self
                .region
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case("all"))
                .map(str::to_lowercase),
        }
    }
}

/// Tunable scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionWeights {
    pub mood: f64,
    pub rating: f64,
    pub recency: f64,
    /// Age in years at which the recency bonus reaches zero
    pub recency_horizon_years: f64,
    pub family_match_bonus: f64,
    pub family_mismatch_penalty: f64,
    pub couple_bonus: f64,
    pub jitter: f64,
    pub high_risk_penalty: f64,
    pub medium_risk_penalty: f64,
}

impl Default for DecisionWeights {
    fn default() -> Self {
        Self {
            mood: 0.5,
            rating: 0.3,
            recency: 0.1,
            recency_horizon_years: 50.0,
            family_match_bonus: 0.2,
            family_mismatch_penalty: 0.1,
            couple_bonus: 0.1,
            jitter: 0.05,
            high_risk_penalty: 0.3,
            medium_risk_penalty: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DominantMetric {
    Comfort,
    Intensity,
    #[serde(rename = "Thought-Provoking")]
    ThoughtProvoking,
}

impl DominantMetric {
    /// Comfort is the baseline; the others must be strictly greater to win
    pub fn of(metrics: &Metrics) -> Self {
        let mut dominant = DominantMetric::Comfort;
        let mut max = metrics.comfort_score;
        if metrics.emotional_intensity > max {
            dominant = DominantMetric::Intensity;
            max = metrics.emotional_intensity;
        }
        if metrics.cognitive_load > max {
            dominant = DominantMetric::ThoughtProvoking;
        }
        dominant
    }

    pub fn label(&self) -> &'static str {
        match self {
            DominantMetric::Comfort => "Comfort",
            DominantMetric::Intensity => "Intensity",
            DominantMetric::ThoughtProvoking => "Thought-Provoking",
        }
    }
}

/// A recommendation slot
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedMovie {
    pub movie: NormalizedMovie,
    pub score: f64,
    pub dominant_metric: DominantMetric,
    pub regret_risk: Option<RegretRisk>,
    /// True when the slot was filled by exploration rather than the top pick
    pub exploration: bool,
    pub explain: String,
}

struct Candidate<'a> {
    movie: &'a NormalizedMovie,
    score: f64,
    risk: Option<RegretRisk>,
}

pub struct DecisionEngine {
    weights: DecisionWeights,
    thresholds: RiskThresholds,
    current_year: i32,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self {
            weights: DecisionWeights::default(),
            thresholds: RiskThresholds::default(),
            current_year: chrono::Utc::now().year(),
        }
    }

    pub fn with_weights(mut self, weights: DecisionWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Pins the year used for the recency bonus
    pub fn at_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Produces up to three ranked picks; never fails
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        options: &DecisionOptions,
        catalog: &[NormalizedMovie],
        profile: Option<&UserProfile>,
        rng: &mut R,
    ) -> Vec<RankedMovie> {
        let options = options.resolve();
        let candidates = self.candidates(&options, catalog);

        let mut pool: Vec<Candidate> = candidates
            .into_iter()
            .map(|movie| self.score(movie, &options, profile, rng))
            .collect();
        pool.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            catalog_size = catalog.len(),
            pool_size = pool.len(),
            mood = ?options.mood,
            epsilon = options.epsilon,
            "Scored recommendation candidates"
        );

        let mut picks = Vec::with_capacity(RESULT_SLOTS);
        for _ in 0..RESULT_SLOTS {
            if pool.is_empty() {
                break;
            }

            let explore = pool.len() > EXPLORATION_MIN_POOL && rng.random::<f64>() < options.epsilon;
            let index = if explore {
                let upper = (pool.len() - 1).min(EXPLORATION_MAX_DEPTH);
                rng.random_range(1..=upper)
            } else {
                0
            };

            let picked = pool.remove(index);
            picks.push(self.ranked(picked, &options, explore));
        }

        picks
    }

    /// Region filter, then runtime filter with a fallback to the whole catalog
    fn candidates<'a>(
        &self,
        options: &ResolvedOptions,
        catalog: &'a [NormalizedMovie],
    ) -> Vec<&'a NormalizedMovie> {
        let regional: Vec<&NormalizedMovie> = catalog
            .iter()
            .filter(|m| match &options.region {
                Some(region) => m.region_tags.iter().any(|t| t.eq_ignore_ascii_case(region)),
                None => true,
            })
            .collect();

        let time = options.time;
        let fits = |m: &NormalizedMovie| {
            if time <= 90 {
                m.runtime_minutes <= 95
            } else if time <= 120 {
                m.runtime_minutes <= 125
            } else {
                m.runtime_minutes > 120
            }
        };

        let filtered: Vec<&NormalizedMovie> = regional.into_iter().filter(|m| fits(m)).collect();
        if filtered.len() < MIN_FILTERED_CANDIDATES {
            tracing::debug!(
                surviving = filtered.len(),
                time,
                "Too few candidates after runtime filter, using full catalog"
            );
            return catalog.iter().collect();
        }

        filtered
    }

    fn score<'a, R: Rng + ?Sized>(
        &self,
        movie: &'a NormalizedMovie,
        options: &ResolvedOptions,
        profile: Option<&UserProfile>,
        rng: &mut R,
    ) -> Candidate<'a> {
        let w = &self.weights;
        let mood_score = options.mood.score(&movie.metrics);

        let recency = match movie.year {
            Some(year) => {
                let age = (self.current_year - year).max(0) as f64;
                1.0 - (age / w.recency_horizon_years).min(1.0)
            }
            None => 0.0,
        };

        let mut score = w.mood * (mood_score / 100.0)
            + w.rating * (movie.rating_out_of10 / 10.0)
            + w.recency * recency;

        match options.company {
            Company::Family => {
                if movie.has_any_genre(&["Family", "Animation"]) {
                    score += w.family_match_bonus;
                } else {
                    score -= w.family_mismatch_penalty;
                }
            }
            Company::Couple => {
                if movie.has_any_genre(&["Romance", "Drama"]) {
                    score += w.couple_bonus;
                }
            }
            Company::Alone | Company::Friends => {}
        }

        score += rng.random::<f64>() * w.jitter;

        let risk = profile
            .filter(|p| p.archetype.is_some())
            .map(|p| estimate_risk_with(Some(&movie.metrics), p, &self.thresholds));

        score -= match risk.as_ref().map(|r| r.label) {
            Some(RiskLabel::High) => w.high_risk_penalty,
            Some(RiskLabel::Medium) => w.medium_risk_penalty,
            Some(RiskLabel::Low) | None => 0.0,
        };

        Candidate { movie, score, risk }
    }

    fn ranked(&self, candidate: Candidate, options: &ResolvedOptions, explore: bool) -> RankedMovie {
        let dominant_metric = DominantMetric::of(&candidate.movie.metrics);
        let explain = if explore {
            format!(
                "An experimental pick: {} leans toward {} and might widen your taste.",
                candidate.movie.title,
                dominant_metric.label().to_lowercase()
            )
        } else {
            format!(
                "{} fits your {:?} mood: {}.",
                candidate.movie.title,
                options.mood,
                options.mood.affirmation()
            )
        };

        RankedMovie {
            movie: candidate.movie.clone(),
            score: candidate.score,
            dominant_metric,
            regret_risk: candidate.risk,
            exploration: explore,
            explain,
        }
    }
}

/// Convenience wrapper using the default weights and the current year
pub fn recommend<R: Rng + ?Sized>(
    options: &DecisionOptions,
    catalog: &[NormalizedMovie],
    profile: Option<&UserProfile>,
    rng: &mut R,
) -> Vec<RankedMovie> {
    DecisionEngine::new().recommend(options, catalog, profile, rng)
}
