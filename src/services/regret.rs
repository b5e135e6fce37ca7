//! Regret-risk estimation: how far a movie sits from the user's
//! archetype-ideal metrics.

use serde::Serialize;

use crate::models::{Metrics, UserProfile};
use crate::services::archetype::ArchetypeId;

/// Ideal (emotional, cognitive, comfort) triple and mismatch weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypePreference {
    pub ideal: [f64; 3],
    pub weights: [f64; 3],
}

const BALANCED_WEIGHTS: [f64; 3] = [0.4, 0.4, 0.2];

/// Ideal triple for an archetype id; unknown ids fall back to eclectic
pub fn preference_for(id: Option<ArchetypeId>) -> ArchetypePreference {
    match id.unwrap_or(ArchetypeId::EclecticDabbler) {
        ArchetypeId::EmotionalPurist => ArchetypePreference {
            ideal: [85.0, 50.0, 40.0],
            weights: BALANCED_WEIGHTS,
        },
        ArchetypeId::ComfortWatcher => ArchetypePreference {
            ideal: [35.0, 30.0, 85.0],
            weights: [0.2, 0.2, 0.6],
        },
        ArchetypeId::IntellectualExplorer => ArchetypePreference {
            ideal: [55.0, 85.0, 40.0],
            weights: [0.2, 0.6, 0.2],
        },
        ArchetypeId::AdrenalineSeeker => ArchetypePreference {
            ideal: [80.0, 45.0, 35.0],
            weights: BALANCED_WEIGHTS,
        },
        ArchetypeId::NostalgiaLover => ArchetypePreference {
            ideal: [60.0, 40.0, 70.0],
            weights: BALANCED_WEIGHTS,
        },
        ArchetypeId::EclecticDabbler => ArchetypePreference {
            ideal: [55.0, 55.0, 55.0],
            weights: BALANCED_WEIGHTS,
        },
    }
}

/// Tunable label thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    /// Scores strictly above this are High
    pub high: f64,
    /// Scores strictly above this (and not High) are Medium
    pub medium: f64,
    /// Base mismatch strictly above this is reported as a metric mismatch
    pub mismatch_reason: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 0.6,
            medium: 0.3,
            mismatch_reason: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub fn from_score(score: f64, thresholds: &RiskThresholds) -> Self {
        if score > thresholds.high {
            RiskLabel::High
        } else if score > thresholds.medium {
            RiskLabel::Medium
        } else {
            RiskLabel::Low
        }
    }

    pub fn color_hint(&self) -> &'static str {
        match self {
            RiskLabel::Low => "#22c55e",
            RiskLabel::Medium => "#eab308",
            RiskLabel::High => "#ef4444",
        }
    }
}

pub const REASON_NOT_ENOUGH_DATA: &str = "Not enough data";
pub const REASON_MISMATCH: &str = "Metric mismatch";
pub const REASON_GOOD_MATCH: &str = "Good match for your profile";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegretRisk {
    pub score: f64,
    pub label: RiskLabel,
    pub color_hint: &'static str,
    pub reason: &'static str,
}

impl RegretRisk {
    pub fn not_enough_data() -> Self {
        Self {
            score: 0.0,
            label: RiskLabel::Low,
            color_hint: RiskLabel::Low.color_hint(),
            reason: REASON_NOT_ENOUGH_DATA,
        }
    }
}

/// Estimates regret risk with the default thresholds
pub fn estimate_risk(metrics: Option<&Metrics>, profile: &UserProfile) -> RegretRisk {
    estimate_risk_with(metrics, profile, &RiskThresholds::default())
}

pub fn estimate_risk_with(
    metrics: Option<&Metrics>,
    profile: &UserProfile,
    thresholds: &RiskThresholds,
) -> RegretRisk {
    let (Some(metrics), Some(archetype)) = (metrics, profile.archetype.as_ref()) else {
        return RegretRisk::not_enough_data();
    };

    let preference = preference_for(archetype.id.parse().ok());
    let actual = metrics.as_array();

    let base_mismatch: f64 = actual
        .iter()
        .zip(preference.ideal.iter())
        .zip(preference.weights.iter())
        .map(|((a, ideal), w)| w * ((a - ideal).abs() / 100.0))
        .sum();

    let score = base_mismatch.clamp(0.0, 1.0);
    let label = RiskLabel::from_score(score, thresholds);
    let reason = if base_mismatch > thresholds.mismatch_reason {
        REASON_MISMATCH
    } else {
        REASON_GOOD_MATCH
    };

    RegretRisk {
        score,
        label,
        color_hint: label.color_hint(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArchetypeRef;

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            archetype: Some(ArchetypeRef { id: id.to_string() }),
            dna: None,
        }
    }

    fn metrics(e: u8, c: u8, f: u8) -> Metrics {
        Metrics {
            emotional_intensity: e,
            cognitive_load: c,
            comfort_score: f,
        }
    }

    #[test]
    fn test_missing_inputs_report_not_enough_data() {
        let risk = estimate_risk(None, &profile("comfort_watcher"));
        assert_eq!(risk, RegretRisk::not_enough_data());

        let risk = estimate_risk(Some(&metrics(50, 50, 50)), &UserProfile::default());
        assert_eq!(risk.score, 0.0);
        assert_eq!(risk.label, RiskLabel::Low);
        assert_eq!(risk.reason, REASON_NOT_ENOUGH_DATA);
    }

    #[test]
    fn test_close_match_is_low() {
        let risk = estimate_risk(Some(&metrics(35, 30, 85)), &profile("comfort_watcher"));
        assert_eq!(risk.score, 0.0);
        assert_eq!(risk.label, RiskLabel::Low);
        assert_eq!(risk.reason, REASON_GOOD_MATCH);
    }

    #[test]
    fn test_opposite_movie_is_high() {
        // comfort watcher ideal (35, 30, 85), movie pushes every metric the other way
        let risk = estimate_risk(Some(&metrics(100, 100, 0)), &profile("comfort_watcher"));
        assert!(risk.score > 0.6);
        assert_eq!(risk.label, RiskLabel::High);
        assert_eq!(risk.reason, REASON_MISMATCH);
        assert_eq!(risk.color_hint, "#ef4444");
    }

    #[test]
    fn test_intermediate_mismatch_is_medium() {
        // eclectic ideal (55, 55, 55): diffs 0.35 each -> 0.35
        let risk = estimate_risk(Some(&metrics(90, 90, 90)), &profile("eclectic_dabbler"));
        assert!((risk.score - 0.35).abs() < 1e-9);
        assert_eq!(risk.label, RiskLabel::Medium);
        assert_eq!(risk.reason, REASON_GOOD_MATCH);
    }

    #[test]
    fn test_unknown_archetype_uses_eclectic_preference() {
        let unknown = estimate_risk(Some(&metrics(90, 90, 90)), &profile("film_buff"));
        let eclectic = estimate_risk(Some(&metrics(90, 90, 90)), &profile("eclectic_dabbler"));
        assert_eq!(unknown, eclectic);
    }

    #[test]
    fn test_label_boundaries() {
        let thresholds = RiskThresholds::default();
        assert_eq!(RiskLabel::from_score(0.3, &thresholds), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(0.3001, &thresholds), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(0.6, &thresholds), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(0.6001, &thresholds), RiskLabel::High);
        assert_eq!(RiskLabel::from_score(0.2999, &thresholds), RiskLabel::Low);
    }

    #[test]
    fn test_estimated_scores_near_boundaries() {
        // intellectual explorer ideal (55, 85, 40), weights (0.2, 0.6, 0.2)
        // 0.294 and 0.306 on either side of the medium threshold
        let just_below = estimate_risk(Some(&metrics(55, 36, 40)), &profile("intellectual_explorer"));
        assert_eq!(just_below.label, RiskLabel::Low);
        let just_above = estimate_risk(Some(&metrics(55, 34, 40)), &profile("intellectual_explorer"));
        assert_eq!(just_above.label, RiskLabel::Medium);

        // 0.598 and 0.61 on either side of the high threshold
        let below_high = estimate_risk(Some(&metrics(99, 0, 40)), &profile("intellectual_explorer"));
        assert_eq!(below_high.label, RiskLabel::Medium);
        let above_high = estimate_risk(Some(&metrics(100, 0, 45)), &profile("intellectual_explorer"));
        assert_eq!(above_high.label, RiskLabel::High);
    }
}
