use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};

pub const TASTE_CARD_VERSION: u32 = 1;

/// Averaged metrics carried on a taste card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CardMetrics {
    pub ei: f64,
    pub cl: f64,
    pub cs: f64,
}

impl CardMetrics {
    pub fn as_array(&self) -> [f64; 3] {
        [self.ei, self.cl, self.cs]
    }
}

/// Anonymized, shareable summary of a user's taste
///
/// Holds no movie titles or personal data beyond the chosen display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TasteCard {
    pub version: u32,
    pub display_name: String,
    pub metrics: CardMetrics,
    #[serde(default)]
    pub genre_histogram: BTreeMap<String, u32>,
    pub timestamp: DateTime<Utc>,
}

impl TasteCard {
    /// Parses a pasted card, rejecting malformed JSON and unknown versions
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let card: TasteCard = serde_json::from_str(raw.trim())
            .map_err(|e| AppError::InvalidInput(format!("Invalid taste card: {}", e)))?;

        if card.version != TASTE_CARD_VERSION {
            return Err(AppError::InvalidInput(format!(
                "Unsupported taste card version {}",
                card.version
            )));
        }

        Ok(card)
    }
}

/// Result of comparing two taste cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasteComparison {
    /// Similarity, 0-100
    pub score: u8,
    pub matches: Vec<String>,
    pub divergences: Vec<String>,
    pub names: (String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_accepts_valid_card() {
        let raw = r#"{
            "version": 1,
            "displayName": "Sam",
            "metrics": {"ei": 60.0, "cl": 40.0, "cs": 70.0},
            "genreHistogram": {"Drama": 4},
            "timestamp": "2026-01-01T00:00:00Z"
        }"#;

        let card = TasteCard::from_json(raw).unwrap();
        assert_eq!(card.display_name, "Sam");
        assert_eq!(card.genre_histogram.get("Drama"), Some(&4));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = TasteCard::from_json("not a card");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_from_json_rejects_unknown_version() {
        let raw = r#"{
            "version": 7,
            "displayName": "Sam",
            "metrics": {"ei": 60.0, "cl": 40.0, "cs": 70.0},
            "timestamp": "2026-01-01T00:00:00Z"
        }"#;

        let result = TasteCard::from_json(raw);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
