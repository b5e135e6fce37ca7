use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Metrics;

/// Kind of behavioral event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    View,
    Rate,
    Review,
    WatchlistAdd,
    WatchlistRemove,
    Skip,
}

/// One entry of the append-only behavioral log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub movie_id: String,
    #[serde(default)]
    pub metrics_snapshot: Option<Metrics>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_serialization() {
        let json = serde_json::to_string(&EventType::WatchlistAdd).unwrap();
        assert_eq!(json, "\"watchlist-add\"");

        let parsed: EventType = serde_json::from_str("\"view\"").unwrap();
        assert_eq!(parsed, EventType::View);
    }
}
