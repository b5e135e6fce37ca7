//! Behavioral trend aggregation over the capped event log.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use uuid::Uuid;

use crate::models::{Event, EventType, Metrics};

pub const EVENT_LOG_CAPACITY: usize = 1000;
pub const DEFAULT_WEEKS_BACK: usize = 26;
const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;
const NEUTRAL_AVERAGE: f64 = 50.0;

/// Append-only event log that keeps only the most recent entries
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(EVENT_LOG_CAPACITY)),
            capacity,
        }
    }

    /// Records an event, stamping it with `now` when no timestamp is given
    pub fn log_event(
        &mut self,
        event_type: EventType,
        movie_id: &str,
        metrics_snapshot: Option<Metrics>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Event {
        let event = new_event(event_type, movie_id, metrics_snapshot, timestamp);
        self.push(event.clone());
        event
    }

    /// Appends an existing event, evicting the oldest beyond capacity
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub fn new_event(
    event_type: EventType,
    movie_id: &str,
    metrics_snapshot: Option<Metrics>,
    timestamp: Option<DateTime<Utc>>,
) -> Event {
    Event {
        id: Uuid::new_v4().to_string(),
        event_type,
        movie_id: movie_id.to_string(),
        metrics_snapshot,
        timestamp: timestamp.unwrap_or_else(Utc::now),
    }
}

/// One weekly window of averaged metric snapshots
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBucket {
    pub week_index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Events that fell in the window, with or without a snapshot
    pub event_count: usize,
    pub sample_count: usize,
    pub avg_emotional: f64,
    pub avg_cognitive: f64,
    pub avg_comfort: f64,
}

/// Buckets events into `weeks_back` windows ending at `now`
///
/// Index 0 is the oldest week. Events older than the window or stamped in
/// the future fall outside every bucket and are dropped. Empty buckets
/// report the neutral average of 50.
pub fn weekly_aggregates(events: &[Event], now: DateTime<Utc>, weeks_back: usize) -> Vec<WeeklyBucket> {
    let mut sums = vec![[0.0f64; 3]; weeks_back];
    let mut samples = vec![0usize; weeks_back];
    let mut counts = vec![0usize; weeks_back];

    let now_ms = now.timestamp_millis();
    let weeks = weeks_back as i64;

    for event in events {
        let elapsed = now_ms - event.timestamp.timestamp_millis();
        let index = weeks - 1 - elapsed.div_euclid(WEEK_MS);
        if index < 0 || index >= weeks {
            continue;
        }
        let index = index as usize;

        counts[index] += 1;
        if let Some(snapshot) = &event.metrics_snapshot {
            let values = snapshot.as_array();
            for (sum, value) in sums[index].iter_mut().zip(values) {
                *sum += value;
            }
            samples[index] += 1;
        }
    }

    (0..weeks_back)
        .map(|index| {
            let weeks_before_end = (weeks_back - 1 - index) as i64;
            let end = now - Duration::milliseconds(weeks_before_end * WEEK_MS);
            let start = end - Duration::milliseconds(WEEK_MS);
            let average = |metric: usize| {
                if samples[index] == 0 {
                    NEUTRAL_AVERAGE
                } else {
                    sums[index][metric] / samples[index] as f64
                }
            };

            WeeklyBucket {
                week_index: index,
                start,
                end,
                event_count: counts[index],
                sample_count: samples[index],
                avg_emotional: average(0),
                avg_cognitive: average(1),
                avg_comfort: average(2),
            }
        })
        .collect()
}

/// Tunable trend settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendConfig {
    pub window_weeks: usize,
    pub min_buckets: usize,
    /// Percent change above which a shift is reported
    pub change_threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_weeks: 8,
            min_buckets: 4,
            change_threshold: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricChanges {
    pub emotional: f64,
    pub cognitive: f64,
    pub comfort: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendReport {
    pub weekly: Vec<WeeklyBucket>,
    pub changes: MetricChanges,
    pub summary: String,
}

pub const SUMMARY_CALMER: &str = "Your recent picks are calmer than last month.";
pub const SUMMARY_MORE_INTENSE: &str = "Your recent picks are more emotionally intense than last month.";
pub const SUMMARY_LIGHTER: &str = "You've been choosing movies with a lower cognitive load lately.";
pub const SUMMARY_HEAVIER: &str = "You've been choosing movies with a higher cognitive load lately.";
pub const SUMMARY_CONSISTENT: &str = "Your taste has stayed consistent over the last two months.";

fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

pub fn compute_trends(events: &[Event], now: DateTime<Utc>) -> Option<TrendReport> {
    compute_trends_with(events, now, &TrendConfig::default())
}

/// Month-over-month comparison of the latest weekly buckets
///
/// Returns `None` when the window holds no metric snapshots at all.
pub fn compute_trends_with(
    events: &[Event],
    now: DateTime<Utc>,
    config: &TrendConfig,
) -> Option<TrendReport> {
    let weekly = weekly_aggregates(events, now, config.window_weeks);
    if weekly.len() < config.min_buckets || weekly.iter().all(|b| b.sample_count == 0) {
        return None;
    }

    let half = weekly.len() / 2;
    let (previous, latest) = weekly.split_at(half);

    let change = |metric: fn(&WeeklyBucket) -> f64| {
        percent_change(
            mean(previous.iter().map(metric)),
            mean(latest.iter().map(metric)),
        )
    };

    let changes = MetricChanges {
        emotional: change(|b| b.avg_emotional),
        cognitive: change(|b| b.avg_cognitive),
        comfort: change(|b| b.avg_comfort),
    };

    let summary = if changes.emotional.abs() > config.change_threshold {
        if changes.emotional < 0.0 {
            SUMMARY_CALMER
        } else {
            SUMMARY_MORE_INTENSE
        }
    } else if changes.cognitive.abs() > config.change_threshold {
        if changes.cognitive < 0.0 {
            SUMMARY_LIGHTER
        } else {
            SUMMARY_HEAVIER
        }
    } else {
        SUMMARY_CONSISTENT
    };

    tracing::debug!(
        emotional = changes.emotional,
        cognitive = changes.cognitive,
        comfort = changes.comfort,
        "Computed behavioral trends"
    );

    Some(TrendReport {
        weekly,
        changes,
        summary: summary.to_string(),
    })
}
