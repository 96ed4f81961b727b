//! Metric history
//!
//! Per-metric ordered series (oldest first) that the trend analyzer consumes.
//! Callers persist this however they like; it serializes to JSON so it can be
//! saved and reloaded across refreshes.

use crate::types::{AggregatedSnapshot, TrendMetric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rolling per-metric series storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricHistory {
    series: BTreeMap<TrendMetric, Vec<f64>>,
    /// Maximum points kept per metric; unbounded when absent
    limit: Option<usize>,
}

impl MetricHistory {
    /// Unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// History capped at `limit` points per metric, oldest dropped first
    pub fn with_limit(limit: usize) -> Self {
        Self {
            series: BTreeMap::new(),
            limit: Some(limit),
        }
    }

    /// Append one value for a metric
    pub fn push(&mut self, metric: TrendMetric, value: f64) {
        let values = self.series.entry(metric).or_default();
        values.push(value);
        if let Some(limit) = self.limit {
            if values.len() > limit {
                let excess = values.len() - limit;
                values.drain(..excess);
            }
        }
    }

    /// Append every metric the snapshot reports
    pub fn record_snapshot(&mut self, snapshot: &AggregatedSnapshot) {
        if let Some(steps) = snapshot.steps {
            self.push(TrendMetric::Steps, f64::from(steps));
        }
        if let Some(hr) = snapshot.heart_rate_bpm {
            self.push(TrendMetric::HeartRate, f64::from(hr));
        }
        if let Some(sleep) = snapshot.sleep_hours {
            self.push(TrendMetric::SleepHours, sleep);
        }
        if let Some(calories) = snapshot.calories_burned {
            self.push(TrendMetric::Calories, calories);
        }
        if let Some(distance) = snapshot.distance_km {
            self.push(TrendMetric::Distance, distance);
        }
        if let Some(weight) = snapshot.weight_kg {
            self.push(TrendMetric::Weight, weight);
        }
    }

    /// The stored series for a metric, oldest first
    pub fn series(&self, metric: TrendMetric) -> &[f64] {
        self.series.get(&metric).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
