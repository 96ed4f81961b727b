//! Cross-platform aggregation
//!
//! Merges per-platform readings into one unified snapshot under a fixed
//! per-metric policy:
//! - Additive metrics (steps, calories, distance) are summed
//! - Representative metrics (heart rate, sleep hours) are averaged
//! - Point samples (weight, blood pressure, sleep stages) take the first
//!   reporting platform, scanning in the given priority order
//!
//! The merge is pure: no I/O, no mutation of inputs, deterministic for a
//! given input list and order.

use crate::types::{AggregatedSnapshot, HealthReading};
use chrono::{DateTime, Utc};

/// Aggregator for merging readings into a snapshot
pub struct Aggregator;

impl Aggregator {
    /// Merge zero or more readings, ordered by platform priority.
    ///
    /// An empty input yields a snapshot with every field absent.
    pub fn merge(readings: &[HealthReading], computed_at: DateTime<Utc>) -> AggregatedSnapshot {
        let sources = readings
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.platform)
            .collect();

        AggregatedSnapshot {
            steps: sum_u32(readings, |r| r.steps),
            heart_rate_bpm: mean_rounded(readings, |r| r.heart_rate_bpm),
            sleep_hours: mean_tenths(readings, |r| r.sleep_hours),
            calories_burned: sum_f64(readings, |r| r.calories_burned),
            distance_km: sum_f64(readings, |r| r.distance_km),
            weight_kg: first_reported(readings, |r| r.weight_kg),
            blood_pressure: first_reported(readings, |r| r.blood_pressure),
            sleep_stages: first_reported(readings, |r| r.sleep_stages),
            sources,
            computed_at,
        }
    }
}

/// Sum an additive integer metric; absent when no reading reports it
fn sum_u32(readings: &[HealthReading], get: impl Fn(&HealthReading) -> Option<u32>) -> Option<u32> {
    let mut total: Option<u32> = None;
    for reading in readings {
        if let Some(value) = get(reading) {
            total = Some(total.unwrap_or(0).saturating_add(value));
        }
    }
    total
}

/// Sum an additive float metric; absent when no reading reports it
fn sum_f64(readings: &[HealthReading], get: impl Fn(&HealthReading) -> Option<f64>) -> Option<f64> {
    let mut total: Option<f64> = None;
    for reading in readings {
        if let Some(value) = get(reading) {
            total = Some(total.unwrap_or(0.0) + value);
        }
    }
    total
}

/// Arithmetic mean over reporting readings
fn mean(readings: &[HealthReading], get: impl Fn(&HealthReading) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = readings.iter().filter_map(get).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean rounded to the nearest integer (heart rate)
fn mean_rounded(
    readings: &[HealthReading],
    get: impl Fn(&HealthReading) -> Option<f64>,
) -> Option<u32> {
    mean(readings, get).map(|m| m.round().max(0.0) as u32)
}

/// Mean rounded to the nearest 0.1 (sleep hours)
fn mean_tenths(
    readings: &[HealthReading],
    get: impl Fn(&HealthReading) -> Option<f64>,
) -> Option<f64> {
    mean(readings, get).map(|m| (m * 10.0).round() / 10.0)
}

/// First reading in priority order that reports the field
fn first_reported<T>(
    readings: &[HealthReading],
    get: impl Fn(&HealthReading) -> Option<T>,
) -> Option<T> {
    readings.iter().find_map(get)
}
