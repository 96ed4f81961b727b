//! Core types for the VitalSync pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: per-platform readings, the aggregated snapshot, derived insights,
//! and the caller-facing refresh report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Platform identifier for provenance tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    AppleHealth,
    GoogleFit,
    Fitbit,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::AppleHealth => "apple-health",
            Platform::GoogleFit => "google-fit",
            Platform::Fitbit => "fitbit",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single blood pressure sample (mmHg)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

/// Sleep stage breakdown for one night (hours per stage)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepStages {
    pub deep_hours: f64,
    pub light_hours: f64,
    pub rem_hours: f64,
    pub awake_hours: f64,
}

/// One platform's health snapshot for a time window.
///
/// Every metric is optional: absence means "not reported by this source",
/// never zero. Readings are immutable once produced by an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReading {
    /// Source platform
    pub platform: Platform,
    /// When the reading was captured
    pub captured_at: DateTime<Utc>,
    /// Step count for the window
    pub steps: Option<u32>,
    /// Resting heart rate (bpm)
    pub heart_rate_bpm: Option<f64>,
    /// Total sleep duration (hours)
    pub sleep_hours: Option<f64>,
    /// Calories burned (kcal)
    pub calories_burned: Option<f64>,
    /// Distance covered (km)
    pub distance_km: Option<f64>,
    /// Body weight (kg)
    pub weight_kg: Option<f64>,
    /// Blood pressure sample
    pub blood_pressure: Option<BloodPressure>,
    /// Sleep stage breakdown
    pub sleep_stages: Option<SleepStages>,
}

impl HealthReading {
    /// A reading with every metric absent: the `NoData` case for an
    /// authenticated platform that had no samples in range.
    pub fn empty(platform: Platform, captured_at: DateTime<Utc>) -> Self {
        Self {
            platform,
            captured_at,
            steps: None,
            heart_rate_bpm: None,
            sleep_hours: None,
            calories_burned: None,
            distance_km: None,
            weight_kg: None,
            blood_pressure: None,
            sleep_stages: None,
        }
    }

    /// True when no metric is reported at all
    pub fn is_empty(&self) -> bool {
        self.steps.is_none()
            && self.heart_rate_bpm.is_none()
            && self.sleep_hours.is_none()
            && self.calories_burned.is_none()
            && self.distance_km.is_none()
            && self.weight_kg.is_none()
            && self.blood_pressure.is_none()
            && self.sleep_stages.is_none()
    }
}

/// The unified cross-platform view produced by the aggregator.
///
/// Recomputed on every refresh; never the persisted source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSnapshot {
    /// Total steps across all reporting platforms
    pub steps: Option<u32>,
    /// Mean heart rate, rounded to the nearest bpm
    pub heart_rate_bpm: Option<u32>,
    /// Mean sleep duration, rounded to the nearest 0.1 h
    pub sleep_hours: Option<f64>,
    /// Total calories across all reporting platforms
    pub calories_burned: Option<f64>,
    /// Total distance across all reporting platforms (km)
    pub distance_km: Option<f64>,
    /// First reported weight, by platform priority order
    pub weight_kg: Option<f64>,
    /// First reported blood pressure, by platform priority order
    pub blood_pressure: Option<BloodPressure>,
    /// First reported sleep stages, by platform priority order
    pub sleep_stages: Option<SleepStages>,
    /// Platforms that contributed at least one metric, in priority order
    pub sources: Vec<Platform>,
    /// When the snapshot was computed
    pub computed_at: DateTime<Utc>,
}

impl AggregatedSnapshot {
    /// A snapshot with every field absent (no readings to merge)
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            steps: None,
            heart_rate_bpm: None,
            sleep_hours: None,
            calories_burned: None,
            distance_km: None,
            weight_kg: None,
            blood_pressure: None,
            sleep_stages: None,
            sources: Vec::new(),
            computed_at,
        }
    }
}

/// Insight classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Recommendation,
    Alert,
    Achievement,
}

/// Priority for recommendations, severity for alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Domain tag for an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Nutrition,
    Cardiovascular,
    Fitness,
    Sleep,
    Wellness,
    Metabolic,
}

/// A derived recommendation, alert, or achievement.
///
/// Immutable after creation except for the read flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    /// Present for recommendations and alerts, absent for achievements
    pub priority: Option<Priority>,
    pub category: Category,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Insight {
    /// Mark the insight as read. The only mutation permitted post-creation.
    pub fn mark_read(&mut self) {
        self.is_read = true;
    }

    /// Stable identity of the value-carrying fields, ignoring the random id.
    /// Used for deduplication against previously stored insights.
    pub fn fingerprint(&self) -> String {
        format!(
            "{:?}|{:?}|{:?}|{}",
            self.kind, self.category, self.priority, self.title
        )
    }
}

/// Coarse directional label for a metric over a recent history window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// Metrics that trend analysis tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Steps,
    HeartRate,
    SleepHours,
    Calories,
    Distance,
    Weight,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 6] = [
        TrendMetric::Steps,
        TrendMetric::HeartRate,
        TrendMetric::SleepHours,
        TrendMetric::Calories,
        TrendMetric::Distance,
        TrendMetric::Weight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendMetric::Steps => "steps",
            TrendMetric::HeartRate => "heart_rate",
            TrendMetric::SleepHours => "sleep_hours",
            TrendMetric::Calories => "calories",
            TrendMetric::Distance => "distance",
            TrendMetric::Weight => "weight",
        }
    }

    /// Whether a rising series counts as improvement for this metric
    pub fn improves_when_rising(&self) -> bool {
        match self {
            TrendMetric::Steps
            | TrendMetric::SleepHours
            | TrendMetric::Calories
            | TrendMetric::Distance => true,
            TrendMetric::HeartRate | TrendMetric::Weight => false,
        }
    }
}

/// Caller-supplied profile fields the insight engine needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Height in centimeters, required for BMI rules
    pub height_cm: Option<f64>,
}

/// Time range a refresh covers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// From UTC midnight of `now`'s date up to `now`
    pub fn today(now: DateTime<Utc>) -> Self {
        let start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();
        Self { start, end: now }
    }
}

/// Insights grouped by kind for the caller-facing contract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightSet {
    pub recommendations: Vec<Insight>,
    pub alerts: Vec<Insight>,
    pub achievements: Vec<Insight>,
}

impl InsightSet {
    pub fn from_insights(insights: Vec<Insight>) -> Self {
        let mut set = Self::default();
        for insight in insights {
            match insight.kind {
                InsightKind::Recommendation => set.recommendations.push(insight),
                InsightKind::Alert => set.alerts.push(insight),
                InsightKind::Achievement => set.achievements.push(insight),
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.recommendations.len() + self.alerts.len() + self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Why a platform failed to sync during a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credential rejected; the caller should re-run the connect flow
    Unauthorized,
    /// Upstream request failed or timed out; retryable on the next refresh
    ProviderUnavailable,
    /// Reading carried out-of-physiological-range values and was rejected
    /// before it could enter the merge
    InvalidReading,
}

/// One platform's failure record within an otherwise successful refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformFailure {
    pub platform: Platform,
    pub kind: FailureKind,
    pub detail: String,
}

/// Complete result of one refresh request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub snapshot: AggregatedSnapshot,
    pub insights: InsightSet,
    pub trends: BTreeMap<TrendMetric, TrendLabel>,
    pub next_steps: Vec<String>,
    /// Platforms whose readings entered the merge, in priority order
    pub synced: Vec<Platform>,
    /// Platforms that failed and were excluded from the merge
    pub failed: Vec<PlatformFailure>,
}

impl RefreshReport {
    /// Human-readable "N of M platforms synced" summary
    pub fn sync_summary(&self) -> String {
        let total = self.synced.len() + self.failed.len();
        format!("{} of {} platforms synced", self.synced.len(), total)
    }
}
