//! Apple Health adapter
//!
//! HealthKit has no public server API; the iOS app exports samples to the
//! companion bridge service, and this adapter queries that service for the
//! samples in range. Samples arrive as typed quantity records which are
//! folded into one reading per refresh.

use crate::error::SyncError;
use crate::types::{BloodPressure, HealthReading, Platform, SleepStages, TimeRange};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{error_from_response, transport_error, AccessCredential, PlatformAdapter};

pub(crate) const DEFAULT_BASE_URL: &str = "https://bridge.vitalsync.app/v1";

/// Apple Health bridge-service adapter
pub struct AppleHealthAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl AppleHealthAdapter {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for AppleHealthAdapter {
    fn platform(&self) -> Platform {
        Platform::AppleHealth
    }

    async fn fetch_reading(
        &self,
        credential: &AccessCredential,
        range: &TimeRange,
    ) -> Result<HealthReading, SyncError> {
        let url = format!("{}/samples", self.base_url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(credential.token())
            .query(&[
                ("start", range.start.to_rfc3339()),
                ("end", range.end.to_rfc3339()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(Platform::AppleHealth, e))?;

        if !resp.status().is_success() {
            return Err(error_from_response(Platform::AppleHealth, resp).await);
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| transport_error(Platform::AppleHealth, e))?;
        let payload: SamplesResponse = serde_json::from_slice(&bytes)?;

        Ok(reading_from_samples(&payload.samples, range.end))
    }
}

/// Fold exported HealthKit samples into one reading.
///
/// Cumulative quantities (steps, energy, distance) sum across samples;
/// heart rate averages; point samples (weight, blood pressure) take the
/// most recent occurrence.
fn reading_from_samples(samples: &[Sample], captured_at: DateTime<Utc>) -> HealthReading {
    let mut reading = HealthReading::empty(Platform::AppleHealth, captured_at);

    reading.steps = sum_of(samples, SampleType::StepCount)
        .map(|total| total.round().clamp(0.0, f64::from(u32::MAX)) as u32);
    reading.heart_rate_bpm = mean_of(samples, SampleType::RestingHeartRate);
    reading.calories_burned = sum_of(samples, SampleType::ActiveEnergyBurned);
    reading.distance_km = sum_of(samples, SampleType::DistanceWalkingRunning);
    reading.weight_kg = last_of(samples, SampleType::BodyMass);

    let asleep = sum_of(samples, SampleType::SleepAnalysis);
    reading.sleep_hours = asleep;
    let stages = (
        last_of(samples, SampleType::SleepDeep),
        last_of(samples, SampleType::SleepLight),
        last_of(samples, SampleType::SleepRem),
        last_of(samples, SampleType::SleepAwake),
    );
    if let (Some(deep), Some(light), Some(rem), Some(awake)) = stages {
        reading.sleep_stages = Some(SleepStages {
            deep_hours: deep,
            light_hours: light,
            rem_hours: rem,
            awake_hours: awake,
        });
    }

    let systolic = last_of(samples, SampleType::BloodPressureSystolic);
    let diastolic = last_of(samples, SampleType::BloodPressureDiastolic);
    if let (Some(systolic), Some(diastolic)) = (systolic, diastolic) {
        reading.blood_pressure = Some(BloodPressure {
            systolic,
            diastolic,
        });
    }

    reading
}

fn sum_of(samples: &[Sample], sample_type: SampleType) -> Option<f64> {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| s.sample_type == sample_type)
        .map(|s| s.value)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

fn mean_of(samples: &[Sample], sample_type: SampleType) -> Option<f64> {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| s.sample_type == sample_type)
        .map(|s| s.value)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn last_of(samples: &[Sample], sample_type: SampleType) -> Option<f64> {
    samples
        .iter()
        .filter(|s| s.sample_type == sample_type)
        .map(|s| s.value)
        .last()
}

// Bridge service response structures

#[derive(Debug, Deserialize)]
struct SamplesResponse {
    #[serde(default)]
    samples: Vec<Sample>,
}

#[derive(Debug, Deserialize)]
struct Sample {
    #[serde(rename = "type")]
    sample_type: SampleType,
    value: f64,
}

/// HealthKit quantity and category types the bridge exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum SampleType {
    StepCount,
    RestingHeartRate,
    SleepAnalysis,
    SleepDeep,
    SleepLight,
    SleepRem,
    SleepAwake,
    ActiveEnergyBurned,
    DistanceWalkingRunning,
    BodyMass,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    /// Types the bridge may add before this crate learns about them
    #[serde(other)]
    Unknown,
}
