//! Fitbit adapter
//!
//! Fetches the daily summary document from the Fitbit Web API and maps it to
//! a normalized reading. Fitbit reports activity, resting heart rate, sleep
//! with stage breakdown, and logged weight; it has no blood pressure data.

use crate::error::SyncError;
use crate::types::{HealthReading, Platform, SleepStages, TimeRange};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{error_from_response, transport_error, AccessCredential, PlatformAdapter};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.fitbit.com";

/// Fitbit Web API adapter
pub struct FitbitAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl FitbitAdapter {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for FitbitAdapter {
    fn platform(&self) -> Platform {
        Platform::Fitbit
    }

    async fn fetch_reading(
        &self,
        credential: &AccessCredential,
        range: &TimeRange,
    ) -> Result<HealthReading, SyncError> {
        let date = range.end.format("%Y-%m-%d").to_string();
        let url = format!("{}/1/user/-/daily-summary/{date}.json", self.base_url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(credential.token())
            .send()
            .await
            .map_err(|e| transport_error(Platform::Fitbit, e))?;

        if !resp.status().is_success() {
            return Err(error_from_response(Platform::Fitbit, resp).await);
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| transport_error(Platform::Fitbit, e))?;
        let payload: FitbitDailySummary = serde_json::from_slice(&bytes)?;

        Ok(reading_from_payload(&payload, range.end))
    }
}

/// Map the daily summary to a normalized reading. Sections the API omitted
/// stay absent rather than defaulting to zero.
fn reading_from_payload(payload: &FitbitDailySummary, captured_at: DateTime<Utc>) -> HealthReading {
    let mut reading = HealthReading::empty(Platform::Fitbit, captured_at);

    if let Some(summary) = &payload.summary {
        reading.steps = summary.steps;
        reading.calories_burned = summary.calories_out.map(f64::from);
        reading.heart_rate_bpm = summary.resting_heart_rate.map(f64::from);
        reading.distance_km = summary
            .distances
            .iter()
            .find(|d| d.activity == "total")
            .map(|d| d.distance);
    }

    if let Some(sleep) = &payload.sleep {
        reading.sleep_hours = sleep.total_minutes_asleep.map(|m| f64::from(m) / 60.0);
        if let Some(stages) = &sleep.stages {
            reading.sleep_stages = Some(SleepStages {
                deep_hours: f64::from(stages.deep_minutes) / 60.0,
                light_hours: f64::from(stages.light_minutes) / 60.0,
                rem_hours: f64::from(stages.rem_minutes) / 60.0,
                awake_hours: f64::from(stages.wake_minutes) / 60.0,
            });
        }
    }

    // Fitbit returns weight logs newest first
    reading.weight_kg = payload
        .weight
        .as_ref()
        .and_then(|logs| logs.first())
        .map(|log| log.weight);

    reading
}

// Fitbit API response structures

#[derive(Debug, Deserialize)]
struct FitbitDailySummary {
    summary: Option<FitbitActivitySummary>,
    sleep: Option<FitbitSleepSummary>,
    weight: Option<Vec<FitbitWeightLog>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitbitActivitySummary {
    steps: Option<u32>,
    calories_out: Option<u32>,
    resting_heart_rate: Option<u32>,
    #[serde(default)]
    distances: Vec<FitbitDistance>,
}

#[derive(Debug, Deserialize)]
struct FitbitDistance {
    activity: String,
    distance: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitbitSleepSummary {
    total_minutes_asleep: Option<u32>,
    stages: Option<FitbitSleepStages>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitbitSleepStages {
    deep_minutes: u32,
    light_minutes: u32,
    rem_minutes: u32,
    wake_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct FitbitWeightLog {
    weight: f64,
}
