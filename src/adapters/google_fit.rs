//! Google Fit adapter
//!
//! Calls the Fitness REST API's dataset aggregate endpoint and maps the
//! bucketed datasets to a normalized reading. Datasets are matched by data
//! type name; datasets the account does not record are simply missing from
//! the response and the corresponding metrics stay absent.

use crate::error::SyncError;
use crate::types::{BloodPressure, HealthReading, Platform, TimeRange};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{error_from_response, transport_error, AccessCredential, PlatformAdapter};

pub(crate) const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/fitness/v1";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const METERS_PER_KM: f64 = 1_000.0;

/// Google Fit REST API adapter
pub struct GoogleFitAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl GoogleFitAdapter {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for GoogleFitAdapter {
    fn platform(&self) -> Platform {
        Platform::GoogleFit
    }

    async fn fetch_reading(
        &self,
        credential: &AccessCredential,
        range: &TimeRange,
    ) -> Result<HealthReading, SyncError> {
        let url = format!("{}/users/me/dataset:aggregate", self.base_url);
        let body = json!({
            "aggregateBy": [
                {"dataTypeName": "com.google.step_count.delta"},
                {"dataTypeName": "com.google.heart_rate.bpm"},
                {"dataTypeName": "com.google.sleep.segment"},
                {"dataTypeName": "com.google.calories.expended"},
                {"dataTypeName": "com.google.distance.delta"},
                {"dataTypeName": "com.google.weight"},
                {"dataTypeName": "com.google.blood_pressure"}
            ],
            "startTimeMillis": range.start.timestamp_millis(),
            "endTimeMillis": range.end.timestamp_millis(),
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(credential.token())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Platform::GoogleFit, e))?;

        if !resp.status().is_success() {
            return Err(error_from_response(Platform::GoogleFit, resp).await);
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| transport_error(Platform::GoogleFit, e))?;
        let payload: AggregateResponse = serde_json::from_slice(&bytes)?;

        Ok(reading_from_payload(&payload, range.end))
    }
}

fn reading_from_payload(payload: &AggregateResponse, captured_at: DateTime<Utc>) -> HealthReading {
    let mut reading = HealthReading::empty(Platform::GoogleFit, captured_at);

    for bucket in &payload.bucket {
        for dataset in &bucket.dataset {
            let source = dataset.data_source_id.as_str();
            if source.contains("step_count") {
                reading.steps = sum_int(dataset).map(|total| total.min(u64::from(u32::MAX)) as u32);
            } else if source.contains("heart_rate") {
                reading.heart_rate_bpm = mean_float(dataset);
            } else if source.contains("sleep") {
                reading.sleep_hours = sum_int(dataset).map(|millis| millis as f64 / MILLIS_PER_HOUR);
            } else if source.contains("calories") {
                reading.calories_burned = sum_float(dataset);
            } else if source.contains("distance") {
                reading.distance_km = sum_float(dataset).map(|meters| meters / METERS_PER_KM);
            } else if source.contains("blood_pressure") {
                reading.blood_pressure = last_blood_pressure(dataset);
            } else if source.contains("weight") {
                reading.weight_kg = last_float(dataset);
            }
        }
    }

    reading
}

fn sum_int(dataset: &Dataset) -> Option<u64> {
    let values: Vec<u64> = dataset
        .point
        .iter()
        .filter_map(|p| p.value.first())
        .filter_map(|v| v.int_val)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

fn sum_float(dataset: &Dataset) -> Option<f64> {
    let values: Vec<f64> = dataset
        .point
        .iter()
        .filter_map(|p| p.value.first())
        .filter_map(|v| v.fp_val)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

fn mean_float(dataset: &Dataset) -> Option<f64> {
    let values: Vec<f64> = dataset
        .point
        .iter()
        .filter_map(|p| p.value.first())
        .filter_map(|v| v.fp_val)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn last_float(dataset: &Dataset) -> Option<f64> {
    dataset
        .point
        .iter()
        .filter_map(|p| p.value.first())
        .filter_map(|v| v.fp_val)
        .last()
}

/// Blood pressure points carry systolic then diastolic as two values
fn last_blood_pressure(dataset: &Dataset) -> Option<BloodPressure> {
    dataset.point.iter().rev().find_map(|p| {
        let systolic = p.value.first()?.fp_val?;
        let diastolic = p.value.get(1)?.fp_val?;
        Some(BloodPressure {
            systolic,
            diastolic,
        })
    })
}

// Fitness REST API response structures

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    bucket: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    #[serde(default)]
    dataset: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Dataset {
    #[serde(default)]
    data_source_id: String,
    #[serde(default)]
    point: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct Point {
    #[serde(default)]
    value: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    fp_val: Option<f64>,
    int_val: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregate_response() {
        let json = r#"{
            "bucket": [{
                "dataset": [
                    {
                        "dataSourceId": "derived:com.google.step_count.delta:aggregated",
                        "point": [
                            {"value": [{"intVal": 3200}]},
                            {"value": [{"intVal": 1800}]}
                        ]
                    },
                    {
                        "dataSourceId": "derived:com.google.heart_rate.bpm:aggregated",
                        "point": [
                            {"value": [{"fpVal": 64.0}]},
                            {"value": [{"fpVal": 70.0}]}
                        ]
                    },
                    {
                        "dataSourceId": "derived:com.google.distance.delta:aggregated",
                        "point": [{"value": [{"fpVal": 4200.0}]}]
                    },
                    {
                        "dataSourceId": "derived:com.google.weight:aggregated",
                        "point": [
                            {"value": [{"fpVal": 81.0}]},
                            {"value": [{"fpVal": 80.4}]}
                        ]
                    },
                    {
                        "dataSourceId": "derived:com.google.blood_pressure:aggregated",
                        "point": [{"value": [{"fpVal": 122.0}, {"fpVal": 79.0}]}]
                    }
                ]
            }]
        }"#;

        let payload: AggregateResponse = serde_json::from_str(json).unwrap();
        let reading = reading_from_payload(&payload, Utc::now());

        assert_eq!(reading.steps, Some(5000));
        assert_eq!(reading.heart_rate_bpm, Some(67.0));
        assert_eq!(reading.distance_km, Some(4.2));
        // Most recent weight log wins
        assert_eq!(reading.weight_kg, Some(80.4));
        let bp = reading.blood_pressure.unwrap();
        assert_eq!(bp.systolic, 122.0);
        assert_eq!(bp.diastolic, 79.0);
    }

    #[test]
    fn test_sleep_millis_converted_to_hours() {
        let json = r#"{
            "bucket": [{
                "dataset": [{
                    "dataSourceId": "derived:com.google.sleep.segment:aggregated",
                    "point": [{"value": [{"intVal": 27000000}]}]
                }]
            }]
        }"#;
        let payload: AggregateResponse = serde_json::from_str(json).unwrap();
        let reading = reading_from_payload(&payload, Utc::now());
        assert_eq!(reading.sleep_hours, Some(7.5));
    }

    #[test]
    fn test_empty_buckets_yield_empty_reading() {
        let payload: AggregateResponse = serde_json::from_str(r#"{"bucket": []}"#).unwrap();
        let reading = reading_from_payload(&payload, Utc::now());
        assert!(reading.is_empty());
    }

    #[test]
    fn test_empty_dataset_keeps_metric_absent() {
        let json = r#"{
            "bucket": [{
                "dataset": [{
                    "dataSourceId": "derived:com.google.step_count.delta:aggregated",
                    "point": []
                }]
            }]
        }"#;
        let payload: AggregateResponse = serde_json::from_str(json).unwrap();
        let reading = reading_from_payload(&payload, Utc::now());
        assert!(reading.steps.is_none());
    }
}
