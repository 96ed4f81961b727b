//! Physiological range validation
//!
//! Adapter readings are checked against coarse physiological bounds before
//! they can enter aggregation. A reading failing any check is rejected whole;
//! out-of-range values would silently corrupt downstream sums and means.

use crate::error::ValidationError;
use crate::types::HealthReading;

const STEPS_MAX: f64 = 200_000.0;
const HEART_RATE_MIN: f64 = 20.0;
const HEART_RATE_MAX: f64 = 260.0;
const SLEEP_HOURS_MAX: f64 = 24.0;
const CALORIES_MAX: f64 = 20_000.0;
const DISTANCE_KM_MAX: f64 = 500.0;
const WEIGHT_KG_MIN: f64 = 20.0;
const WEIGHT_KG_MAX: f64 = 500.0;
const SYSTOLIC_MIN: f64 = 50.0;
const SYSTOLIC_MAX: f64 = 260.0;
const DIASTOLIC_MIN: f64 = 30.0;
const DIASTOLIC_MAX: f64 = 200.0;

/// Validate every reported metric of a reading against its bounds.
pub fn validate_reading(reading: &HealthReading) -> Result<(), ValidationError> {
    if let Some(steps) = reading.steps {
        check("steps", f64::from(steps), 0.0, STEPS_MAX)?;
    }
    if let Some(hr) = reading.heart_rate_bpm {
        check("heart_rate_bpm", hr, HEART_RATE_MIN, HEART_RATE_MAX)?;
    }
    if let Some(sleep) = reading.sleep_hours {
        check("sleep_hours", sleep, 0.0, SLEEP_HOURS_MAX)?;
    }
    if let Some(calories) = reading.calories_burned {
        check("calories_burned", calories, 0.0, CALORIES_MAX)?;
    }
    if let Some(distance) = reading.distance_km {
        check("distance_km", distance, 0.0, DISTANCE_KM_MAX)?;
    }
    if let Some(weight) = reading.weight_kg {
        check("weight_kg", weight, WEIGHT_KG_MIN, WEIGHT_KG_MAX)?;
    }
    if let Some(bp) = reading.blood_pressure {
        check("systolic", bp.systolic, SYSTOLIC_MIN, SYSTOLIC_MAX)?;
        check("diastolic", bp.diastolic, DIASTOLIC_MIN, DIASTOLIC_MAX)?;
    }
    if let Some(stages) = reading.sleep_stages {
        check("deep_hours", stages.deep_hours, 0.0, SLEEP_HOURS_MAX)?;
        check("light_hours", stages.light_hours, 0.0, SLEEP_HOURS_MAX)?;
        check("rem_hours", stages.rem_hours, 0.0, SLEEP_HOURS_MAX)?;
        check("awake_hours", stages.awake_hours, 0.0, SLEEP_HOURS_MAX)?;
    }
    Ok(())
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
