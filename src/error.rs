//! Error types for VitalSync

use crate::types::{FailureKind, Platform};
use thiserror::Error;

/// Errors that can occur while syncing and aggregating health data.
///
/// `NoData` is deliberately not represented here: an authenticated platform
/// with no samples in range returns an empty reading, not an error.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{platform}: credential rejected, reconnect required")]
    Unauthorized { platform: Platform },

    #[error("{platform}: provider unavailable: {reason}")]
    ProviderUnavailable { platform: Platform, reason: String },

    #[error("invalid reading: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed provider payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Classify an HTTP failure from a provider API.
    ///
    /// 401/403 mean the stored token is expired or revoked; everything else
    /// is treated as transient and retryable on the next refresh.
    pub fn from_status(platform: Platform, status: u16, body_snippet: String) -> Self {
        match status {
            401 | 403 => SyncError::Unauthorized { platform },
            _ => SyncError::ProviderUnavailable {
                platform,
                reason: format!("HTTP {status}: {body_snippet}"),
            },
        }
    }

    /// Failure classification for the refresh report.
    ///
    /// Payload decode failures count as provider faults; validation
    /// rejections keep their own kind so callers can tell a provider
    /// outage from a provider sending garbage values.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            SyncError::Unauthorized { .. } => FailureKind::Unauthorized,
            SyncError::Validation(_) => FailureKind::InvalidReading,
            SyncError::ProviderUnavailable { .. } | SyncError::Json(_) => {
                FailureKind::ProviderUnavailable
            }
        }
    }
}

/// A metric value outside its physiological range, rejected before it can
/// enter the snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} value {value} outside physiological range {min}..={max}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = SyncError::from_status(Platform::Fitbit, 401, "expired".to_string());
        assert!(matches!(err, SyncError::Unauthorized { .. }));
        assert_eq!(err.failure_kind(), FailureKind::Unauthorized);

        let err = SyncError::from_status(Platform::GoogleFit, 503, "down".to_string());
        assert!(matches!(err, SyncError::ProviderUnavailable { .. }));
        assert_eq!(err.failure_kind(), FailureKind::ProviderUnavailable);
    }

    #[test]
    fn test_validation_failure_kind() {
        let err = SyncError::Validation(ValidationError {
            field: "steps",
            value: 900_000.0,
            min: 0.0,
            max: 200_000.0,
        });
        assert_eq!(err.failure_kind(), FailureKind::InvalidReading);
    }

    #[test]
    fn test_decode_failure_counts_as_provider_fault() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = SyncError::from(json_err);
        assert_eq!(err.failure_kind(), FailureKind::ProviderUnavailable);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError {
            field: "heart_rate_bpm",
            value: 300.0,
            min: 20.0,
            max: 260.0,
        };
        assert!(err.to_string().contains("heart_rate_bpm"));
        assert!(err.to_string().contains("300"));
    }
}
