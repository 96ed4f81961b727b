//! Refresh orchestration
//!
//! Drives one refresh request end to end: fan out to every connected
//! platform adapter concurrently, collect what succeeded, merge, evaluate
//! insights and trends, and shape the caller-facing report. A single slow or
//! failed adapter never blocks the others; it is excluded from the merge and
//! recorded in the report's failure list.

use crate::adapters::{AccessCredential, AdapterRegistry};
use crate::aggregate::Aggregator;
use crate::error::SyncError;
use crate::history::MetricHistory;
use crate::insights::{derive_next_steps, InsightEngine};
use crate::trends::TrendAnalyzer;
use crate::types::{
    HealthReading, InsightSet, Platform, PlatformFailure, RefreshReport, TimeRange, UserProfile,
};
use crate::validate::validate_reading;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Default per-adapter timeout
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates adapter fan-out, aggregation, and insight evaluation
pub struct RefreshService {
    registry: AdapterRegistry,
    adapter_timeout: Duration,
    engine: InsightEngine,
    analyzer: TrendAnalyzer,
}

impl RefreshService {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            engine: InsightEngine::new(),
            analyzer: TrendAnalyzer::default(),
        }
    }

    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    pub fn with_trend_analyzer(mut self, analyzer: TrendAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Run one refresh for a set of connected platforms.
    ///
    /// `connections` order expresses platform priority for point-sample
    /// merge fields. Failures are isolated per platform; the refresh itself
    /// always produces a report.
    pub async fn refresh(
        &self,
        connections: &[(Platform, AccessCredential)],
        range: &TimeRange,
        profile: &UserProfile,
        history: &MetricHistory,
        now: DateTime<Utc>,
    ) -> RefreshReport {
        let fetches = connections
            .iter()
            .map(|(platform, credential)| self.fetch_one(*platform, credential, range));
        let outcomes = futures_util::future::join_all(fetches).await;

        let mut readings = Vec::new();
        let mut synced = Vec::new();
        let mut failed = Vec::new();

        for ((platform, _), outcome) in connections.iter().zip(outcomes) {
            match outcome {
                Ok(reading) => {
                    readings.push(reading);
                    synced.push(*platform);
                }
                Err(err) => {
                    tracing::warn!(platform = %platform, error = %err, "platform sync failed");
                    failed.push(PlatformFailure {
                        platform: *platform,
                        kind: err.failure_kind(),
                        detail: err.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            synced = synced.len(),
            failed = failed.len(),
            "merging platform readings"
        );

        let mut report = self.report_from_readings(&readings, profile, history, now);
        report.synced = synced;
        report.failed = failed;
        report
    }

    /// Build a report from already-fetched readings, skipping the network.
    ///
    /// Readings failing physiological validation are dropped from the merge.
    pub fn report_from_readings(
        &self,
        readings: &[HealthReading],
        profile: &UserProfile,
        history: &MetricHistory,
        now: DateTime<Utc>,
    ) -> RefreshReport {
        let valid: Vec<HealthReading> = readings
            .iter()
            .filter(|reading| match validate_reading(reading) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(platform = %reading.platform, error = %err, "reading rejected");
                    false
                }
            })
            .cloned()
            .collect();

        let snapshot = Aggregator::merge(&valid, now);
        let insights = InsightSet::from_insights(self.engine.evaluate(&snapshot, profile, now));
        let next_steps = derive_next_steps(&insights);
        let trends = self.analyzer.analyze(history);
        let synced = valid.iter().map(|r| r.platform).collect();

        RefreshReport {
            snapshot,
            insights,
            trends,
            next_steps,
            synced,
            failed: Vec::new(),
        }
    }

    /// Invoke one adapter with the per-adapter timeout applied
    async fn fetch_one(
        &self,
        platform: Platform,
        credential: &AccessCredential,
        range: &TimeRange,
    ) -> Result<HealthReading, SyncError> {
        let Some(adapter) = self.registry.get(platform) else {
            return Err(SyncError::ProviderUnavailable {
                platform,
                reason: "no adapter registered".to_string(),
            });
        };

        let reading = tokio::time::timeout(
            self.adapter_timeout,
            adapter.fetch_reading(credential, range),
        )
        .await
        .map_err(|_| SyncError::ProviderUnavailable {
            platform,
            reason: format!("timed out after {:?}", self.adapter_timeout),
        })??;

        validate_reading(&reading)?;
        Ok(reading)
    }
}
