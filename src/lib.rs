//! VitalSync - Multi-platform health signal aggregation and insight derivation
//!
//! VitalSync turns per-platform wearable data into a unified dashboard view
//! through a deterministic pipeline: platform adaptation → validation →
//! aggregation → insight derivation → trend labeling.
//!
//! ## Modules
//!
//! - **Adapters**: fetch one normalized reading per connected platform
//!   (Apple Health, Google Fit, Fitbit)
//! - **Aggregator**: merge readings into one snapshot under fixed per-metric
//!   policies
//! - **Insight Engine**: evaluate the threshold rule battery and label trends

pub mod adapters;
pub mod aggregate;
pub mod error;
pub mod history;
pub mod insights;
pub mod refresh;
pub mod trends;
pub mod types;
pub mod validate;

pub use adapters::{AccessCredential, AdapterRegistry, PlatformAdapter};
pub use aggregate::Aggregator;
pub use error::{SyncError, ValidationError};
pub use history::MetricHistory;
pub use insights::{derive_next_steps, InsightEngine};
pub use refresh::RefreshService;
pub use trends::TrendAnalyzer;
pub use types::{
    AggregatedSnapshot, HealthReading, Insight, InsightSet, Platform, RefreshReport, TimeRange,
    TrendLabel, TrendMetric, UserProfile,
};

/// Crate version embedded in reports produced by the CLI
pub const VITALSYNC_VERSION: &str = env!("CARGO_PKG_VERSION");
