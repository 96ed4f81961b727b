//! Trend labeling
//!
//! Compares the most recent window of a metric's history against the prior
//! window of equal size and emits a coarse directional label. The sign of the
//! change is combined with the metric's improvement direction, so a falling
//! resting heart rate labels as improving while falling steps label as
//! declining.

use crate::history::MetricHistory;
use crate::types::{TrendLabel, TrendMetric};
use std::collections::BTreeMap;

/// Default comparison window (entries per window)
pub const DEFAULT_TREND_WINDOW: usize = 7;

/// Default relative-change threshold below which a metric is stable (%)
pub const DEFAULT_STABLE_THRESHOLD_PCT: f64 = 5.0;

/// Window-comparison trend analyzer
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    window: usize,
    stable_threshold_pct: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_WINDOW, DEFAULT_STABLE_THRESHOLD_PCT)
    }
}

impl TrendAnalyzer {
    pub fn new(window: usize, stable_threshold_pct: f64) -> Self {
        Self {
            window: window.max(1),
            stable_threshold_pct,
        }
    }

    /// Label every tracked metric from its stored history.
    ///
    /// Metrics with too little history label as `InsufficientData`; the map
    /// always contains every tracked metric.
    pub fn analyze(&self, history: &MetricHistory) -> BTreeMap<TrendMetric, TrendLabel> {
        TrendMetric::ALL
            .iter()
            .map(|&metric| (metric, self.label(metric, history.series(metric))))
            .collect()
    }

    /// Label one metric from its series (oldest first).
    ///
    /// Needs at least two full windows of points; only the most recent
    /// `2 * window` entries participate in the comparison.
    pub fn label(&self, metric: TrendMetric, series: &[f64]) -> TrendLabel {
        if series.len() < self.window * 2 {
            return TrendLabel::InsufficientData;
        }

        let tail = &series[series.len() - self.window * 2..];
        let (prior, recent) = tail.split_at(self.window);
        let prior_mean = mean(prior);
        let recent_mean = mean(recent);

        if prior_mean.abs() < f64::EPSILON {
            // No meaningful base to compute relative change against
            return if recent_mean.abs() < f64::EPSILON {
                TrendLabel::Stable
            } else if (recent_mean > 0.0) == metric.improves_when_rising() {
                TrendLabel::Improving
            } else {
                TrendLabel::Declining
            };
        }

        let change_pct = (recent_mean - prior_mean) / prior_mean.abs() * 100.0;
        if change_pct.abs() < self.stable_threshold_pct {
            return TrendLabel::Stable;
        }

        let rising = change_pct > 0.0;
        if rising == metric.improves_when_rising() {
            TrendLabel::Improving
        } else {
            TrendLabel::Declining
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
