use serde::{Deserialize, Serialize};

/// A record of the estimator metrics at a specific tick, collected at the
/// configured record interval and saved alongside the exported results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// The tick at which the snapshot was taken.
    pub tick: u64,
    /// Samples drawn since the last reset.
    pub total_points: u64,
    /// Subset of `total_points` that fell inside the unit disk.
    pub points_inside: u64,
    /// Running estimate, `4 * points_inside / total_points`.
    pub estimate: f64,
    /// `|pi - estimate|`.
    pub absolute_error: f64,
    /// `absolute_error / pi * 100`.
    pub relative_error_percent: f64,
}
