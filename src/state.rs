use estimator_common::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Accumulated sample counters and the metrics derived from them. One
/// instance lives for the whole process; only the sampler mutates it during
/// a tick, and only Reset zeroes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)] // Serialize/Deserialize for saving
pub struct SimulationState {
    /// Samples drawn since the last reset.
    pub total_points: u64,
    /// Subset of `total_points` inside the unit disk.
    pub points_inside: u64,
    /// Running estimate, `4 * points_inside / total_points`; 0 before the
    /// first batch.
    pub estimate: f64,
    /// `|pi - estimate|`; displayed as 0 while no samples exist.
    pub absolute_error: f64,
    /// `absolute_error / pi * 100`; displayed as 0 while no samples exist.
    pub relative_error_percent: f64,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one classified batch into the counters and recomputes the
    /// derived metrics. O(1) per call: all history is subsumed by the two
    /// counters, so estimation memory stays constant no matter how many
    /// samples have been drawn.
    pub fn record_batch(&mut self, drawn: u64, inside: u64) {
        debug_assert!(inside <= drawn, "a batch cannot contain more inside points than samples");
        self.total_points += drawn;
        self.points_inside += inside;
        self.recompute_metrics();
    }

    fn recompute_metrics(&mut self) {
        if self.total_points == 0 {
            self.estimate = 0.0;
            self.absolute_error = 0.0;
            self.relative_error_percent = 0.0;
            return;
        }
        self.estimate = 4.0 * self.points_inside as f64 / self.total_points as f64;
        self.absolute_error = (PI - self.estimate).abs();
        self.relative_error_percent = self.absolute_error / PI * 100.0;
    }

    /// Zeroes all counters and metrics. Used by Reset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Captures the current metrics as a history record.
    pub fn snapshot(&self, tick: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            tick,
            total_points: self.total_points,
            points_inside: self.points_inside,
            estimate: self.estimate,
            absolute_error: self.absolute_error,
            relative_error_percent: self.relative_error_percent,
        }
    }
}
