use serde::{Deserialize, Serialize};

/// Cadence parameters derived from the configuration, read once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateParameters {
    /// Samples drawn per tick.
    pub batch_size: u32,
    /// Wait before the next tick, in milliseconds.
    pub tick_delay_ms: u64,
    /// Marker diameter in pixels. Cosmetic only, no effect on estimation.
    pub marker_size: u32,
    /// Marker opacity. Cosmetic only, no effect on estimation.
    pub opacity: f64,
}

impl RateParameters {
    pub const MIN_SPEED: u32 = 1;
    pub const MAX_SPEED: u32 = 100;
    pub const MIN_MARKER_SIZE: u32 = 1;
    pub const MAX_MARKER_SIZE: u32 = 10;
    pub const MIN_OPACITY: f64 = 0.1;
    pub const MAX_OPACITY: f64 = 1.0;

    /// Maps the user-facing speed control (1-100) onto both rate axes at
    /// once: `batch_size = speed * 10`, `tick_delay_ms = max(1, 110 - speed)`.
    /// The coupling is deliberate — "faster" simultaneously means larger
    /// batches and shorter waits, not two independent knobs.
    pub fn from_speed(speed: u32) -> Self {
        let speed = speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED);
        Self {
            batch_size: speed * 10,
            tick_delay_ms: u64::from((110 - speed).max(1)),
            marker_size: Self::MIN_MARKER_SIZE,
            opacity: 0.6,
        }
    }

    /// Re-derives both rate axes from a new speed value, leaving the
    /// cosmetic parameters untouched.
    pub fn set_speed(&mut self, speed: u32) {
        let mapped = Self::from_speed(speed);
        self.batch_size = mapped.batch_size;
        self.tick_delay_ms = mapped.tick_delay_ms;
    }

    pub fn set_marker_size(&mut self, size: u32) {
        self.marker_size = size.clamp(Self::MIN_MARKER_SIZE, Self::MAX_MARKER_SIZE);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(Self::MIN_OPACITY, Self::MAX_OPACITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_mapping_matches_control_range() {
        let slow = RateParameters::from_speed(10);
        assert_eq!(slow.batch_size, 100);
        assert_eq!(slow.tick_delay_ms, 100);

        let fast = RateParameters::from_speed(100);
        assert_eq!(fast.batch_size, 1000);
        assert_eq!(fast.tick_delay_ms, 10);
    }

    #[test]
    fn out_of_range_speed_clamps() {
        assert_eq!(RateParameters::from_speed(0).batch_size, 10);
        assert_eq!(RateParameters::from_speed(500).batch_size, 1000);
        assert_eq!(RateParameters::from_speed(500).tick_delay_ms, 10);
    }

    #[test]
    fn set_speed_preserves_cosmetics() {
        let mut params = RateParameters::from_speed(10);
        params.set_marker_size(7);
        params.set_opacity(0.3);
        params.set_speed(100);
        assert_eq!(params.batch_size, 1000);
        assert_eq!(params.marker_size, 7);
        assert_eq!(params.opacity, 0.3);
    }

    #[test]
    fn cosmetic_setters_clamp() {
        let mut params = RateParameters::from_speed(10);
        params.set_marker_size(0);
        assert_eq!(params.marker_size, 1);
        params.set_marker_size(99);
        assert_eq!(params.marker_size, 10);
        params.set_opacity(5.0);
        assert_eq!(params.opacity, 1.0);
        params.set_opacity(0.0);
        assert_eq!(params.opacity, 0.1);
    }
}
