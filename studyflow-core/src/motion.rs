use std::time::{Duration, Instant};

/// Summed per-axis acceleration change above which a sample counts as a shake.
pub const SHAKE_THRESHOLD: f64 = 25.0;
/// Samples arriving sooner than this after the last accepted one are dropped.
pub const SHAKE_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn delta(&self, other: &MotionSample) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

#[derive(Debug, Default)]
pub struct ShakeDetector {
    last: Option<(MotionSample, Instant)>,
}

impl ShakeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one accelerometer sample; returns true when it completes a shake.
    pub fn observe(&mut self, sample: MotionSample, at: Instant) -> bool {
        let Some((prev, prev_at)) = self.last else {
            self.last = Some((sample, at));
            return false;
        };
        if at.saturating_duration_since(prev_at) < SHAKE_DEBOUNCE {
            return false;
        }
        self.last = Some((sample, at));
        sample.delta(&prev) > SHAKE_THRESHOLD
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
