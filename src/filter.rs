//! Exponential smoothing of the raw gravity and magnetic field streams

use crate::math::Vector3Ext;
use crate::types::SensorKind;
use nalgebra::Vector3;

/// Default weight given to the previous estimate
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.97;

/// Per-stream exponential moving average filter
///
/// Keeps one smoothed estimate for each [`SensorKind`]. Every raw sample is
/// blended into the estimate of its own kind as
/// `estimate = factor * estimate + (1 - factor) * sample`, starting from zero.
/// The two streams never influence each other.
#[derive(Debug, Clone, Copy)]
pub struct SignalFilter {
    /// Weight of the previous estimate
    smoothing_factor: f32,
    /// Smoothed gravity estimate
    gravity: Vector3<f32>,
    /// Smoothed magnetic field estimate
    magnetic: Vector3<f32>,
    /// Samples blended into the gravity estimate
    gravity_samples: u32,
    /// Samples blended into the magnetic field estimate
    magnetic_samples: u32,
}

impl SignalFilter {
    /// Create a filter with the given smoothing factor
    ///
    /// The factor is clamped to `[0, 1]`; `1.0` freezes the estimate at zero
    /// and `0.0` passes raw samples straight through.
    ///
    /// # Example
    /// ```
    /// use nalgebra::Vector3;
    /// use fusion_compass::{SensorKind, SignalFilter};
    ///
    /// let mut filter = SignalFilter::new(0.97);
    /// let smoothed = filter.update(SensorKind::Gravity, Vector3::new(0.0, 0.0, 10.0));
    /// assert!((smoothed.z - 0.3).abs() < 1e-6);
    /// ```
    pub fn new(smoothing_factor: f32) -> Self {
        let smoothing_factor = if smoothing_factor.is_nan() {
            DEFAULT_SMOOTHING_FACTOR
        } else {
            smoothing_factor.clamp(0.0, 1.0)
        };

        Self {
            smoothing_factor,
            gravity: Vector3::zeros(),
            magnetic: Vector3::zeros(),
            gravity_samples: 0,
            magnetic_samples: 0,
        }
    }

    /// Blend a raw sample into the estimate of its kind and return the new estimate
    pub fn update(&mut self, kind: SensorKind, raw: Vector3<f32>) -> Vector3<f32> {
        let factor = self.smoothing_factor;
        match kind {
            SensorKind::Gravity => {
                self.gravity = self.gravity.exponential_blend(&raw, factor);
                self.gravity_samples = self.gravity_samples.saturating_add(1);
                self.gravity
            }
            SensorKind::MagneticField => {
                self.magnetic = self.magnetic.exponential_blend(&raw, factor);
                self.magnetic_samples = self.magnetic_samples.saturating_add(1);
                self.magnetic
            }
        }
    }

    /// Current smoothed estimate for a stream
    pub fn estimate(&self, kind: SensorKind) -> Vector3<f32> {
        match kind {
            SensorKind::Gravity => self.gravity,
            SensorKind::MagneticField => self.magnetic,
        }
    }

    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    pub fn magnetic(&self) -> Vector3<f32> {
        self.magnetic
    }

    /// Number of samples blended into a stream since creation or the last reset
    pub fn sample_count(&self, kind: SensorKind) -> u32 {
        match kind {
            SensorKind::Gravity => self.gravity_samples,
            SensorKind::MagneticField => self.magnetic_samples,
        }
    }

    /// Whether both streams have received at least one sample
    pub fn is_primed(&self) -> bool {
        self.gravity_samples > 0 && self.magnetic_samples > 0
    }

    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }

    /// Return both estimates to zero
    pub fn reset(&mut self) {
        self.gravity = Vector3::zeros();
        self.magnetic = Vector3::zeros();
        self.gravity_samples = 0;
        self.magnetic_samples = 0;
    }
}

impl Default for SignalFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scalar reference recurrence
    fn ema(previous: f32, sample: f32, factor: f32) -> f32 {
        factor * previous + (1.0 - factor) * sample
    }

    #[test]
    fn test_filter_initialization() {
        let filter = SignalFilter::default();

        assert_eq!(filter.gravity(), Vector3::zeros());
        assert_eq!(filter.magnetic(), Vector3::zeros());
        assert_eq!(filter.smoothing_factor(), DEFAULT_SMOOTHING_FACTOR);
        assert!(!filter.is_primed());
    }

    #[test]
    fn test_filter_matches_recurrence() {
        let mut filter = SignalFilter::default();
        let samples = [
            Vector3::new(0.1f32, 9.7, 0.3),
            Vector3::new(-0.2, 9.9, 0.1),
            Vector3::new(0.05, 9.8, -0.4),
            Vector3::new(0.0, 9.81, 0.0),
        ];

        let mut expected = [0.0f32; 3];
        for round in 0..50 {
            let sample = samples[round % samples.len()];
            let smoothed = filter.update(SensorKind::Gravity, sample);

            for axis in 0..3 {
                expected[axis] = ema(expected[axis], sample[axis], DEFAULT_SMOOTHING_FACTOR);
                assert_eq!(smoothed[axis], expected[axis], "axis {} round {}", axis, round);
            }
        }
    }

    #[test]
    fn test_streams_are_independent() {
        let mut filter = SignalFilter::default();

        filter.update(SensorKind::Gravity, Vector3::new(0.0, 9.8, 0.0));
        assert_eq!(filter.magnetic(), Vector3::zeros());
        assert_eq!(filter.sample_count(SensorKind::MagneticField), 0);

        let gravity_before = filter.gravity();
        filter.update(SensorKind::MagneticField, Vector3::new(0.0, 0.0, -50.0));
        assert_eq!(filter.gravity(), gravity_before);
        assert_eq!(filter.estimate(SensorKind::Gravity), gravity_before);
        assert!(filter.is_primed());
    }

    #[test]
    fn test_settling_time() {
        let mut filter = SignalFilter::default();
        let target = Vector3::new(0.0f32, 0.0, 50.0);

        // 100 samples at 10 ms: one second of data
        for _ in 0..100 {
            filter.update(SensorKind::MagneticField, target);
        }

        // 1 - 0.97^100 ≈ 0.952
        let ratio = filter.magnetic().z / target.z;
        assert!((ratio - 0.952).abs() < 0.001, "ratio {}", ratio);
    }

    #[test]
    fn test_factor_clamping() {
        assert_eq!(SignalFilter::new(1.5).smoothing_factor(), 1.0);
        assert_eq!(SignalFilter::new(-0.5).smoothing_factor(), 0.0);
        assert_eq!(SignalFilter::new(f32::NAN).smoothing_factor(), DEFAULT_SMOOTHING_FACTOR);

        let mut passthrough = SignalFilter::new(0.0);
        let sample = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(passthrough.update(SensorKind::Gravity, sample), sample);
    }

    #[test]
    fn test_filter_reset() {
        let mut filter = SignalFilter::default();
        for _ in 0..10 {
            filter.update(SensorKind::Gravity, Vector3::new(0.0, 9.8, 0.0));
            filter.update(SensorKind::MagneticField, Vector3::new(20.0, 0.0, -40.0));
        }
        assert_eq!(filter.sample_count(SensorKind::Gravity), 10);

        filter.reset();
        assert_eq!(filter.gravity(), Vector3::zeros());
        assert_eq!(filter.magnetic(), Vector3::zeros());
        assert_eq!(filter.sample_count(SensorKind::Gravity), 0);
        assert!(!filter.is_primed());
    }
}
