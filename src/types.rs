//! Core types and settings for the Fusion Compass library

use core::time::Duration;
use nalgebra::Vector3;

/// Kind of raw sensor stream feeding the compass
///
/// The compass consumes exactly two streams: a gravity-like acceleration
/// (the accelerometer) and the magnetic field (the magnetometer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Accelerometer reading in m/s², dominated by gravity when at rest
    Gravity,
    /// Magnetometer reading in µT
    MagneticField,
}

/// A single raw sample delivered by the platform sensor source
///
/// # Example
/// ```
/// use core::time::Duration;
/// use nalgebra::Vector3;
/// use fusion_compass::{RawSample, SensorKind};
///
/// let sample = RawSample::new(
///     SensorKind::Gravity,
///     Vector3::new(0.0, 9.8, 0.0),
///     Duration::from_millis(10),
/// );
/// assert_eq!(sample.kind, SensorKind::Gravity);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Stream the sample belongs to
    pub kind: SensorKind,
    /// Raw 3-axis reading in device coordinates
    pub vector: Vector3<f32>,
    /// Platform timestamp of the reading
    pub timestamp: Duration,
}

impl RawSample {
    pub fn new(kind: SensorKind, vector: Vector3<f32>, timestamp: Duration) -> Self {
        Self {
            kind,
            vector,
            timestamp,
        }
    }
}

/// Accuracy status reported by the platform for a sensor
///
/// The platform reports accuracy independently of the sample stream. Only
/// `High`, `Medium` and `Low` carry an angular error estimate; every other
/// status maps to the "unknown" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorAccuracy {
    /// No status received yet, or the sensor lost contact
    #[default]
    Unknown,
    /// Readings cannot be trusted, the device needs calibration
    Unreliable,
    /// Low accuracy, roughly 45° of heading error
    Low,
    /// Medium accuracy, roughly 30° of heading error
    Medium,
    /// High accuracy, roughly 15° of heading error
    High,
}

impl SensorAccuracy {
    /// Sentinel emitted when no angular error estimate is available
    pub const UNKNOWN_DEGREES: f64 = -1.0;

    /// Convert a platform integer status code
    ///
    /// Codes follow the common mobile convention: `-1` no contact,
    /// `0` unreliable, `1` low, `2` medium, `3` high.
    ///
    /// # Example
    /// ```
    /// use fusion_compass::SensorAccuracy;
    ///
    /// assert_eq!(SensorAccuracy::from_status(3), SensorAccuracy::High);
    /// assert_eq!(SensorAccuracy::from_status(0), SensorAccuracy::Unreliable);
    /// assert_eq!(SensorAccuracy::from_status(42), SensorAccuracy::Unknown);
    /// ```
    pub fn from_status(status: i32) -> Self {
        match status {
            0 => SensorAccuracy::Unreliable,
            1 => SensorAccuracy::Low,
            2 => SensorAccuracy::Medium,
            3 => SensorAccuracy::High,
            _ => SensorAccuracy::Unknown,
        }
    }

    /// Approximate heading error in degrees, or `-1` when unknown
    pub fn accuracy_degrees(self) -> f64 {
        match self {
            SensorAccuracy::High => 15.0,
            SensorAccuracy::Medium => 30.0,
            SensorAccuracy::Low => 45.0,
            SensorAccuracy::Unknown | SensorAccuracy::Unreliable => Self::UNKNOWN_DEGREES,
        }
    }
}

/// Heading delivered to the subscriber
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingReading {
    /// Degrees clockwise from magnetic north, in `[0, 360)`
    pub heading: f64,
    /// Approximate error in degrees: one of 15, 30, 45 or -1 (unknown)
    pub accuracy: f64,
}

/// Compass pipeline settings
///
/// # Example
/// ```
/// use core::time::Duration;
/// use fusion_compass::CompassSettings;
///
/// let settings = CompassSettings {
///     smoothing_factor: 0.9,                      // more responsive
///     update_interval: Duration::from_millis(100), // 10 Hz output
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassSettings {
    /// Weight given to the previous estimate in the exponential filter (typically 0.97)
    ///
    /// Higher values reject more noise but settle more slowly. At a 10 ms
    /// sampling period, 0.97 settles within a few hundred milliseconds.
    /// Values outside `[0, 1]` are clamped.
    pub smoothing_factor: f32,
    /// Minimum time between two emitted readings (typically 32 ms)
    pub update_interval: Duration,
    /// Sampling period hint passed to the sensor source (typically 10 ms)
    ///
    /// The platform treats this as a hint; samples may arrive faster or slower.
    pub sampling_period: Duration,
    /// Hold back emission until both streams have delivered a sample
    pub require_both_streams: bool,
}

impl Default for CompassSettings {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.97,
            update_interval: Duration::from_millis(32),
            sampling_period: Duration::from_millis(10),
            require_both_streams: true,
        }
    }
}
