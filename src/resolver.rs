//! Fusion of the smoothed vectors into throttled heading readings

use crate::filter::SignalFilter;
use crate::orientation::RotationFrame;
use crate::types::{CompassSettings, HeadingReading, SensorAccuracy};
use std::time::{Duration, Instant};

/// Turns the current filter state into heading readings at a bounded rate
///
/// Each call to [`resolve`](Self::resolve) is one fusion attempt. An attempt
/// produces a reading only when the throttle interval has elapsed since the
/// previous reading and a rotation frame is available. When the smoothed
/// vectors are momentarily degenerate the last valid frame is reused.
#[derive(Debug, Clone)]
pub struct OrientationResolver {
    /// Minimum time between readings
    update_interval: Duration,
    /// Wait for both streams before the first reading
    require_both_streams: bool,
    /// Instant of the most recent reading
    last_emission: Option<Instant>,
    /// Most recent non-degenerate frame
    last_frame: Option<RotationFrame>,
    /// Latest magnetometer accuracy reported by the platform
    accuracy: SensorAccuracy,
}

impl OrientationResolver {
    pub fn new() -> Self {
        Self::with_settings(&CompassSettings::default())
    }

    pub fn with_settings(settings: &CompassSettings) -> Self {
        Self {
            update_interval: settings.update_interval,
            require_both_streams: settings.require_both_streams,
            last_emission: None,
            last_frame: None,
            accuracy: SensorAccuracy::Unknown,
        }
    }

    /// Record a new accuracy status, returning whether it changed
    pub fn set_accuracy(&mut self, accuracy: SensorAccuracy) -> bool {
        if self.accuracy == accuracy {
            return false;
        }
        self.accuracy = accuracy;
        true
    }

    pub fn accuracy(&self) -> SensorAccuracy {
        self.accuracy
    }

    /// Attempt to produce a reading at time `now`
    ///
    /// Returns `None` when throttled, when a stream has not delivered any
    /// sample yet (if required) or when no valid frame has been built so far.
    /// The throttle only advances when a reading is produced.
    ///
    /// # Example
    /// ```
    /// use std::time::{Duration, Instant};
    /// use nalgebra::Vector3;
    /// use fusion_compass::{OrientationResolver, SensorKind, SignalFilter};
    ///
    /// let mut filter = SignalFilter::new(0.0); // no smoothing
    /// filter.update(SensorKind::Gravity, Vector3::new(0.0, 0.0, 9.81));
    /// filter.update(SensorKind::MagneticField, Vector3::new(-22.0, 0.0, -40.0));
    ///
    /// let mut resolver = OrientationResolver::new();
    /// let now = Instant::now();
    /// let reading = resolver.resolve(&filter, now).unwrap();
    /// assert!((reading.heading - 90.0).abs() < 1e-3);
    ///
    /// // Throttled until 32 ms have passed
    /// assert!(resolver.resolve(&filter, now + Duration::from_millis(31)).is_none());
    /// assert!(resolver.resolve(&filter, now + Duration::from_millis(32)).is_some());
    /// ```
    pub fn resolve(&mut self, filter: &SignalFilter, now: Instant) -> Option<HeadingReading> {
        let throttled = self
            .last_emission
            .is_some_and(|last| now.saturating_duration_since(last) < self.update_interval);
        if throttled {
            return None;
        }

        if self.require_both_streams && !filter.is_primed() {
            return None;
        }

        let candidate = RotationFrame::from_gravity_and_magnetic(filter.gravity(), filter.magnetic());
        let frame = match candidate {
            Some(frame) => {
                if self.last_frame.is_none() {
                    tracing::debug!("First valid rotation frame");
                }
                self.last_frame = Some(frame);
                frame
            }
            None => match self.last_frame {
                Some(previous) => previous,
                None => {
                    tracing::trace!("Rotation frame degenerate, no previous frame to reuse");
                    return None;
                }
            },
        };

        let reading = HeadingReading {
            heading: frame.heading_degrees(),
            accuracy: self.accuracy.accuracy_degrees(),
        };
        self.last_emission = Some(now);

        Some(reading)
    }

    /// Earliest instant the next reading may be produced
    ///
    /// `None` before the first reading, and when the interval reaches past
    /// the range of [`Instant`] (no further reading will be produced).
    pub fn next_emission(&self) -> Option<Instant> {
        self.last_emission?.checked_add(self.update_interval)
    }

    pub fn last_frame(&self) -> Option<&RotationFrame> {
        self.last_frame.as_ref()
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Forget the throttle, the cached frame and the accuracy status
    pub fn reset(&mut self) {
        self.last_emission = None;
        self.last_frame = None;
        self.accuracy = SensorAccuracy::Unknown;
    }
}

impl Default for OrientationResolver {
    fn default() -> Self {
        Self::new()
    }
}
