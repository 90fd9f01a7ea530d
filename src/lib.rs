//! [![github]](https://github.com/wboayue/fusion-compass)&ensp;[![crates-io]](https://crates.io/crates/fusion-compass)&ensp;[![license]](https://opensource.org/licenses/MIT)
//!
//! [github]: https://img.shields.io/badge/github-8da0cb?style=for-the-badge&labelColor=555555&logo=github
//! [crates-io]: https://img.shields.io/badge/crates.io-fc8d62?style=for-the-badge&labelColor=555555&logo=rust
//! [license]: https://img.shields.io/badge/License-MIT-blue.svg?style=for-the-badge&labelColor=555555
//!
//! Fusion Compass - a magnetic compass heading stream for mobile and embedded hosts
//!
//! Raw accelerometer and magnetometer samples from the host platform are
//! smoothed with an exponential moving average, fused into a tilt-compensated
//! rotation frame, and delivered to a single subscriber as a heading in
//! degrees plus an accuracy estimate, at most once per update interval.
//!
//! # Features
//!
//! - Independent exponential smoothing of the gravity and magnetic streams
//! - Tilt compensation following the common device-orientation convention
//! - Throttled delivery (32 ms minimum interval by default)
//! - Accuracy tagging from platform calibration status (15°, 30°, 45° or unknown)
//! - Explicit per-subscription session; late sensor callbacks are ignored
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::mpsc;
//! use std::time::Duration;
//! use nalgebra::Vector3;
//! use fusion_compass::{Compass, HeadingEvent, ManualSource, RawSample, SensorKind};
//!
//! let source = ManualSource::new(true);
//! let mut compass = Compass::new(source.clone());
//!
//! let (tx, rx) = mpsc::channel::<HeadingEvent>();
//! compass.listen(tx).unwrap();
//!
//! // The platform pushes samples as they arrive
//! for step in 0..20u64 {
//!     let timestamp = Duration::from_millis(step * 10);
//!     source.push_sample(RawSample::new(SensorKind::Gravity, Vector3::new(0.0, 0.0, 9.81), timestamp));
//!     source.push_sample(RawSample::new(SensorKind::MagneticField, Vector3::new(-22.0, 0.0, -40.0), timestamp));
//! }
//!
//! let reading = rx.recv().unwrap().unwrap();
//! assert!((reading.heading - 90.0).abs() < 0.1); // facing east
//!
//! compass.cancel();
//! ```

pub mod clock;
pub mod compass;
mod error;
pub mod filter;
mod math;
pub mod orientation;
pub mod resolver;
pub mod session;
pub mod sink;
pub mod source;
mod types;

// Re-export all public types and functions
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use compass::Compass;
pub use error::CompassError;
pub use filter::SignalFilter;
pub use math::{DEG_TO_RAD, RAD_TO_DEG, STANDARD_GRAVITY, Vector3Ext, normalize_heading};
pub use orientation::RotationFrame;
pub use resolver::OrientationResolver;
pub use session::CompassSession;
pub use sink::{HeadingEvent, HeadingSink};
pub use source::{ManualSource, SensorListener, SensorSource};
pub use types::*;
