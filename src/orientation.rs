//! Tilt-compensated rotation frame built from gravity and magnetic field vectors
//!
//! The frame follows the usual mobile device-orientation convention: device X
//! points right, Y points to the top of the screen and Z out of the screen.
//! The world frame is East-North-Up, so headings computed here are directly
//! comparable with the values produced by native platform sensor fusion.

use crate::math::{RAD_TO_DEG, STANDARD_GRAVITY, Vector3Ext, normalize_heading};
use nalgebra::{Matrix3, RowVector3, Vector3};

/// Squared gravity magnitude below which the device is considered in free fall
const FREE_FALL_GRAVITY_SQUARED: f32 = 0.01 * STANDARD_GRAVITY * STANDARD_GRAVITY;

/// Minimum magnitude of `magnetic × gravity` for a usable east vector
const MIN_EAST_MAGNITUDE: f32 = 0.1;

/// Rotation matrix from device coordinates to the East-North-Up world frame
///
/// Rows are, in order, the east, north and up directions expressed in device
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationFrame {
    matrix: Matrix3<f32>,
}

impl RotationFrame {
    /// Build the frame from a gravity vector and a magnetic field vector
    ///
    /// Gravity defines up, the cross product `magnetic × gravity` defines east
    /// and `up × east` completes north. Returns `None` when the frame is
    /// degenerate: the device is in free fall, the field is missing or
    /// parallel to gravity, or an input is not finite.
    ///
    /// # Example
    /// ```
    /// use nalgebra::Vector3;
    /// use fusion_compass::RotationFrame;
    ///
    /// let gravity = Vector3::new(0.0, 0.0, 9.81);  // lying flat, screen up
    /// let magnetic = Vector3::new(0.0, 22.0, -40.0); // top edge points north
    /// let frame = RotationFrame::from_gravity_and_magnetic(gravity, magnetic).unwrap();
    /// assert!(frame.heading_degrees().abs() < 1e-4);
    /// ```
    pub fn from_gravity_and_magnetic(
        gravity: Vector3<f32>,
        magnetic: Vector3<f32>,
    ) -> Option<Self> {
        if !gravity.all_finite() || !magnetic.all_finite() {
            return None;
        }

        let gravity_squared = gravity.magnitude_squared();
        if gravity_squared < FREE_FALL_GRAVITY_SQUARED {
            return None;
        }

        let east = magnetic.cross(&gravity);
        let east_magnitude = east.magnitude();
        if east_magnitude < MIN_EAST_MAGNITUDE {
            return None;
        }

        let east = east / east_magnitude;
        let up = gravity / gravity_squared.sqrt();
        let north = up.cross(&east);

        let matrix = Matrix3::from_rows(&[
            RowVector3::new(east.x, east.y, east.z),
            RowVector3::new(north.x, north.y, north.z),
            RowVector3::new(up.x, up.y, up.z),
        ]);

        Some(Self { matrix })
    }

    /// Underlying rotation matrix
    pub fn matrix(&self) -> &Matrix3<f32> {
        &self.matrix
    }

    /// Rotation around the up axis in radians, in `[-π, π]`; 0 when the top of the device points north
    pub fn azimuth(&self) -> f32 {
        self.matrix[(0, 1)].atan2(self.matrix[(1, 1)])
    }

    /// Rotation around the east axis in radians
    pub fn pitch(&self) -> f32 {
        (-self.matrix[(2, 1)]).clamp(-1.0, 1.0).asin()
    }

    /// Rotation around the north axis in radians
    pub fn roll(&self) -> f32 {
        (-self.matrix[(2, 0)]).atan2(self.matrix[(2, 2)])
    }

    /// Azimuth, pitch and roll in radians
    pub fn orientation_angles(&self) -> Vector3<f32> {
        Vector3::new(self.azimuth(), self.pitch(), self.roll())
    }

    /// Compass heading in degrees, normalised into `[0, 360)`
    pub fn heading_degrees(&self) -> f64 {
        normalize_heading(f64::from(self.azimuth()) * RAD_TO_DEG)
    }
}
