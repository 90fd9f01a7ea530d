//! Mathematical utilities and nalgebra extensions for the Fusion Compass library

use nalgebra::Vector3;

/// Mathematical constants
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.81;

/// Wrap an angle in degrees into `[0, 360)`
///
/// Matches `((degrees + 360) mod 360)` for azimuths in `[-180, 180]` and
/// stays in range for any finite input.
///
/// # Example
/// ```
/// use fusion_compass::normalize_heading;
///
/// assert_eq!(normalize_heading(-90.0), 270.0);
/// assert_eq!(normalize_heading(180.0), 180.0);
/// assert_eq!(normalize_heading(360.0), 0.0);
/// ```
pub fn normalize_heading(degrees: f64) -> f64 {
    let wrapped = (degrees + 360.0).rem_euclid(360.0);
    // rem_euclid may round up to the modulus for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Exponential moving average step: `factor * self + (1 - factor) * sample`
    fn exponential_blend(&self, sample: &Vector3<f32>, factor: f32) -> Vector3<f32>;

    /// Whether every component is finite
    fn all_finite(&self) -> bool;
}

impl Vector3Ext for Vector3<f32> {
    fn exponential_blend(&self, sample: &Vector3<f32>, factor: f32) -> Vector3<f32> {
        let keep = 1.0 - factor;
        Vector3::new(
            factor * self.x + keep * sample.x,
            factor * self.y + keep * sample.y,
            factor * self.z + keep * sample.z,
        )
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_heading_range() {
        for degrees in [-180.0, -179.5, -90.0, -1e-9, 0.0, 1e-9, 45.0, 179.9, 180.0] {
            let heading = normalize_heading(degrees);
            assert!(
                (0.0..360.0).contains(&heading),
                "{} normalised to {}",
                degrees,
                heading
            );
        }
        assert_eq!(normalize_heading(-0.0), 0.0);
        assert!((normalize_heading(-45.0) - 315.0).abs() < 1e-12);
        assert!((normalize_heading(725.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_blend() {
        let previous = Vector3::new(1.0f32, 2.0, 3.0);
        let sample = Vector3::new(11.0f32, -8.0, 3.0);
        let blended = previous.exponential_blend(&sample, 0.9);

        assert!((blended.x - 2.0).abs() < 1e-5);
        assert!((blended.y - 1.0).abs() < 1e-5);
        assert!((blended.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_blend_extremes() {
        let previous = Vector3::new(1.0f32, 2.0, 3.0);
        let sample = Vector3::new(4.0f32, 5.0, 6.0);

        assert_eq!(previous.exponential_blend(&sample, 1.0), previous);
        assert_eq!(previous.exponential_blend(&sample, 0.0), sample);
    }

    #[test]
    fn test_all_finite() {
        assert!(Vector3::new(1.0f32, 0.0, -1.0).all_finite());
        assert!(!Vector3::new(f32::NAN, 0.0, 0.0).all_finite());
        assert!(!Vector3::new(0.0, f32::INFINITY, 0.0).all_finite());
    }
}
