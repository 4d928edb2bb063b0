//! # Drive Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An Ackermann drive command, sent to the vehicle once per control cycle.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct AckermannDrive {
    /// The target forward speed of the vehicle in meters/second.
    ///
    /// Positive speeds are "forwards", negative speeds are "backwards"
    pub speed_ms: f64,

    /// The target steering angle in radians.
    ///
    /// Follows the right hand rule about the vehicle's Z+ (upwards) axis, so that a positive
    /// steering angle turns the vehicle to the left.
    pub steering_angle_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AckermannDrive {
    /// Create a new command.
    pub fn new(speed_ms: f64, steering_angle_rad: f64) -> Self {
        Self {
            speed_ms,
            steering_angle_rad,
        }
    }

    /// The zero speed, zero steering command.
    pub fn stop() -> Self {
        Self::default()
    }

    /// Returns true if both fields are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.speed_ms.is_finite() && self.steering_angle_rad.is_finite()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stop() {
        let cmd = AckermannDrive::stop();
        assert_eq!(cmd.speed_ms, 0.0);
        assert_eq!(cmd.steering_angle_rad, 0.0);
        assert!(cmd.is_finite());
    }

    #[test]
    fn test_is_finite() {
        assert!(AckermannDrive::new(16.0, -0.3).is_finite());
        assert!(!AckermannDrive::new(f64::NAN, 0.0).is_finite());
        assert!(!AckermannDrive::new(8.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&AckermannDrive::new(8.0, 0.5)).unwrap();
        assert_eq!(json, r#"{"speed_ms":8.0,"steering_angle_rad":0.5}"#);
    }
}
