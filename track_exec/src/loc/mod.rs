//! # Localisation module
//!
//! This module turns a raw model state sample (position, orientation quaternion and linear
//! velocity) into the planar state that trajectory control reasons about.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::ModelState;
use nalgebra::Vector2;
use serde::Serialize;
use util::maths::quaternion_to_euler;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The planar state of the vehicle for one control cycle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct VehicleState {
    /// Position in the world frame
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Heading of the vehicle, the angle from the world X axis, right hand rule about Z.
    ///
    /// Units: radians
    pub yaw_rad: f64,

    /// Magnitude of the planar velocity. Never negative.
    ///
    /// Units: meters/second
    pub speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleState {
    pub fn new(x_m: f64, y_m: f64, yaw_rad: f64, speed_ms: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            yaw_rad,
            speed_ms: speed_ms.abs(),
        }
    }

    /// Extract the planar state from a model state sample.
    ///
    /// Speed is the norm of the planar velocity, so the direction of travel is discarded. The
    /// quaternion is not checked for normalisation.
    pub fn from_model_state(model_state: &ModelState) -> Self {
        let [qx, qy, qz, qw] = model_state.orientation_q;
        let (_roll, _pitch, yaw_rad) = quaternion_to_euler(qx, qy, qz, qw);

        let [vx_ms, vy_ms, _] = model_state.linear_vel_ms;

        Self {
            position_m: Vector2::new(model_state.position_m[0], model_state.position_m[1]),
            yaw_rad,
            speed_ms: vx_ms.hypot(vy_ms),
        }
    }

    pub fn x_m(&self) -> f64 {
        self.position_m[0]
    }

    pub fn y_m(&self) -> f64 {
        self.position_m[1]
    }
}
