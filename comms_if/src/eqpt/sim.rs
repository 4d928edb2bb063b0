//! # Simulation Model State
//!
//! The simulation exposes a request/reply model state service. The client sends a
//! [`ModelStateRequest`] naming the model it's interested in, and the server replies with a
//! [`ModelStateResponse`] which, on success, carries the model's pose and twist.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Request for the state of a model in the simulation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelStateRequest {
    /// Name of the model in the simulation
    pub model_name: String,
}

/// Response from the simulation to a [`ModelStateRequest`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelStateResponse {
    /// True if the simulation processed the request
    pub success: bool,

    /// Description of any failure
    #[serde(default)]
    pub status_message: String,

    /// The state of the model, present if `success` is true
    #[serde(default)]
    pub state: Option<ModelState>,
}

/// A single sample of a model's state in the world frame.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct ModelState {
    /// Position of the model
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// Orientation of the model as a unit quaternion, ordered `[x, y, z, w]`.
    pub orientation_q: [f64; 4],

    /// Linear velocity of the model
    ///
    /// Units: meters/second
    pub linear_vel_ms: [f64; 3],

    /// Angular velocity of the model
    ///
    /// Units: radians/second
    #[serde(default)]
    pub angular_vel_rads: [f64; 3],

    /// Simulation time the sample was taken at, if the server provides it
    #[serde(default)]
    pub stamp: Option<DateTime<Utc>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ModelState {
    /// Build a planar sample from a position, a quaternion `(x, y, z, w)` and a planar velocity.
    pub fn planar(x_m: f64, y_m: f64, q: (f64, f64, f64, f64), vx_ms: f64, vy_ms: f64) -> Self {
        Self {
            position_m: [x_m, y_m, 0.0],
            orientation_q: [q.0, q.1, q.2, q.3],
            linear_vel_ms: [vx_ms, vy_ms, 0.0],
            ..Default::default()
        }
    }
}
