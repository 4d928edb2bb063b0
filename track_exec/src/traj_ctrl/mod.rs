//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the vehicle on the target path, which is given
//! as an ordered list of unreached waypoints. Each cycle it takes the vehicle's state and produces
//! an Ackermann drive command made of a speed demand and a steering demand.
//!
//! Both demands are calculated from the same reference point, the *lookahead point*. This is the
//! second unreached waypoint if there is one, otherwise the last. Looking one waypoint further
//! than the immediate target smooths out the heading error as waypoints are passed.
//!
//! - The longitudinal controller commands the cruise speed, unless the heading error to the
//!   lookahead point exceeds a threshold, in which case the slower cornering speed is used.
//! - The lateral controller is a pure pursuit controller. For a lookahead point at distance `ld`
//!   and angle `alpha` from the vehicle's heading the steering angle is
//!   `atan(2 L sin(alpha) / ld)`, where `L` is the wheelbase.
//!
//! The externally supplied target point is superseded by the lookahead point unless the
//! `lookahead_source` parameter is set to `Target`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod diag;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use diag::*;
pub use params::*;
pub use state::*;

use comms_if::eqpt::{AckermannDrive, ModelState};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Errors reported by the collaborators of trajectory control.
pub type CollabError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A sink which accepts drive commands and passes them on to the vehicle.
pub trait DriveSink {
    /// Send a single command to the vehicle.
    fn send_drive(&mut self, cmd: &AckermannDrive) -> Result<(), CollabError>;
}

/// A source of vehicle state samples.
///
/// The call blocks until a sample is available or the source gives up. Any waiting, retrying or
/// backoff is the source's business, not trajectory control's.
pub trait StateSource {
    /// Get the latest model state sample.
    fn get_state(&mut self) -> Result<ModelState, CollabError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not create the archives: {0}")]
    ArchiveError(util::archive::ArchiveError),

    /// The controllers were given an empty list of unreached waypoints, so there's no point to
    /// steer towards.
    #[error("The unreached waypoint list is empty")]
    NoWaypoints,

    /// The lookahead point is at the vehicle's position, so the pure pursuit curvature is
    /// undefined.
    #[error("The lookahead distance is zero ({0} m)")]
    DegenerateGeometry(f64),

    /// The state source couldn't provide a sample for this cycle.
    #[error("Could not get the vehicle state: {0}")]
    StateSourceFailure(CollabError),

    /// A command containing NaN or infinity was calculated, the stop command was sent instead.
    #[error("Calculated a non-finite command: {0:?}")]
    NonFiniteCommand(AckermannDrive),

    /// The drive sink rejected the command.
    #[error("Could not send the drive command: {0}")]
    SinkError(CollabError),

    /// Trajectory control has been stopped and won't process any more cycles.
    #[error("Trajectory control is stopped")]
    Stopped,
}
