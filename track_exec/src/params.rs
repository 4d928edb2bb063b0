//! # Tracking Executable Parameters
//!
//! This module provide parameters for the tracking executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use comms_if::net::NetParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TrackExecParams {

    /// Parameter file for trajectory control, relative to the parameters directory
    pub traj_ctrl_params: String,

    /// Waypoint file to follow, relative to the parameters directory
    pub waypoints_file: String,

    /// Name of the vehicle's model in the simulation
    pub model_name: String,

    /// Distance within which a waypoint is considered reached
    ///
    /// Units: meters
    pub reach_radius_m: f64,

    /// Number of times a failed state query is retried within one cycle
    pub query_retries: usize,

    /// Number of consecutive cycles without a state sample after which the exec gives up
    pub max_consec_state_failures: u64,

    /// Network endpoints
    pub net: NetParams,
}
