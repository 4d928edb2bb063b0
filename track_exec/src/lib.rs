//! # Path tracking library.
//!
//! This library allows other crates in the workspace (and the benchmarks and integration tests)
//! to access items defined inside the tracking crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Localisation - extracts the planar vehicle state from a raw model state sample
pub mod loc;

/// Path - waypoints and the tracker which decides which of them are still unreached
pub mod path;

/// Trajectory control - pure pursuit steering and heading-aware speed control
pub mod traj_ctrl;

/// Simulation client - queries the simulation for the vehicle's model state
pub mod sim_client;

/// Drive client - publishes drive commands to the vehicle
pub mod drive_client;

/// Executable parameters
pub mod params;
