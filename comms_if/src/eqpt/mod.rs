//! # Equipment Interface
//!
//! This module defines the interface structures which are sent to and recieved from the vehicle
//! simulation.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive (actuation) commands
pub mod drive;

/// Simulation model state queries
pub mod sim;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use drive::AckermannDrive;
pub use sim::{ModelState, ModelStateRequest, ModelStateResponse};
