//! # Communications interface crate.
//!
//! Provides the wire types exchanged with the vehicle simulation and the
//! network abstraction used to carry them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command and state definitions for equipment (the simulated vehicle)
pub mod eqpt;

/// Network module
pub mod net;
