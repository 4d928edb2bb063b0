//! # Path
//!
//! This module defines the waypoints followed by the vehicle and the tracker which keeps the list
//! of those still to be reached.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use crate::loc::VehicleState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single point on the path in the world frame, in meters.
pub type Waypoint = Vector2<f64>;

/// A waypoint file, as loaded from the parameters directory.
///
/// Points are given as `[x, y]` pairs:
///
/// ```toml
/// points = [[5.0, 0.0], [10.0, 0.0]]
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaypointFile {
    pub points: Vec<Waypoint>,
}

/// Keeps track of which waypoints are yet to be reached.
#[derive(Clone, Debug)]
pub struct WaypointTracker {
    /// Unreached waypoints, in path order
    unreached: Vec<Waypoint>,

    /// Distance under which a waypoint is considered reached
    reach_radius_m: f64,

    /// Number of waypoints reached so far
    num_reached: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WaypointTracker {
    pub fn new(points: Vec<Waypoint>, reach_radius_m: f64) -> Self {
        Self {
            unreached: points,
            reach_radius_m: reach_radius_m.abs(),
            num_reached: 0,
        }
    }

    /// Drop waypoints from the front of the list which the vehicle has reached.
    ///
    /// Returns the number of waypoints reached on this update.
    pub fn update(&mut self, state: &VehicleState) -> usize {
        let num_before = self.unreached.len();

        let num_to_drop = self
            .unreached
            .iter()
            .take_while(|wp| (*wp - state.position_m).norm() < self.reach_radius_m)
            .count();
        self.unreached.drain(..num_to_drop);

        let num_reached = num_before - self.unreached.len();
        if num_reached > 0 {
            self.num_reached += num_reached;
            debug!(
                "Reached {} waypoint(s), {} remaining",
                num_reached,
                self.unreached.len()
            );
        }

        num_reached
    }

    /// The immediate target, the first unreached waypoint.
    pub fn target(&self) -> Option<Waypoint> {
        self.unreached.first().copied()
    }

    /// All waypoints still to be reached, in path order.
    pub fn unreached(&self) -> &[Waypoint] {
        &self.unreached
    }

    pub fn num_reached(&self) -> usize {
        self.num_reached
    }

    /// True once every waypoint has been reached.
    pub fn is_finished(&self) -> bool {
        self.unreached.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tracker() -> WaypointTracker {
        WaypointTracker::new(
            vec![
                Waypoint::new(1.0, 0.0),
                Waypoint::new(2.0, 0.0),
                Waypoint::new(3.0, 0.0),
            ],
            0.5,
        )
    }

    #[test]
    fn test_target_is_first_unreached() {
        let mut t = tracker();
        assert_eq!(t.target(), Some(Waypoint::new(1.0, 0.0)));

        assert_eq!(t.update(&VehicleState::new(0.0, 0.0, 0.0, 1.0)), 0);
        assert_eq!(t.unreached().len(), 3);

        assert_eq!(t.update(&VehicleState::new(0.9, 0.1, 0.0, 1.0)), 1);
        assert_eq!(t.target(), Some(Waypoint::new(2.0, 0.0)));
        assert_eq!(t.num_reached(), 1);
    }

    #[test]
    fn test_only_front_waypoints_are_dropped() {
        // Being close to a later waypoint doesn't skip the earlier ones
        let mut t = tracker();
        assert_eq!(t.update(&VehicleState::new(3.0, 0.0, 0.0, 1.0)), 0);
        assert_eq!(t.unreached().len(), 3);
    }

    #[test]
    fn test_finished() {
        let mut t = WaypointTracker::new(
            vec![Waypoint::new(1.0, 0.0), Waypoint::new(1.2, 0.0)],
            0.5,
        );
        assert!(!t.is_finished());

        assert_eq!(t.update(&VehicleState::new(1.1, 0.0, 0.0, 0.0)), 2);
        assert!(t.is_finished());
        assert_eq!(t.target(), None);
    }

    #[test]
    fn test_waypoint_file() {
        let wf: WaypointFile = util::params::from_str("points = [[5.0, 0.0], [10.0, -2.5]]")
            .unwrap();

        assert_eq!(wf.points, vec![Waypoint::new(5.0, 0.0), Waypoint::new(10.0, -2.5)]);
    }
}
