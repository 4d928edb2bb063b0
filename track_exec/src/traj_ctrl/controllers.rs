//! # Trajectory controllers module
//!
//! This module provides the longitudinal (speed) and lateral (pure pursuit steering) controllers
//! used by TrajCtrl, including their error calculations.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use super::{AngleConvention, LookaheadSource, Params, StatusReport, TrajCtrlError};
use crate::{loc::VehicleState, path::Waypoint};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lookahead distances below this are treated as zero.
///
/// Units: meters
pub const MIN_LOOKAHEAD_DIST_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The trajectory controllers
#[derive(Debug, Clone)]
pub struct TrajControllers {
    wheelbase_m: f64,

    cruise_speed_ms: f64,

    corner_speed_ms: f64,

    head_err_threshold_rad: f64,

    angle_convention: AngleConvention,

    lookahead_source: LookaheadSource,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajControllers {

    /// Create a new instance of the controllers from the parameters
    pub fn new(params: &Params) -> Self {
        Self {
            wheelbase_m: params.wheelbase_m,
            cruise_speed_ms: params.cruise_speed_ms,
            corner_speed_ms: params.corner_speed_ms,
            head_err_threshold_rad: params.head_err_threshold_rad,
            angle_convention: params.angle_convention,
            lookahead_source: params.lookahead_source,
        }
    }

    /// Get the speed demand for the current state and unreached waypoints.
    ///
    /// The cruise speed is demanded unless the heading error to the lookahead point is larger
    /// than the threshold, in which case the cornering speed is demanded.
    pub fn calc_speed(
        &self,
        state: &VehicleState,
        waypoints: &[Waypoint],
        report: &mut StatusReport
    ) -> Result<f64, TrajCtrlError> {

        let reference = select_lookahead(waypoints)?;
        let head_err_rad = self.calc_head_error(state, &reference);

        report.ref_x_m = reference[0];
        report.ref_y_m = reference[1];
        report.head_error_rad = head_err_rad;

        let speed_dem_ms = if head_err_rad.abs() > self.head_err_threshold_rad {
            report.speed_reduced = true;
            self.corner_speed_ms
        }
        else {
            self.cruise_speed_ms
        };

        debug!(
            "Speed: ref ({:.3}, {:.3}), head err {:.4} rad, dem {} m/s",
            reference[0], reference[1], head_err_rad, speed_dem_ms
        );

        Ok(speed_dem_ms)
    }

    /// Get the pure pursuit steering demand.
    ///
    /// `target` is only used if the lookahead source is `LookaheadSource::Target`, otherwise the
    /// lookahead point is selected from `waypoints` in the same way as for the speed demand.
    pub fn calc_steering(
        &self,
        state: &VehicleState,
        target: &Waypoint,
        waypoints: &[Waypoint],
        report: &mut StatusReport
    ) -> Result<f64, TrajCtrlError> {

        let lookahead = select_lookahead(waypoints)?;
        let lookahead = match self.lookahead_source {
            LookaheadSource::Waypoints => lookahead,
            LookaheadSource::Target => *target,
        };

        let lookahead_dist_m = (lookahead - state.position_m).norm();

        report.lookahead_x_m = lookahead[0];
        report.lookahead_y_m = lookahead[1];
        report.lookahead_dist_m = lookahead_dist_m;

        if lookahead_dist_m < MIN_LOOKAHEAD_DIST_M {
            return Err(TrajCtrlError::DegenerateGeometry(lookahead_dist_m))
        }

        let alpha_rad = self.calc_head_error(state, &lookahead);
        report.alpha_rad = alpha_rad;

        let steer_dem_rad = 
            (2.0 * self.wheelbase_m * alpha_rad.sin() / lookahead_dist_m).atan();

        debug!(
            "Steering: lookahead ({:.3}, {:.3}), ld {:.3} m, alpha {:.4} rad, dem {:.4} rad",
            lookahead[0], lookahead[1], lookahead_dist_m, alpha_rad, steer_dem_rad
        );

        Ok(steer_dem_rad)
    }

    /// Calculate the heading error to the given point.
    ///
    /// The heading error is the bearing to the point minus the vehicle's yaw, so it is +ve if the
    /// point is to the left of the vehicle (right hand rule about Z).
    fn calc_head_error(&self, state: &VehicleState, point: &Waypoint) -> f64 {
        let diff = point - state.position_m;
        let bearing_rad = diff[1].atan2(diff[0]);

        self.angle_convention.apply(bearing_rad - state.yaw_rad)
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Select the lookahead point from the unreached waypoints.
///
/// This is the second waypoint if at least two remain, otherwise the last (and only) one.
pub fn select_lookahead(waypoints: &[Waypoint]) -> Result<Waypoint, TrajCtrlError> {
    waypoints
        .get(1)
        .or_else(|| waypoints.last())
        .copied()
        .ok_or(TrajCtrlError::NoWaypoints)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-12;

    fn wps(points: &[(f64, f64)]) -> Vec<Waypoint> {
        points.iter().map(|p| Waypoint::new(p.0, p.1)).collect()
    }

    fn ctrls(convention: AngleConvention) -> TrajControllers {
        TrajControllers::new(&Params {
            angle_convention: convention,
            ..Default::default()
        })
    }

    #[test]
    fn test_select_lookahead() {
        assert_eq!(
            select_lookahead(&wps(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)])).unwrap(),
            Waypoint::new(2.0, 0.0)
        );
        assert_eq!(
            select_lookahead(&wps(&[(4.0, 1.0)])).unwrap(),
            Waypoint::new(4.0, 1.0)
        );
        assert!(matches!(select_lookahead(&[]), Err(TrajCtrlError::NoWaypoints)));
    }

    #[test]
    fn test_speed_aligned() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();

        let state = VehicleState::new(0.0, 0.0, 0.0, 5.0);
        let speed = c.calc_speed(&state, &wps(&[(5.0, 0.0), (10.0, 0.0)]), &mut report).unwrap();

        assert_eq!(speed, 16.0);
        assert_eq!(report.head_error_rad, 0.0);
        assert!(!report.speed_reduced);
    }

    #[test]
    fn test_speed_reduced_in_turn() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();

        // Heading 20 degrees off the bearing to the reference
        let state = VehicleState::new(0.0, 0.0, 20f64.to_radians(), 5.0);
        let speed = c.calc_speed(&state, &wps(&[(1.0, 0.0), (2.0, 0.0)]), &mut report).unwrap();

        assert_eq!(speed, 8.0);
        assert!((report.head_error_rad + 20f64.to_radians()).abs() < TOL);
        assert!(report.speed_reduced);

        // Inside the threshold
        let state = VehicleState::new(0.0, 0.0, 5f64.to_radians(), 5.0);
        let speed = c.calc_speed(&state, &wps(&[(1.0, 0.0), (2.0, 0.0)]), &mut report).unwrap();
        assert_eq!(speed, 16.0);
    }

    #[test]
    fn test_speed_uses_second_waypoint() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();

        // Pointing straight at (2, 0). Using (1, 0) or (3, 0) would give a 45 degree error.
        let state = VehicleState::new(2.0, -1.0, PI / 2.0, 5.0);
        let speed = c.calc_speed(
            &state,
            &wps(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]),
            &mut report
        ).unwrap();

        assert_eq!(speed, 16.0);
        assert_eq!((report.ref_x_m, report.ref_y_m), (2.0, 0.0));
    }

    #[test]
    fn test_no_waypoints() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();
        let state = VehicleState::new(0.0, 0.0, 0.0, 5.0);

        assert!(matches!(
            c.calc_speed(&state, &[], &mut report),
            Err(TrajCtrlError::NoWaypoints)
        ));
        assert!(matches!(
            c.calc_steering(&state, &Waypoint::new(1.0, 0.0), &[], &mut report),
            Err(TrajCtrlError::NoWaypoints)
        ));
    }

    #[test]
    fn test_steering_degenerate() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();

        let state = VehicleState::new(10.0, 0.0, 0.3, 5.0);
        let res = c.calc_steering(
            &state,
            &Waypoint::new(5.0, 0.0),
            &wps(&[(5.0, 0.0), (10.0, 0.0)]),
            &mut report
        );

        match res {
            Err(TrajCtrlError::DegenerateGeometry(ld)) => assert_eq!(ld, 0.0),
            r => panic!("Expected DegenerateGeometry, got {:?}", r)
        }
    }

    #[test]
    fn test_steering_straight_ahead() {
        let mut report = StatusReport::default();
        let state = VehicleState::new(0.0, 0.0, 0.0, 5.0);

        for &wheelbase_m in [0.5, 1.75, 4.0].iter() {
            let c = TrajControllers::new(&Params { wheelbase_m, ..Default::default() });

            for &dist in [0.1, 3.0, 50.0].iter() {
                let steer = c.calc_steering(
                    &state,
                    &Waypoint::new(dist, 0.0),
                    &wps(&[(dist, 0.0)]),
                    &mut report
                ).unwrap();

                assert_eq!(steer, 0.0);
            }
        }
    }

    #[test]
    fn test_steering_value() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();
        let state = VehicleState::new(0.0, 0.0, 0.0, 5.0);

        // ld = sqrt(2), alpha = pi/4, so 2 L sin(alpha) / ld = L
        let steer = c.calc_steering(
            &state,
            &Waypoint::new(0.5, 0.0),
            &wps(&[(0.5, 0.0), (1.0, 1.0)]),
            &mut report
        ).unwrap();

        assert!((steer - 1.75f64.atan()).abs() < TOL);
        assert!((report.alpha_rad - PI / 4.0).abs() < TOL);
        assert!((report.lookahead_dist_m - 2f64.sqrt()).abs() < TOL);
        assert!(steer > 0.0, "a point to the left must give a left (positive) steer");
    }

    #[test]
    fn test_steering_mirror() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();

        for &yaw in [0.0, 0.6, -2.0, 3.0].iter() {
            let state = VehicleState::new(1.0, -2.0, yaw, 5.0);

            // Build the lookahead point in the vehicle frame and mirror its lateral offset
            let (fwd, lat) = (6.0, 2.5);
            let to_world = |lat: f64| Waypoint::new(
                1.0 + fwd * yaw.cos() - lat * yaw.sin(),
                -2.0 + fwd * yaw.sin() + lat * yaw.cos()
            );

            let left = to_world(lat);
            let right = to_world(-lat);

            let steer_left = c.calc_steering(&state, &left, &[left], &mut report).unwrap();
            let steer_right = c.calc_steering(&state, &right, &[right], &mut report).unwrap();

            assert!(steer_left > 0.0);
            assert!((steer_left + steer_right).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ignores_target_by_default() {
        let c = ctrls(AngleConvention::Wrapped);
        let mut report = StatusReport::default();
        let state = VehicleState::new(0.0, 0.0, 0.0, 5.0);

        // The target is well off to the side but the lookahead is straight ahead
        let steer = c.calc_steering(
            &state,
            &Waypoint::new(0.0, 5.0),
            &wps(&[(5.0, 0.0), (10.0, 0.0)]),
            &mut report
        ).unwrap();

        assert_eq!(steer, 0.0);
        assert_eq!(report.lookahead_x_m, 10.0);
    }

    #[test]
    fn test_target_lookahead_source() {
        let c = TrajControllers::new(&Params {
            lookahead_source: LookaheadSource::Target,
            ..Default::default()
        });
        let mut report = StatusReport::default();
        let state = VehicleState::new(0.0, 0.0, 0.0, 5.0);

        let steer = c.calc_steering(
            &state,
            &Waypoint::new(1.0, 1.0),
            &wps(&[(5.0, 0.0), (10.0, 0.0)]),
            &mut report
        ).unwrap();

        assert!((steer - 1.75f64.atan()).abs() < TOL);
        assert_eq!((report.lookahead_x_m, report.lookahead_y_m), (1.0, 1.0));
    }

    #[test]
    fn test_angle_conventions_at_boundary() {
        // Vehicle pointing at +179 degrees, reference at a bearing of -179 degrees. The real
        // heading error is only 2 degrees.
        let yaw = 179f64.to_radians();
        let state = VehicleState::new(0.0, 0.0, yaw, 5.0);
        let bearing = -179f64.to_radians();
        let reference = Waypoint::new(10.0 * bearing.cos(), 10.0 * bearing.sin());
        let waypoints = vec![reference];

        let mut wrapped_report = StatusReport::default();
        let wrapped = ctrls(AngleConvention::Wrapped);
        let speed = wrapped.calc_speed(&state, &waypoints, &mut wrapped_report).unwrap();
        assert_eq!(speed, 16.0);
        assert!((wrapped_report.head_error_rad - 2f64.to_radians()).abs() < 1e-9);

        let mut raw_report = StatusReport::default();
        let raw = ctrls(AngleConvention::Raw);
        let speed = raw.calc_speed(&state, &waypoints, &mut raw_report).unwrap();
        assert_eq!(speed, 8.0);
        assert!((raw_report.head_error_rad + 358f64.to_radians()).abs() < 1e-9);

        // The steering only sees sin(alpha) so both conventions agree
        let steer_wrapped = wrapped
            .calc_steering(&state, &reference, &waypoints, &mut wrapped_report)
            .unwrap();
        let steer_raw = raw
            .calc_steering(&state, &reference, &waypoints, &mut raw_report)
            .unwrap();
        assert!((steer_wrapped - steer_raw).abs() < 1e-9);
        assert!(steer_wrapped > 0.0);
    }
}
