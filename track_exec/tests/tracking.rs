//! Closed loop path tracking tests, with the vehicle replaced by a simple kinematic bicycle.

use std::{cell::RefCell, rc::Rc};

use comms_if::eqpt::{AckermannDrive, ModelState};
use track_lib::{
    loc::VehicleState,
    path::{Waypoint, WaypointTracker},
    traj_ctrl::{
        CollabError, DriveSink, Params, StateSource, TrajCtrl, TrajCtrlError, TrajCtrlMode,
    },
};
use util::maths::euler_to_quaternion;

/// Kinematic bicycle model, acting as both the state source and the drive sink.
struct Bicycle {
    x_m: f64,
    y_m: f64,
    yaw_rad: f64,
    speed_ms: f64,
    wheelbase_m: f64,
    dt_s: f64,
    cmds: Vec<AckermannDrive>,
}

/// Shared handle so the model can be given to trajectory control as the sink and queried as the
/// source.
#[derive(Clone)]
struct Vehicle(Rc<RefCell<Bicycle>>);

impl Vehicle {
    fn new(wheelbase_m: f64, dt_s: f64) -> Self {
        Vehicle(Rc::new(RefCell::new(Bicycle {
            x_m: 0.0,
            y_m: 0.0,
            yaw_rad: 0.0,
            speed_ms: 0.0,
            wheelbase_m,
            dt_s,
            cmds: Vec::new(),
        })))
    }
}

impl DriveSink for Vehicle {
    fn send_drive(&mut self, cmd: &AckermannDrive) -> Result<(), CollabError> {
        let mut b = self.0.borrow_mut();

        // Speed is reached instantly, the steering moves the vehicle round an arc
        b.speed_ms = cmd.speed_ms;
        let yaw_rate = b.speed_ms * cmd.steering_angle_rad.tan() / b.wheelbase_m;
        b.x_m += b.speed_ms * b.yaw_rad.cos() * b.dt_s;
        b.y_m += b.speed_ms * b.yaw_rad.sin() * b.dt_s;
        b.yaw_rad += yaw_rate * b.dt_s;
        b.cmds.push(*cmd);

        Ok(())
    }
}

impl StateSource for Vehicle {
    fn get_state(&mut self) -> Result<ModelState, CollabError> {
        let b = self.0.borrow();

        Ok(ModelState::planar(
            b.x_m,
            b.y_m,
            euler_to_quaternion(0.0, 0.0, b.yaw_rad),
            b.speed_ms * b.yaw_rad.cos(),
            b.speed_ms * b.yaw_rad.sin()
        ))
    }
}

/// Source which never provides a sample.
struct DeadSource;

impl StateSource for DeadSource {
    fn get_state(&mut self) -> Result<ModelState, CollabError> {
        Err("model state query timed out".into())
    }
}

#[test]
fn test_end_to_end_straight() {
    let vehicle = Vehicle::new(1.75, 0.01);
    vehicle.0.borrow_mut().speed_ms = 5.0;

    let mut traj_ctrl = TrajCtrl::new(Params::default(), vehicle.clone());
    let mut source = vehicle.clone();

    let waypoints = vec![Waypoint::new(5.0, 0.0), Waypoint::new(10.0, 0.0)];

    let (cmd, report) = traj_ctrl.execute_from(&mut source, &waypoints[0], &waypoints).unwrap();

    assert_eq!(cmd, AckermannDrive::new(16.0, 0.0));
    assert_eq!(report.speed_ms, 5.0);
    assert_eq!(report.lookahead_dist_m, 10.0);
    assert!(!report.speed_reduced);

    traj_ctrl.stop().unwrap();
    assert_eq!(vehicle.0.borrow().cmds.last(), Some(&AckermannDrive::stop()));
    assert_eq!(traj_ctrl.mode(), TrajCtrlMode::Stopped);
}

#[test]
fn test_converges_onto_path() {
    let params = Params {
        cruise_speed_ms: 4.0,
        corner_speed_ms: 2.0,
        log_accel: true,
        ..Default::default()
    };
    let dt_s = 1.0 / params.cycle_rate_hz;
    let reach_radius_m = 2.5;

    // Start pointing well off the path so the first cycles are slowed down
    let vehicle = Vehicle::new(params.wheelbase_m, dt_s);
    vehicle.0.borrow_mut().yaw_rad = 0.5;

    let mut source = vehicle.clone();
    let mut traj_ctrl = TrajCtrl::new(params, vehicle.clone());

    let points: Vec<Waypoint> = (1..=20).map(|i| Waypoint::new(2.0 * i as f64, 0.0)).collect();
    let end = points[19];
    let mut tracker = WaypointTracker::new(points, reach_radius_m);

    let mut num_cycles = 0;
    let mut num_reduced = 0;

    while num_cycles < 5000 {
        let state = VehicleState::from_model_state(&source.get_state().unwrap());
        tracker.update(&state);

        let target = match tracker.target() {
            Some(t) => t,
            None => break,
        };

        let (cmd, report) = traj_ctrl
            .execute_from(&mut source, &target, tracker.unreached())
            .unwrap();

        assert!(cmd.is_finite());
        if report.speed_reduced {
            num_reduced += 1;
        }
        num_cycles += 1;
    }

    traj_ctrl.stop().unwrap();

    assert!(tracker.is_finished(), "Path not finished after {} cycles", num_cycles);
    assert_eq!(tracker.num_reached(), 20);
    assert!(num_reduced > 0);

    // One acceleration record per cycle
    assert_eq!(traj_ctrl.diagnostics().len(), num_cycles);

    let b = vehicle.0.borrow();
    assert_eq!(b.cmds.len(), num_cycles + 1);
    assert!(((b.x_m - end[0]).powi(2) + (b.y_m - end[1]).powi(2)).sqrt() < reach_radius_m);
    assert!(b.y_m.abs() < 0.5);
    assert!(b.yaw_rad.abs() < 0.1);
}

#[test]
fn test_state_source_failure_stops_vehicle() {
    let vehicle = Vehicle::new(1.75, 0.01);
    let mut traj_ctrl = TrajCtrl::new(Params::default(), vehicle.clone());

    let waypoints = vec![Waypoint::new(5.0, 0.0)];

    match traj_ctrl.execute_from(&mut DeadSource, &waypoints[0], &waypoints) {
        Err(TrajCtrlError::StateSourceFailure(e)) => {
            assert_eq!(e.to_string(), "model state query timed out")
        },
        r => panic!("Expected StateSourceFailure, got {:?}", r),
    }

    assert_eq!(vehicle.0.borrow().cmds, vec![AckermannDrive::stop()]);
    assert!(traj_ctrl.is_running());
}
