//! Trajectory control initialised from the shipped parameters inside a session, checking the
//! archives it leaves behind.

use std::{fs, path::PathBuf};

use comms_if::eqpt::{AckermannDrive, ModelState};
use track_lib::{
    path::Waypoint,
    traj_ctrl::{CollabError, DriveSink, InitData, InputData, TrajCtrl},
};
use util::{host::SW_ROOT_ENV_VAR, maths::euler_to_quaternion, module::State, session::Session};

#[derive(Default)]
struct CountingSink(usize);

impl DriveSink for CountingSink {
    fn send_drive(&mut self, _cmd: &AckermannDrive) -> Result<(), CollabError> {
        self.0 += 1;
        Ok(())
    }
}

#[test]
fn test_init_and_archive() {
    std::env::set_var(SW_ROOT_ENV_VAR, concat!(env!("CARGO_MANIFEST_DIR"), "/.."));

    let sessions_dir: PathBuf = std::env::temp_dir()
        .join(format!("track_exec_session_test_{}", std::process::id()));
    let session = Session::new_in("track_test", &sessions_dir).unwrap();

    let mut traj_ctrl = TrajCtrl::init(
        InitData {
            params_path: "traj_ctrl.toml".into(),
            sink: CountingSink::default(),
        },
        &session
    ).unwrap();

    assert!(traj_ctrl.params().log_accel);

    let waypoints = vec![Waypoint::new(5.0, 0.0), Waypoint::new(10.0, 0.0)];

    for i in 0..10 {
        let input = InputData {
            model_state: ModelState::planar(
                0.1 * i as f64,
                0.0,
                euler_to_quaternion(0.0, 0.0, 0.0),
                0.5 * i as f64,
                0.0
            ),
            target: waypoints[0],
            waypoints: waypoints.clone(),
        };

        let (cmd, _) = traj_ctrl.proc(&input).unwrap();
        assert_eq!(cmd, AckermannDrive::new(16.0, 0.0));
    }

    traj_ctrl.stop().unwrap();
    assert_eq!(traj_ctrl.sink().0, 11);

    traj_ctrl.archive_diagnostics(&session).unwrap();

    let session_root = session.session_root.clone();
    let arch_root = session.arch_root.clone();
    session.exit();

    // Header plus one row per cycle
    let status = fs::read_to_string(arch_root.join("traj_ctrl/status_report.csv")).unwrap();
    assert_eq!(status.lines().count(), 11);
    assert!(status.starts_with("x_m,y_m,yaw_rad,speed_ms"));

    let accel = fs::read_to_string(arch_root.join("traj_ctrl/accel.csv")).unwrap();
    assert_eq!(accel.lines().next(), Some("time_s,accel_ms2"));
    assert_eq!(accel.lines().count(), 11);

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(session_root.join("traj_ctrl/accel.json")).unwrap()
    ).unwrap();
    assert_eq!(json["records"].as_array().map(|r| r.len()), Some(10));

    fs::remove_dir_all(&sessions_dir).ok();
}
