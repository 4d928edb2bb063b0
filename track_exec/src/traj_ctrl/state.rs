//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::{loc::VehicleState, path::Waypoint};
use comms_if::eqpt::{AckermannDrive, ModelState};
use util::{
    archive::Archiver,
    module::State,
    params,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory control, which runs the control cycle and sends the resulting commands to a
/// [`DriveSink`].
pub struct TrajCtrl<S: DriveSink> {
    params: Params,

    /// Executing mode
    mode: TrajCtrlMode,

    /// Controller objects used to calculate the speed and steering demands
    controllers: TrajControllers,

    /// Where the drive commands go
    sink: S,

    /// Vehicle speed on the previous logged cycle, used for the acceleration diagnostics
    prev_speed_ms: f64,

    /// The last steering demand sent, held when the geometry is degenerate
    last_steer_dem_rad: Option<f64>,

    accel_log: AccelLog,

    report: StatusReport,
    arch_report: Archiver,
}

/// Data needed to initialise TrajCtrl through the [`State`] interface.
pub struct InitData<S> {
    /// Path to the parameter file, relative to the parameters directory
    pub params_path: String,

    /// The sink that drive commands will be sent to
    pub sink: S,
}

/// Input data for one cycle of TrajCtrl.
#[derive(Debug, Clone)]
pub struct InputData {
    /// Raw state sample of the vehicle
    pub model_state: ModelState,

    /// The immediate target point
    pub target: Waypoint,

    /// All unreached waypoints in path order, must not be empty
    pub waypoints: Vec<Waypoint>,
}

/// The status report containing the intermediate quantities of a cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    pub x_m: f64,
    pub y_m: f64,
    pub yaw_rad: f64,
    pub speed_ms: f64,

    /// Reference point used for the speed demand
    pub ref_x_m: f64,
    pub ref_y_m: f64,

    /// The heading error to the reference point
    pub head_error_rad: f64,

    /// If true the heading error exceeded the threshold and the cornering speed was demanded
    pub speed_reduced: bool,

    /// Lookahead point used for the steering demand
    pub lookahead_x_m: f64,
    pub lookahead_y_m: f64,

    /// Distance to the lookahead point
    pub lookahead_dist_m: f64,

    /// Angle between the vehicle's heading and the lookahead point
    pub alpha_rad: f64,

    /// If true the lookahead distance was zero
    pub degenerate_geometry: bool,

    /// If true the steering demand of the previous cycle was reused
    pub steering_held: bool,

    pub speed_dem_ms: f64,
    pub steer_dem_rad: f64,

    /// Acceleration recorded this cycle, if logging is enabled
    pub accel_ms2: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of TrajCtrl.
///
/// `Stopped` is terminal, a new TrajCtrl must be created to drive again.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TrajCtrlMode {
    Running,
    Stopped
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S: DriveSink> State for TrajCtrl<S> {
    type InitData = InitData<S>;
    type InitError = TrajCtrlError;

    type InputData = InputData;
    type OutputData = AckermannDrive;
    type StatusReport = StatusReport;
    type ProcError = TrajCtrlError;

    /// Initialise the TrajCtrl module.
    ///
    /// Loads the parameters and opens the status report archive in the session.
    fn init(init_data: Self::InitData, session: &Session) -> Result<Self, Self::InitError> {
        let params: Params = params::load(&init_data.params_path)
            .map_err(TrajCtrlError::ParamLoadError)?;

        let mut traj_ctrl = Self::new(params, init_data.sink);

        traj_ctrl.arch_report = Archiver::from_path(session, "traj_ctrl/status_report.csv")
            .map_err(TrajCtrlError::ArchiveError)?;

        Ok(traj_ctrl)
    }

    /// Process one cycle, see [`TrajCtrl::execute_cycle`].
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.execute_cycle(&input_data.model_state, &input_data.target, &input_data.waypoints)
    }
}

impl<S: DriveSink> TrajCtrl<S> {
    /// Create a new, running, TrajCtrl.
    pub fn new(params: Params, sink: S) -> Self {
        let controllers = TrajControllers::new(&params);
        let accel_log = AccelLog::new(params.cycle_rate_hz, params.accel_log_capacity);

        Self {
            params,
            mode: TrajCtrlMode::Running,
            controllers,
            sink,
            prev_speed_ms: 0.0,
            last_steer_dem_rad: None,
            accel_log,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    /// Execute one control cycle.
    ///
    /// Processing involves:
    ///  1. Extracting the vehicle state from the sample
    ///  1. Recording the acceleration, if enabled
    ///  1. Calculating the speed and steering demands
    ///  1. Sending the command to the sink
    ///
    /// A cycle with no unreached waypoints is refused and nothing is sent. If the lookahead
    /// distance is zero the previous steering demand is held (or zero if there isn't one). If the
    /// command isn't finite the stop command is sent in its place.
    pub fn execute_cycle(
        &mut self,
        model_state: &ModelState,
        target: &Waypoint,
        waypoints: &[Waypoint]
    ) -> Result<(AckermannDrive, StatusReport), TrajCtrlError> {

        if self.mode == TrajCtrlMode::Stopped {
            return Err(TrajCtrlError::Stopped)
        }

        if waypoints.is_empty() {
            warn!("Refusing to run a cycle with no unreached waypoints");
            return Err(TrajCtrlError::NoWaypoints)
        }

        self.report = StatusReport::default();

        // ---- STATE EXTRACTION ----

        let state = VehicleState::from_model_state(model_state);

        self.report.x_m = state.x_m();
        self.report.y_m = state.y_m();
        self.report.yaw_rad = state.yaw_rad;
        self.report.speed_ms = state.speed_ms;

        trace!(
            "State: ({:.3}, {:.3}) m, yaw {:.4} rad, speed {:.3} m/s",
            state.x_m(), state.y_m(), state.yaw_rad, state.speed_ms
        );

        // ---- DIAGNOSTICS ----

        if self.params.log_accel {
            let accel_ms2 = (state.speed_ms - self.prev_speed_ms) * self.params.cycle_rate_hz;
            self.accel_log.push(accel_ms2);
            self.prev_speed_ms = state.speed_ms;
            self.report.accel_ms2 = Some(accel_ms2);
        }

        // ---- COMMAND GENERATION ----

        let speed_dem_ms = self.controllers.calc_speed(&state, waypoints, &mut self.report)?;

        let steer_dem_rad = match self.controllers
            .calc_steering(&state, target, waypoints, &mut self.report)
        {
            Ok(s) => s,
            Err(TrajCtrlError::DegenerateGeometry(ld)) => {
                let held = self.last_steer_dem_rad.unwrap_or(0.0);

                warn!(
                    "Lookahead distance is {} m, holding steering demand at {:.4} rad",
                    ld, held
                );

                self.report.degenerate_geometry = true;
                self.report.steering_held = self.last_steer_dem_rad.is_some();
                held
            },
            Err(e) => return Err(e)
        };

        let cmd = AckermannDrive::new(speed_dem_ms, steer_dem_rad);
        self.report.speed_dem_ms = cmd.speed_ms;
        self.report.steer_dem_rad = cmd.steering_angle_rad;

        if !cmd.is_finite() {
            warn!("Non-finite command {:?}, sending stop instead", cmd);

            let stop = AckermannDrive::stop();
            self.send(&stop)?;
            self.last_steer_dem_rad = Some(stop.steering_angle_rad);
            self.archive_report();

            return Err(TrajCtrlError::NonFiniteCommand(cmd))
        }

        self.send(&cmd)?;
        self.last_steer_dem_rad = Some(cmd.steering_angle_rad);
        self.archive_report();

        Ok((cmd, self.report))
    }

    /// Acquire a sample from the source and execute one control cycle with it.
    pub fn execute_from<Src: StateSource>(
        &mut self,
        source: &mut Src,
        target: &Waypoint,
        waypoints: &[Waypoint]
    ) -> Result<(AckermannDrive, StatusReport), TrajCtrlError> {

        if self.mode == TrajCtrlMode::Stopped {
            return Err(TrajCtrlError::Stopped)
        }

        let model_state = match source.get_state() {
            Ok(s) => s,
            Err(e) => return Err(self.on_state_source_failure(e))
        };

        self.execute_cycle(&model_state, target, waypoints)
    }

    /// Handle a cycle for which no state sample could be acquired.
    ///
    /// No command is calculated. If `stop_on_source_failure` is set the stop command is sent,
    /// but the mode stays `Running` so the next good sample is acted on.
    pub fn on_state_source_failure(&mut self, err: CollabError) -> TrajCtrlError {
        warn!("Could not acquire the vehicle state: {}", err);

        if self.mode == TrajCtrlMode::Running && self.params.stop_on_source_failure {
            if let Err(e) = self.send(&AckermannDrive::stop()) {
                warn!("Could not send the stop command: {}", e);
            }
        }

        TrajCtrlError::StateSourceFailure(err)
    }

    /// Stop the vehicle.
    ///
    /// Sends the zero speed, zero steering command and switches into the `Stopped` mode. The
    /// acceleration diagnostics are kept. This does not interrupt a cycle running elsewhere, the
    /// caller must stop its loop before calling this.
    pub fn stop(&mut self) -> Result<(), TrajCtrlError> {
        info!("Stopping trajectory control");

        self.mode = TrajCtrlMode::Stopped;
        self.send(&AckermannDrive::stop())
    }

    /// Clear the acceleration log and the previous speed.
    pub fn reset_diagnostics(&mut self) {
        info!("Resetting acceleration diagnostics ({} records dropped)", self.accel_log.len());

        self.accel_log.clear();
        self.prev_speed_ms = 0.0;
    }

    /// Write the acceleration log into the session, as a CSV archive and as JSON.
    pub fn archive_diagnostics(&self, session: &Session) -> Result<(), TrajCtrlError> {
        let mut arch = Archiver::from_path(session, "traj_ctrl/accel.csv")
            .map_err(TrajCtrlError::ArchiveError)?;

        for record in self.accel_log.records() {
            arch.serialise(record).map_err(TrajCtrlError::ArchiveError)?;
        }

        session.save("traj_ctrl/accel.json", self.accel_log.clone());

        Ok(())
    }

    pub fn diagnostics(&self) -> &AccelLog {
        &self.accel_log
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn mode(&self) -> TrajCtrlMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.mode == TrajCtrlMode::Running
    }

    /// The status report of the latest cycle.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn send(&mut self, cmd: &AckermannDrive) -> Result<(), TrajCtrlError> {
        trace!(
            "Sending drive command: {:.3} m/s, {:.4} rad",
            cmd.speed_ms, cmd.steering_angle_rad
        );

        self.sink.send_drive(cmd).map_err(TrajCtrlError::SinkError)
    }

    fn archive_report(&mut self) {
        if let Err(e) = self.arch_report.serialise(&self.report) {
            warn!("Could not archive the status report: {}", e);
        }
    }
}
