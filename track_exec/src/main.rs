//! Main path tracking executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging, parameters and the network clients
//!     - Main loop:
//!         - Query the vehicle's state from the simulation
//!         - Update the waypoint tracker, exiting once every waypoint is reached
//!         - Trajectory control processing, which sends the drive command
//!     - Stop the vehicle and archive the diagnostics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::net::zmq;
use track_lib::{
    drive_client::DriveClient,
    loc::VehicleState,
    params::TrackExecParams,
    path::{WaypointFile, WaypointTracker},
    sim_client::SimClient,
    traj_ctrl::{InitData, InputData, StateSource, TrajCtrl, TrajCtrlError},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follow a sequence of waypoints with a pure pursuit controller.
#[derive(Debug, StructOpt)]
#[structopt(name = "track_exec")]
struct Args {
    /// Executable parameter file, relative to the parameters directory
    #[structopt(long, default_value = "track_exec.toml")]
    params: String,

    /// Waypoint file to follow instead of the one named in the parameters
    #[structopt(long)]
    waypoints: Option<String>,

    /// Minimum level of log messages to output
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new(
        "track_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    logger_init(args.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Path Tracking Executable\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().wrap_err("Failed to find the software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let exec_params: TrackExecParams = util::params::load(&args.params)
        .wrap_err("Could not load exec params")?;

    let waypoints_file = args.waypoints
        .as_ref()
        .unwrap_or(&exec_params.waypoints_file);

    let waypoints: WaypointFile = util::params::load(waypoints_file)
        .wrap_err_with(|| format!("Could not load the waypoints from {}", waypoints_file))?;

    info!("Loaded {} waypoints from {}", waypoints.points.len(), waypoints_file);

    let mut tracker = WaypointTracker::new(waypoints.points, exec_params.reach_radius_m);

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let mut sim_client = {
        let c = SimClient::new(
            &zmq_ctx,
            &exec_params.net,
            &exec_params.model_name,
            exec_params.query_retries
        ).wrap_err("Failed to initialise SimClient")?;
        info!("SimClient initialised");
        c
    };

    let drive_client = {
        let c = DriveClient::new(&zmq_ctx, &exec_params.net)
            .wrap_err("Failed to initialise DriveClient")?;
        info!("DriveClient initialised");
        c
    };

    info!("Network initialisation complete");

    // ---- INITIALISE MODULES ----

    let mut traj_ctrl = TrajCtrl::init(
        InitData {
            params_path: exec_params.traj_ctrl_params.clone(),
            sink: drive_client,
        },
        &session
    ).wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    let cycle_period = Duration::from_secs_f64(1.0 / traj_ctrl.params().cycle_rate_hz);

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut num_cycles: u64 = 0;
    let mut num_consec_state_failures: u64 = 0;

    loop {
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        match sim_client.get_state() {
            Ok(model_state) => {
                num_consec_state_failures = 0;

                // ---- PATH TRACKING ----

                let state = VehicleState::from_model_state(&model_state);
                let num_reached = tracker.update(&state);

                if num_reached > 0 {
                    info!(
                        "Reached {} waypoint(s), {} remaining",
                        num_reached,
                        tracker.unreached().len()
                    );
                }

                let target = match tracker.target() {
                    Some(t) => t,
                    None => {
                        info!("All {} waypoints reached", tracker.num_reached());
                        break
                    }
                };

                // ---- CONTROL ALGORITHM PROCESSING ----

                let input = InputData {
                    model_state,
                    target,
                    waypoints: tracker.unreached().to_vec(),
                };

                match traj_ctrl.proc(&input) {
                    Ok(_) => (),
                    Err(TrajCtrlError::NonFiniteCommand(c)) => warn!(
                        "TrajCtrl calculated a non-finite command ({:?}), vehicle stopped", c
                    ),
                    Err(TrajCtrlError::SinkError(e)) => warn!(
                        "Could not send the drive command: {}", e
                    ),
                    Err(e) => {
                        error!("Error during TrajCtrl processing: {}", e);
                        break
                    }
                }
            },
            Err(e) => {
                // The error has already been logged by TrajCtrl
                traj_ctrl.on_state_source_failure(e);
                num_consec_state_failures += 1;

                if num_consec_state_failures > exec_params.max_consec_state_failures {
                    error!(
                        "Maximum number of consecutive state failures ({}) exceeded",
                        exec_params.max_consec_state_failures
                    );
                    break
                }
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            )
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    if let Err(e) = traj_ctrl.stop() {
        warn!("Could not send the stop command: {}", e);
    }

    if traj_ctrl.params().log_accel {
        traj_ctrl.archive_diagnostics(&session)
            .wrap_err("Could not archive the acceleration diagnostics")?;
        info!("Archived {} acceleration records", traj_ctrl.diagnostics().len());
    }

    info!(
        "End of execution after {} cycles, {} drive commands sent",
        num_cycles,
        traj_ctrl.sink().num_sent()
    );

    // Close the sockets before the session's save thread is joined
    drop(traj_ctrl);
    drop(sim_client);

    session.exit();

    Ok(())
}
