//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use util::maths::wrap_to_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {

    /// Distance between the front and rear axles
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    /// Speed demanded while the heading error is within the threshold
    ///
    /// Units: meters/second
    pub cruise_speed_ms: f64,

    /// Speed demanded while the heading error exceeds the threshold
    ///
    /// Units: meters/second
    pub corner_speed_ms: f64,

    /// Heading error above which the cornering speed is used
    ///
    /// Units: radians
    pub head_err_threshold_rad: f64,

    /// Rate at which control cycles are executed, used to scale the
    /// acceleration diagnostics and to set the executable's cycle period.
    ///
    /// Units: hertz
    pub cycle_rate_hz: f64,

    /// If true the acceleration of the vehicle is logged each cycle
    #[serde(default)]
    pub log_accel: bool,

    /// Maximum number of acceleration records kept. Once full the oldest
    /// records are dropped. If not set the log grows without limit, which is
    /// only suitable for short sessions.
    #[serde(default)]
    pub accel_log_capacity: Option<usize>,

    /// How heading errors are formed
    #[serde(default)]
    pub angle_convention: AngleConvention,

    /// Which point the lateral controller steers towards
    #[serde(default)]
    pub lookahead_source: LookaheadSource,

    /// If true a stop command is sent on any cycle where the vehicle state
    /// could not be acquired.
    #[serde(default = "default_true")]
    pub stop_on_source_failure: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the difference between a bearing and the vehicle's yaw is formed.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum AngleConvention {
    /// The plain difference, which can be up to 2pi in magnitude when the
    /// bearing and yaw straddle the +/-pi boundary.
    Raw,

    /// The difference wrapped into (-pi, pi].
    Wrapped,
}

/// The point the lateral controller steers towards.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum LookaheadSource {
    /// The lookahead point selected from the unreached waypoints, the same
    /// point used by the longitudinal controller. The target point given by
    /// the caller is ignored.
    Waypoints,

    /// The target point given by the caller.
    Target,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            wheelbase_m: 1.75,
            cruise_speed_ms: 16.0,
            corner_speed_ms: 8.0,
            head_err_threshold_rad: 10f64.to_radians(),
            cycle_rate_hz: 100.0,
            log_accel: false,
            accel_log_capacity: None,
            angle_convention: AngleConvention::default(),
            lookahead_source: LookaheadSource::default(),
            stop_on_source_failure: true,
        }
    }
}

impl AngleConvention {
    /// Apply the convention to the difference between two angles.
    pub fn apply(&self, diff_rad: f64) -> f64 {
        match self {
            AngleConvention::Raw => diff_rad,
            AngleConvention::Wrapped => wrap_to_pi(diff_rad),
        }
    }
}

impl Default for AngleConvention {
    fn default() -> Self {
        AngleConvention::Wrapped
    }
}

impl Default for LookaheadSource {
    fn default() -> Self {
        LookaheadSource::Waypoints
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_minimal_params_file() {
        let params: Params = util::params::from_str(
            r#"
            wheelbase_m = 1.75
            cruise_speed_ms = 16.0
            corner_speed_ms = 8.0
            head_err_threshold_rad = 0.17453292519943295
            cycle_rate_hz = 100.0
            "#
        ).unwrap();

        assert!(!params.log_accel);
        assert_eq!(params.accel_log_capacity, None);
        assert_eq!(params.angle_convention, AngleConvention::Wrapped);
        assert_eq!(params.lookahead_source, LookaheadSource::Waypoints);
        assert!(params.stop_on_source_failure);
    }

    #[test]
    fn test_enum_params() {
        let params: Params = util::params::from_str(
            r#"
            wheelbase_m = 2.0
            cruise_speed_ms = 10.0
            corner_speed_ms = 5.0
            head_err_threshold_rad = 0.2
            cycle_rate_hz = 50.0
            log_accel = true
            accel_log_capacity = 1000
            angle_convention = "Raw"
            lookahead_source = "Target"
            stop_on_source_failure = false
            "#
        ).unwrap();

        assert!(params.log_accel);
        assert_eq!(params.accel_log_capacity, Some(1000));
        assert_eq!(params.angle_convention, AngleConvention::Raw);
        assert_eq!(params.lookahead_source, LookaheadSource::Target);
        assert!(!params.stop_on_source_failure);
    }

    #[test]
    fn test_angle_convention() {
        let diff = 350f64.to_radians();
        assert_eq!(AngleConvention::Raw.apply(diff), diff);
        assert!((AngleConvention::Wrapped.apply(diff) + 10f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_shipped_params_file() {
        let params: Params = util::params::load_abs(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/traj_ctrl.toml")
        ).unwrap();

        assert_eq!(params.wheelbase_m, 1.75);
        assert!((params.head_err_threshold_rad - 10f64.to_radians()).abs() < 1e-12);
    }
}
