//! Path driver parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the path driver.
///
/// Every field has a default, so a partial parameter file is valid. The
/// maximum driving speed is not a parameter: it arrives with each goal.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Actuator dead time through which the pose is forward-simulated
    /// (seconds)
    #[serde(default = "default_dead_time_s")]
    pub dead_time_s: f64,

    /// Acceptance radius around waypoints that are not turning points
    /// (meters)
    #[serde(default = "default_wp_tolerance_m")]
    pub wp_tolerance_m: f64,

    /// Acceptance radius around the final pose (meters).
    ///
    /// Reserved: carried in configuration but not consulted, terminal
    /// acceptance is decided by the turning-point test.
    #[serde(default = "default_goal_tolerance_m")]
    pub goal_tolerance_m: f64,

    /// Wheelbase of the bicycle model (meters)
    #[serde(default = "default_wheelbase_m")]
    pub wheelbase_m: f64,

    /// Steer magnitudes above this halve the commanded speed (radians)
    #[serde(default = "default_steer_slow_threshold_rad")]
    pub steer_slow_threshold_rad: f64,

    /// Per-publish constant of the first-order filter over the issued speed,
    /// in `(0, 1]`. The filtered speed feeds the pose predictor.
    #[serde(default = "default_speed_filter_alpha")]
    pub speed_filter_alpha: f64,

    /// Steering regulator parameters
    #[serde(default)]
    pub pid: PidParams,
}

/// Parameters of the discrete steering regulator.
#[derive(Debug, Clone, Deserialize)]
pub struct PidParams {
    /// Minimum sample period (seconds). Ticks arriving faster than this
    /// produce no update.
    #[serde(default = "default_ta_s")]
    pub ta_s: f64,

    /// Proportional gain
    #[serde(default = "default_kp")]
    pub kp: f64,

    /// Integral gain
    #[serde(default = "default_ki")]
    pub ki: f64,

    /// Integrator saturation magnitude. Must not be negative.
    #[serde(default = "default_i_max")]
    pub i_max: f64,

    /// Output saturation (degrees). Reserved for reinstating output
    /// limiting.
    #[serde(default = "default_delta_max_deg")]
    pub delta_max_deg: f64,

    /// Reference error scale. Reserved.
    #[serde(default = "default_e_max")]
    pub e_max: f64,
}

// ------------------------------------------------------------------------------------------------
// DEFAULTS
// ------------------------------------------------------------------------------------------------

fn default_dead_time_s() -> f64 {
    0.10
}
fn default_wp_tolerance_m() -> f64 {
    0.20
}
fn default_goal_tolerance_m() -> f64 {
    0.15
}
fn default_wheelbase_m() -> f64 {
    0.38
}
fn default_steer_slow_threshold_rad() -> f64 {
    0.25
}
fn default_speed_filter_alpha() -> f64 {
    0.5
}

fn default_ta_s() -> f64 {
    0.03
}
fn default_kp() -> f64 {
    1.5
}
fn default_ki() -> f64 {
    0.001
}
fn default_i_max() -> f64 {
    0.0
}
fn default_delta_max_deg() -> f64 {
    30.0
}
fn default_e_max() -> f64 {
    0.10
}

impl Default for Params {
    fn default() -> Self {
        Self {
            dead_time_s: default_dead_time_s(),
            wp_tolerance_m: default_wp_tolerance_m(),
            goal_tolerance_m: default_goal_tolerance_m(),
            wheelbase_m: default_wheelbase_m(),
            steer_slow_threshold_rad: default_steer_slow_threshold_rad(),
            speed_filter_alpha: default_speed_filter_alpha(),
            pid: PidParams::default(),
        }
    }
}

impl Default for PidParams {
    fn default() -> Self {
        Self {
            ta_s: default_ta_s(),
            kp: default_kp(),
            ki: default_ki(),
            i_max: default_i_max(),
            delta_max_deg: default_delta_max_deg(),
            e_max: default_e_max(),
        }
    }
}
