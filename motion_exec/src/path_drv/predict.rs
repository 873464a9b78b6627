//! # Pose prediction
//!
//! Forward-simulates the robot through the actuator dead time to obtain the
//! predicted front and rear axle positions. The behaviours steer one of
//! these points (the "carrot") rather than the current robot origin, which
//! compensates the latency between issuing a command and the actuators
//! reaching it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::MotionCmd;
use nalgebra::Vector2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Predicted axle positions, in the robot-local frame at tick start.
#[derive(Debug, Clone, Copy)]
pub struct PosePrediction {
    /// Predicted front axle position (meters)
    pub front_m: Vector2<f64>,

    /// Predicted rear axle position (meters)
    pub rear_m: Vector2<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PosePrediction {
    /// Select the controlled point: the front axle for forward driving, the
    /// rear axle for reversing.
    pub fn carrot(&self, dir_sign: f64) -> Vector2<f64> {
        if dir_sign >= 0.0 {
            self.front_m
        } else {
            self.rear_m
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Forward-simulate the double-steer bicycle model through the dead time.
///
/// `filtered_speed_ms` is the low-pass filtered issued speed; the model
/// drives the prediction at twice that value, an empirically tuned factor
/// carried in the gain set.
pub fn predict_pose(
    cmd: &MotionCmd,
    filtered_speed_ms: f64,
    wheelbase_m: f64,
    dead_time_s: f64,
) -> PosePrediction {
    let delta_f = cmd.steer_front_rad;
    let delta_r = cmd.steer_back_rad;
    let v = 2.0 * filtered_speed_ms;

    // Slip angle of the double-steer bicycle
    let beta = (0.5 * (delta_f.tan() + delta_r.tan())).atan();

    let ds = v * dead_time_s;
    let dtheta = ds * beta.cos() * (delta_f.tan() - delta_r.tan()) / wheelbase_m;
    let theta_n = dtheta;
    let xn = ds * (0.5 * dtheta + 0.5 * beta).cos();
    let yn = ds * (0.5 * dtheta + 0.5 * beta).sin();

    let half_l = 0.5 * wheelbase_m;

    PosePrediction {
        front_m: Vector2::new(xn + half_l * theta_n.cos(), yn + half_l * theta_n.sin()),
        rear_m: Vector2::new(xn - half_l * theta_n.cos(), yn - half_l * theta_n.sin()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const WHEELBASE_M: f64 = 0.38;

    #[test]
    fn test_stationary_prediction_is_the_axles() {
        let pred = predict_pose(&MotionCmd::default(), 0.0, WHEELBASE_M, 0.1);

        assert!((pred.front_m - Vector2::new(0.19, 0.0)).norm() < 1e-12);
        assert!((pred.rear_m - Vector2::new(-0.19, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_straight_line_advance() {
        let cmd = MotionCmd {
            v_ms: 1.0,
            ..Default::default()
        };

        // Filtered speed of 0.5 drives the model at 1 m/s over 0.1 s
        let pred = predict_pose(&cmd, 0.5, WHEELBASE_M, 0.1);

        assert!((pred.front_m.x - 0.29).abs() < 1e-12);
        assert!(pred.front_m.y.abs() < 1e-12);
        assert!((pred.rear_m.x + 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_left_steer_curves_left() {
        let cmd = MotionCmd {
            v_ms: 1.0,
            steer_front_rad: 0.3,
            steer_back_rad: 0.0,
        };

        let pred = predict_pose(&cmd, 0.5, WHEELBASE_M, 0.1);

        assert!(pred.front_m.y > 0.0);
    }

    #[test]
    fn test_carrot_selection() {
        let pred = predict_pose(&MotionCmd::default(), 0.0, WHEELBASE_M, 0.1);

        assert_eq!(pred.carrot(1.0), pred.front_m);
        assert_eq!(pred.carrot(0.0), pred.front_m);
        assert_eq!(pred.carrot(-1.0), pred.rear_m);
    }
}
