//! # Kinematic simulation
//!
//! A minimal double-steer bicycle integrator standing in for the real robot.
//! It implements all four IO seams, so the driver can be closed-loop tested
//! (and demonstrated) without hardware: published commands move the
//! simulated robot, whose pose feeds back through localisation and the frame
//! transforms.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use crate::io::{CommandSink, FrameTransformer, PoseSource, Visualizer};
use comms_if::{MotionCmd, PoseSe2};
use util::maths::normalize_angle;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated robot state.
pub struct MotionSim {
    /// Current pose in the map frame
    pose: PoseSe2,

    /// The last published command, held until replaced
    cmd: MotionCmd,

    /// Wheelbase of the simulated robot (meters)
    wheelbase_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotionSim {
    pub fn new(start_pose: PoseSe2, wheelbase_m: f64) -> Self {
        Self {
            pose: start_pose,
            cmd: MotionCmd::default(),
            wheelbase_m,
        }
    }

    pub fn pose(&self) -> &PoseSe2 {
        &self.pose
    }

    pub fn last_cmd(&self) -> &MotionCmd {
        &self.cmd
    }

    /// Advance the simulation by `dt_s` seconds under the held command.
    pub fn step(&mut self, dt_s: f64) {
        let v = self.cmd.v_ms;
        let delta_f = self.cmd.steer_front_rad;
        let delta_r = self.cmd.steer_back_rad;

        let beta = (0.5 * (delta_f.tan() + delta_r.tan())).atan();
        let ds = v * dt_s;
        let heading = self.pose.heading_rad;

        self.pose.position_m += Vector2::new((heading + beta).cos(), (heading + beta).sin()) * ds;
        self.pose.heading_rad = normalize_angle(
            heading + ds * beta.cos() * (delta_f.tan() - delta_r.tan()) / self.wheelbase_m,
        );
    }
}

impl PoseSource for MotionSim {
    fn world_pose(&self) -> Option<PoseSe2> {
        Some(self.pose)
    }
}

impl FrameTransformer for MotionSim {
    fn to_local(&self, pose_map: &PoseSe2) -> Option<PoseSe2> {
        Some(pose_map.in_frame_of(&self.pose))
    }

    fn to_global(&self, pose_local: &PoseSe2) -> Option<PoseSe2> {
        Some(pose_local.from_frame_of(&self.pose))
    }
}

impl CommandSink for MotionSim {
    fn publish(&mut self, cmd: &MotionCmd) {
        self.cmd = *cmd;
    }
}

impl Visualizer for MotionSim {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_straight_drive() {
        let mut sim = MotionSim::new(PoseSe2::new(0.0, 0.0, 0.0), 0.38);
        sim.publish(&MotionCmd {
            v_ms: 1.0,
            ..Default::default()
        });

        for _ in 0..100 {
            sim.step(0.01);
        }

        assert!((sim.pose().position_m.x - 1.0).abs() < 1e-9);
        assert!(sim.pose().position_m.y.abs() < 1e-9);
    }

    #[test]
    fn test_front_steer_turns_left() {
        let mut sim = MotionSim::new(PoseSe2::new(0.0, 0.0, 0.0), 0.38);
        sim.publish(&MotionCmd {
            v_ms: 0.5,
            steer_front_rad: 0.2,
            steer_back_rad: 0.0,
        });

        for _ in 0..100 {
            sim.step(0.01);
        }

        assert!(sim.pose().heading_rad > 0.0);
        assert!(sim.pose().position_m.y > 0.0);
    }
}
