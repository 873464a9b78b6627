//! # Motion goal, command and status definitions

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::pose::PoseSe2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A goal requesting that the robot follow a geometric path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionGoal {
    /// The path to follow, as an ordered sequence of poses in the map frame.
    ///
    /// Poses are oriented along the direction of travel, so a reversal shows
    /// up as a sharp change of tangent between neighbouring poses.
    pub path: Vec<PoseSe2>,

    /// The maximum speed to drive the path at in meters/second. Always
    /// positive, reversals are expressed by the path itself.
    pub v_ms: f64,
}

/// The actuator setpoint produced by the motion executive.
///
/// This is a latched value: it remains the robot's actuation until the next
/// command is published.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct MotionCmd {
    /// The longitudinal speed demand in meters/second.
    ///
    /// Positive speeds are "forwards", negative speeds are "backwards".
    pub v_ms: f64,

    /// The front axle steer angle demand in radians.
    ///
    /// Follows the right hand rule about the robot's Z+ (upwards) axis, so
    /// that positive angles steer to the left.
    pub steer_front_rad: f64,

    /// The rear axle steer angle demand in radians.
    ///
    /// Present for actuation compatibility, the path-following controller
    /// always demands zero here.
    pub steer_back_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Status of the motion executive, reported on every control cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionStatus {
    /// The robot is driving the current goal.
    Moving,

    /// The goal has been completed.
    Success,

    /// Localisation could not supply a pose.
    SlamFail,

    /// An internal error occured: an invalid goal, or a frame transform
    /// failure.
    InternalError,
}

/// The kind of motion a driver implements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// Follow a geometric path, reversing at its cusps.
    FollowPath,
}
