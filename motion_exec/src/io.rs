//! # External interface seams
//!
//! The executive reaches its collaborators through the object-safe traits
//! defined here. All calls are synchronous and expected to return promptly;
//! a collaborator that cannot answer returns `None` and the driver maps that
//! to the appropriate terminal status.
//!
//! [`MotionIo`] bundles the four seams so a single object (the simulation, a
//! test mock, the real robot glue) can be handed to
//! [`PathDrv::execute`](crate::path_drv::PathDrv::execute).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{MotionCmd, PoseSe2};
use nalgebra::Vector2;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Source of the robot's localisation estimate.
pub trait PoseSource {
    /// Get the current pose of the robot in the map frame, or `None` if
    /// localisation cannot supply one right now.
    ///
    /// Must be side-effect free and cheap, it is called once per control
    /// tick.
    fn world_pose(&self) -> Option<PoseSe2>;
}

/// Transforms between the map frame and the robot-local frame.
pub trait FrameTransformer {
    /// Express a map-frame pose in the robot-local frame, or `None` if the
    /// transform is unavailable.
    fn to_local(&self, pose_map: &PoseSe2) -> Option<PoseSe2>;

    /// Express a robot-local pose in the map frame, or `None` if the
    /// transform is unavailable.
    fn to_global(&self, pose_local: &PoseSe2) -> Option<PoseSe2>;
}

/// Sink for the actuator command produced each tick. Fire and forget.
pub trait CommandSink {
    fn publish(&mut self, cmd: &MotionCmd);
}

/// Sink for debug markers.
///
/// Both methods default to no-ops, so an implementor with nowhere to draw
/// simply leaves them out.
pub trait Visualizer {
    /// Draw an arrow marker at the given map-frame pose.
    fn draw_arrow(&mut self, _id: i32, _pose: &PoseSe2, _ns: &str, _colour: (f32, f32, f32)) {}

    /// Draw a point marker at the given map-frame position.
    fn draw_mark(
        &mut self,
        _id: i32,
        _position_m: &Vector2<f64>,
        _ns: &str,
        _colour: (f32, f32, f32),
    ) {
    }
}

/// Everything the driver needs from the outside world during one tick.
pub trait MotionIo: PoseSource + FrameTransformer + CommandSink + Visualizer {}

impl<T: PoseSource + FrameTransformer + CommandSink + Visualizer> MotionIo for T {}
