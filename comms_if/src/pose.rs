//! # Planar pose
//!
//! The pose type used throughout the motion software. Poses are SE(2): a
//! position in the plane plus a heading about the vertical axis.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose in the plane.
///
/// Which frame the pose is expressed in (map or robot-local) is carried by
/// context, not by the type.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSe2 {
    /// The position in meters
    pub position_m: Vector2<f64>,

    /// The heading (angle to the frame's +X axis, right hand rule about +Z)
    /// in radians
    pub heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseSe2 {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    /// Get the unit vector pointing in the pose's heading direction.
    pub fn forward2(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }

    /// Express this pose (given in the same frame as `frame`) in the frame
    /// defined by `frame`.
    ///
    /// The returned heading is the raw difference of headings and is not
    /// folded, callers wanting a bounded angle should fold it themselves.
    pub fn in_frame_of(&self, frame: &PoseSe2) -> PoseSe2 {
        let rel = self.position_m - frame.position_m;
        let (sin_h, cos_h) = frame.heading_rad.sin_cos();

        PoseSe2 {
            position_m: Vector2::new(
                cos_h * rel.x + sin_h * rel.y,
                -sin_h * rel.x + cos_h * rel.y,
            ),
            heading_rad: self.heading_rad - frame.heading_rad,
        }
    }

    /// Express this pose (given in the frame defined by `frame`) in the
    /// frame `frame` itself is expressed in. Inverse of
    /// [`PoseSe2::in_frame_of`].
    pub fn from_frame_of(&self, frame: &PoseSe2) -> PoseSe2 {
        let (sin_h, cos_h) = frame.heading_rad.sin_cos();
        let rotated = Vector2::new(
            cos_h * self.position_m.x - sin_h * self.position_m.y,
            sin_h * self.position_m.x + cos_h * self.position_m.y,
        );

        PoseSe2 {
            position_m: frame.position_m + rotated,
            heading_rad: self.heading_rad + frame.heading_rad,
        }
    }
}
