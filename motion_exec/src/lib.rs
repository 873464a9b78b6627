//! # Motion executive library.
//!
//! The path-following control core of the robot. Given a geometric path and
//! the live localisation estimate it produces, at control-loop rate, the
//! steering-and-velocity command that keeps the robot on the path, reverses
//! direction at the path's turning points, and stops at the final pose.
//!
//! The core lives in [`path_drv`]; the traits in [`io`] are the seams through
//! which it reaches localisation, frame transforms, the command channel and
//! the (optional) visualisation sink.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Planar line geometry used by the cross-track error calculation
pub mod geom;

/// External interface seams consumed by the executive
pub mod io;

/// Path model and the cusp segmenter
pub mod path;

/// The path driver: behaviours, steering regulator, pose prediction
pub mod path_drv;

/// Kinematic simulation used by the demo executable and integration tests
pub mod sim;
