//! # Communications interface crate.
//!
//! Provides the common interface types exchanged between the motion
//! executive and its peers: poses, goals, actuator commands and statuses.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Motion goal, command and status definitions
pub mod motion;

/// Planar pose type and frame transforms
pub mod pose;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use motion::{MotionCmd, MotionGoal, MotionKind, MotionStatus};
pub use pose::PoseSe2;
