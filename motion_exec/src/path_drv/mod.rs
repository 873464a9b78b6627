//! # Path driver module
//!
//! The path driver keeps the robot on a geometric path. The path is split
//! into direction-consistent sub-paths at its cusps; within a sub-path the
//! driver runs the [`OnLine`](behaviours::Behaviour) behaviour, steering
//! toward the line joining the upcoming waypoints, and hands over to
//! `ApproachTurningPoint` for the final waypoint of the sub-path, where the
//! robot lines up for the reversal onto the next sub-path.
//!
//! Steering is a single discrete PI regulator driven by the sum of a lateral
//! and a heading error. The controlled point is not the robot origin but a
//! "carrot": the front (or, when reversing, rear) axle position predicted
//! through the actuator dead time, which compensates the latency between
//! command and actuation.
//!
//! Behaviours never hold references across ticks; each tick they receive a
//! mutable view of the driver state and return a directive telling the
//! facade whether to continue, switch behaviour, or finish with a status.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod behaviours;
pub mod params;
pub mod pid;
pub mod predict;
mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::{Params, PidParams};
pub use pid::PidCtrl;
pub use state::{PathDrv, PathDrvError, StatusReport};
