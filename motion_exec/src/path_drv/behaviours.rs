//! # Path-driving behaviours
//!
//! The driver's two driving states, each a free tick function over a
//! [`TickCtx`]. A tick reads the pose sampled by the facade, computes its
//! error terms, pushes them through the steering regulator into the latched
//! command, and returns a [`Directive`] telling the facade whether to keep
//! the state, switch to another one, or finish with a status.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use std::f64::consts::FRAC_PI_2;

// Internal
use super::params::Params;
use super::pid::PidCtrl;
use super::predict::predict_pose;
use super::state::StatusReport;
use crate::geom::Line2d;
use crate::io::MotionIo;
use crate::path::{Path, Waypoint};
use comms_if::{MotionCmd, MotionStatus, PoseSe2};
use util::maths::{normalize_angle, sgn};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Speed driven while approaching a turning point, in meters/second.
const APPROACH_SPEED_MS: f64 = 0.1;

/// Lateral offsets below this magnitude are treated as zero while lining up
/// with a turning point, in meters. Prevents chattering once aligned.
const LATERAL_DEAD_BAND_M: f64 = 0.1;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The driving states of the path driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Behaviour {
    /// Drive along the current sub-path toward its next unreached waypoint.
    OnLine,

    /// Aim at the sub-path's final waypoint, preparing for the reversal.
    ApproachTurningPoint,
}

/// What the facade should do with the active behaviour after a tick.
pub(crate) enum Directive {
    /// Keep the current behaviour.
    Continue,

    /// Replace the active behaviour.
    Transition(Behaviour),

    /// Clear the active behaviour and surface the given status.
    Done(MotionStatus),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Mutable view of the driver state handed to a behaviour for one tick.
///
/// Behaviours only ever borrow this view, nothing of it is retained across
/// ticks.
pub(crate) struct TickCtx<'a> {
    pub params: &'a Params,
    pub max_speed_ms: f64,

    /// The pose sampled at tick entry, used for everything in this tick
    pub pose: PoseSe2,

    pub paths: &'a [Path],
    pub path_idx: &'a mut usize,
    pub wp_idx: &'a mut usize,

    pub pid: &'a mut PidCtrl,
    pub cmd: &'a mut MotionCmd,
    pub filtered_speed_ms: f64,

    pub report: &'a mut StatusReport,
    pub io: &'a mut dyn MotionIo,
}

// ------------------------------------------------------------------------------------------------
// TICK FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// One tick of the `OnLine` behaviour.
pub(crate) fn tick_on_line(ctx: &mut TickCtx) -> Directive {
    let path = &ctx.paths[*ctx.path_idx];
    let last_idx = path.last_idx();

    // Advance past every waypoint already within tolerance. Reaching the end
    // of the sub-path this way hands over to the approach behaviour.
    while distance_to(&ctx.pose, path.waypoint(*ctx.wp_idx)) < ctx.params.wp_tolerance_m {
        if *ctx.wp_idx >= last_idx {
            return Directive::Transition(Behaviour::ApproachTurningPoint);
        }
        *ctx.wp_idx += 1;
    }

    let next_wp = *path.waypoint(*ctx.wp_idx);
    ctx.io
        .draw_arrow(0, &next_wp, "current waypoint", (1.0, 1.0, 0.0));
    ctx.io
        .draw_arrow(1, path.waypoint(last_idx), "current waypoint", (1.0, 0.0, 0.0));

    let next_wp_local = match ctx.io.to_local(&next_wp) {
        Some(p) => p,
        None => return Directive::Done(MotionStatus::InternalError),
    };

    let dir_sign = sgn(next_wp_local.position_m.x);

    let e_lateral = match line_error(ctx, dir_sign) {
        Ok(e) => e,
        Err(directive) => return directive,
    };
    let e_heading = heading_error(&next_wp, &ctx.pose);
    let e_combined = e_lateral + e_heading;

    record_errors(ctx, dir_sign, e_lateral, e_heading);
    draw_error_arrows(ctx, e_heading, e_lateral, e_combined);

    let mut speed_ms = ctx.max_speed_ms;
    if dir_sign < 0.0 {
        speed_ms *= 0.5;
    }

    issue_command(ctx, dir_sign, e_combined, speed_ms);

    Directive::Continue
}

/// One tick of the `ApproachTurningPoint` behaviour.
pub(crate) fn tick_approach_turning_point(ctx: &mut TickCtx) -> Directive {
    let path = &ctx.paths[*ctx.path_idx];

    // The approach always aims at the sub-path's final waypoint, the turning
    // point itself
    *ctx.wp_idx = path.last_idx();
    let next_wp = *path.waypoint(*ctx.wp_idx);

    ctx.io
        .draw_arrow(0, &next_wp, "current waypoint", (1.0, 0.0, 0.0));

    let next_wp_local = match ctx.io.to_local(&next_wp) {
        Some(p) => p,
        None => return Directive::Done(MotionStatus::InternalError),
    };

    let dir_sign = sgn(next_wp_local.position_m.x);

    // Turning point test: the point counts as reached once it has fallen
    // behind the robot along the sub-path tangent
    let delta = next_wp.position_m - ctx.pose.position_m;
    let tangent = next_wp.forward2();
    let alpha = normalize_angle(delta.y.atan2(delta.x) - tangent.y.atan2(tangent.x));

    debug!("turning point angle = {:.3} rad", alpha);

    if alpha.abs() >= FRAC_PI_2 {
        *ctx.path_idx += 1;
        *ctx.wp_idx = 0;

        if *ctx.path_idx < ctx.paths.len() {
            return Directive::Transition(Behaviour::OnLine);
        }
        return Directive::Done(MotionStatus::Success);
    }

    let e_lateral = lateral_delta(ctx, &next_wp_local, dir_sign);
    let e_heading = heading_error(&next_wp, &ctx.pose);
    let e_combined = e_lateral + e_heading;

    record_errors(ctx, dir_sign, e_lateral, e_heading);
    draw_error_arrows(ctx, e_heading, e_lateral, e_combined);

    issue_command(ctx, dir_sign, e_combined, APPROACH_SPEED_MS);

    Directive::Continue
}

// ------------------------------------------------------------------------------------------------
// ERROR CALCULATORS
// ------------------------------------------------------------------------------------------------

/// Heading error between a waypoint and the robot, both in the map frame.
fn heading_error(wp: &Waypoint, pose: &PoseSe2) -> f64 {
    normalize_angle(wp.heading_rad - pose.heading_rad)
}

/// Signed cross-track error of the carrot to the target line.
///
/// The target line joins the current waypoint to its follower, in the local
/// frame. On the sub-path's last waypoint there is no follower and the line
/// from its predecessor is used instead. The signed distance is negated so
/// that a positive error steers the robot back toward the line, matching the
/// heading error sign convention.
fn line_error(ctx: &mut TickCtx, dir_sign: f64) -> Result<f64, Directive> {
    let path = &ctx.paths[*ctx.path_idx];
    let last_idx = path.last_idx();

    let (start_idx, end_idx) = if *ctx.wp_idx < last_idx {
        (*ctx.wp_idx, *ctx.wp_idx + 1)
    } else {
        (*ctx.wp_idx - 1, *ctx.wp_idx)
    };

    let start_map = *path.waypoint(start_idx);
    let end_map = *path.waypoint(end_idx);

    let start_local = ctx
        .io
        .to_local(&start_map)
        .ok_or(Directive::Done(MotionStatus::InternalError))?;
    let end_local = ctx
        .io
        .to_local(&end_map)
        .ok_or(Directive::Done(MotionStatus::InternalError))?;

    visualize_line(ctx, &start_map, &end_map);

    let target_line = Line2d::new(start_local.position_m, end_local.position_m);
    let carrot = carrot_point(ctx, dir_sign);

    Ok(-target_line.signed_distance(&carrot))
}

/// Lateral offset between the turning point and the carrot, in the local
/// frame, with a dead band to keep the approach quiet once lined up.
fn lateral_delta(ctx: &mut TickCtx, next_wp_local: &PoseSe2, dir_sign: f64) -> f64 {
    let carrot = carrot_point(ctx, dir_sign);
    let delta = next_wp_local.position_m.y - carrot.y;

    if delta.abs() < LATERAL_DEAD_BAND_M {
        return 0.0;
    }

    delta
}

/// Predict through the dead time and pick the controlled point.
fn carrot_point(ctx: &mut TickCtx, dir_sign: f64) -> Vector2<f64> {
    let pred = predict_pose(
        ctx.cmd,
        ctx.filtered_speed_ms,
        ctx.params.wheelbase_m,
        ctx.params.dead_time_s,
    );
    let carrot = pred.carrot(dir_sign);

    // Project into the map frame for visualisation. Skipped if the transform
    // is unavailable, a marker is not worth aborting for.
    let carrot_local = PoseSe2 {
        position_m: carrot,
        heading_rad: 0.0,
    };
    if let Some(carrot_map) = ctx.io.to_global(&carrot_local) {
        ctx.io
            .draw_mark(0, &carrot_map.position_m, "prediction", (0.0, 0.0, 0.0));
    }

    carrot
}

// ------------------------------------------------------------------------------------------------
// COMMAND ISSUE
// ------------------------------------------------------------------------------------------------

/// Push the combined error through the regulator into the latched command.
///
/// When the regulator declines the tick (sample period not yet elapsed) the
/// latched command is left untouched and remains the robot's actuation.
fn issue_command(ctx: &mut TickCtx, dir_sign: f64, error: f64, speed_ms: f64) {
    let delta_f = match ctx.pid.execute(error) {
        Some(d) => d,
        None => return,
    };

    draw_steering_arrow(ctx, 0, delta_f, (1.0, 1.0, 1.0));

    let mut speed_ms = speed_ms;
    let steer = delta_f.abs();

    debug!("dir={}, steer={:.3}", dir_sign, steer);
    if steer > ctx.params.steer_slow_threshold_rad {
        debug!("steer above threshold, slowing down");
        speed_ms *= 0.5;
    }

    ctx.cmd.steer_front_rad = dir_sign * delta_f;
    ctx.cmd.steer_back_rad = 0.0;
    ctx.cmd.v_ms = dir_sign * speed_ms;

    ctx.report.speed_dem_ms = ctx.cmd.v_ms;
}

// ------------------------------------------------------------------------------------------------
// PRIVATE HELPERS
// ------------------------------------------------------------------------------------------------

/// Distance in the plane between the robot and a waypoint, in meters.
fn distance_to(pose: &PoseSe2, wp: &Waypoint) -> f64 {
    (pose.position_m - wp.position_m).norm()
}

fn record_errors(ctx: &mut TickCtx, dir_sign: f64, e_lateral: f64, e_heading: f64) {
    ctx.report.dir_sign = dir_sign;
    ctx.report.lateral_error_m = e_lateral;
    ctx.report.heading_error_rad = e_heading;
    ctx.report.combined_error = e_lateral + e_heading;
}

/// Draw the target line as an arrow sitting on its end point.
fn visualize_line(ctx: &mut TickCtx, start_map: &Waypoint, end_map: &Waypoint) {
    let dir = end_map.position_m - start_map.position_m;
    let arrow = PoseSe2 {
        position_m: end_map.position_m,
        heading_rad: dir.y.atan2(dir.x),
    };

    ctx.io.draw_arrow(2, &arrow, "line", (0.7, 0.2, 1.0));
}

/// Draw the heading, lateral and combined error terms as steering arrows.
fn draw_error_arrows(ctx: &mut TickCtx, e_heading: f64, e_lateral: f64, e_combined: f64) {
    draw_steering_arrow(ctx, 1, e_heading, (0.2, 1.0, 0.2));
    draw_steering_arrow(ctx, 2, e_lateral, (0.2, 0.2, 1.0));
    draw_steering_arrow(ctx, 3, e_combined, (1.0, 0.2, 0.2));
}

/// Draw an arrow at the robot, rotated from its heading by `angle_rad`.
fn draw_steering_arrow(ctx: &mut TickCtx, id: i32, angle_rad: f64, colour: (f32, f32, f32)) {
    let arrow = PoseSe2 {
        position_m: ctx.pose.position_m,
        heading_rad: ctx.pose.heading_rad + angle_rad,
    };

    ctx.io.draw_arrow(id, &arrow, "steer", colour);
}
