//! # Path driver facade
//!
//! [`PathDrv`] owns the driver state: parameters, the segmented path set,
//! the cursor into it, the steering regulator, the latched command and the
//! active behaviour. One call to [`PathDrv::execute`] is one control tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{error, info, warn};
use serde::Serialize;

// Internal
use super::behaviours::{self, Behaviour, Directive, TickCtx};
use super::params::Params;
use super::pid::PidCtrl;
use crate::io::MotionIo;
use crate::path::{split_on_cusps, Path};
use comms_if::{MotionCmd, MotionGoal, MotionKind, MotionStatus};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The path driver facade.
pub struct PathDrv {
    params: Params,

    /// Steering regulator, reset at every goal start
    pid: PidCtrl,

    /// The sub-paths of the current goal, cusp-split, in driving order
    paths: Vec<Path>,

    /// Maximum driving speed of the current goal
    max_speed_ms: f64,

    /// Index of the executing sub-path
    path_idx: usize,

    /// Index of the target waypoint within the executing sub-path
    wp_idx: usize,

    /// The active driving behaviour, `None` when idle
    active: Option<Behaviour>,

    /// The latched actuator command, rewritten (or deliberately kept) each
    /// tick
    cmd: MotionCmd,

    /// First-order filtered issued speed, input to the pose predictor
    filtered_speed_ms: f64,

    /// Error armed by a rejected goal, surfaced by the next tick
    pending_error: Option<MotionStatus>,

    /// Report of the tick in progress
    report: StatusReport,
}

/// Per-tick feedback from the driver.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Index of the executing sub-path
    pub path_idx: usize,

    /// Index of the target waypoint within the executing sub-path
    pub wp_idx: usize,

    /// Driving direction: `+1` forwards, `-1` backwards
    pub dir_sign: f64,

    /// The lateral error term (cross-track or turning-point offset)
    pub lateral_error_m: f64,

    /// The heading error term
    pub heading_error_rad: f64,

    /// The combined error fed to the steering regulator
    pub combined_error: f64,

    /// The speed written to the command this tick, zero if the command was
    /// kept
    pub speed_dem_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur while constructing the driver.
#[derive(Debug, thiserror::Error)]
pub enum PathDrvError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathDrv {
    /// Initialise the driver from the parameter file at the given path.
    pub fn init(params_path: &str) -> Result<Self, PathDrvError> {
        let params: Params = util::params::load(params_path)?;

        Ok(Self::new(params))
    }

    /// Create a new driver with the given parameters.
    pub fn new(params: Params) -> Self {
        let pid = PidCtrl::new(&params.pid);

        Self {
            params,
            pid,
            paths: Vec::new(),
            max_speed_ms: 0.0,
            path_idx: 0,
            wp_idx: 0,
            active: None,
            cmd: MotionCmd::default(),
            filtered_speed_ms: 0.0,
            pending_error: None,
            report: StatusReport::default(),
        }
    }

    /// The kind of motion this driver implements.
    pub fn get_type(&self) -> MotionKind {
        MotionKind::FollowPath
    }

    /// Accept a new goal.
    ///
    /// Any goal in progress is stopped. A goal with fewer than two poses is
    /// rejected: an `InternalError` is armed and surfaced by the next call to
    /// [`PathDrv::execute`], leaving the driver idle.
    pub fn set_goal(&mut self, goal: &MotionGoal) {
        self.stop();
        self.pending_error = None;
        self.max_speed_ms = goal.v_ms;

        if goal.path.len() < 2 {
            error!("Got an invalid path with less than two poses");
            self.pending_error = Some(MotionStatus::InternalError);
            return;
        }

        self.paths = split_on_cusps(&goal.path);

        info!(
            "Following path with {} poses in {} segments",
            goal.path.len(),
            self.paths.len()
        );
    }

    /// Stop the current goal: discard the path set, clear the active
    /// behaviour and zero the commanded speed.
    ///
    /// Idempotent. The zeroed command is published on the next tick.
    pub fn stop(&mut self) {
        self.paths.clear();
        self.active = None;
        self.cmd.v_ms = 0.0;
        self.filtered_speed_ms = 0.0;
    }

    /// One control tick.
    ///
    /// Samples the pose once, runs the active behaviour, applies its
    /// transition directive and publishes the latched command. Terminal
    /// statuses leave the driver idle with a zero-velocity command
    /// published.
    pub fn execute(&mut self, io: &mut dyn MotionIo) -> (MotionStatus, StatusReport) {
        self.report = StatusReport::default();

        // A rejected goal surfaces here, once
        if let Some(err) = self.pending_error.take() {
            self.stop();
            return (err, self.report);
        }

        if self.paths.is_empty() {
            self.active = None;
            return (MotionStatus::Success, self.report);
        }

        if self.active.is_none() {
            self.start();
        }

        // Sample the pose once, it is used for everything in this tick
        let pose = match io.world_pose() {
            Some(p) => p,
            None => {
                warn!("No pose available from localisation, stopping");
                self.stop();
                io.publish(&self.cmd);
                return (MotionStatus::SlamFail, self.report);
            }
        };

        io.draw_arrow(0, &pose, "slam pose", (2.0, 0.7, 1.0));

        // Safe to unwrap, start() ran above if no behaviour was active
        let behaviour = self.active.unwrap();

        let directive = {
            let mut ctx = TickCtx {
                params: &self.params,
                max_speed_ms: self.max_speed_ms,
                pose,
                paths: &self.paths,
                path_idx: &mut self.path_idx,
                wp_idx: &mut self.wp_idx,
                pid: &mut self.pid,
                cmd: &mut self.cmd,
                filtered_speed_ms: self.filtered_speed_ms,
                report: &mut self.report,
                io: &mut *io,
            };

            match behaviour {
                Behaviour::OnLine => behaviours::tick_on_line(&mut ctx),
                Behaviour::ApproachTurningPoint => behaviours::tick_approach_turning_point(&mut ctx),
            }
        };

        let status = match directive {
            Directive::Continue => MotionStatus::Moving,
            Directive::Transition(next) => {
                info!("Switching behaviour from {:?} to {:?}", behaviour, next);
                self.active = Some(next);
                MotionStatus::Moving
            }
            Directive::Done(status) => {
                info!("Stopping after {:?}, status {:?}", behaviour, status);
                self.active = None;
                self.cmd.v_ms = 0.0;
                status
            }
        };

        io.publish(&self.cmd);

        // First-order filter of the issued speed, feeds the pose predictor
        self.filtered_speed_ms +=
            self.params.speed_filter_alpha * (self.cmd.v_ms - self.filtered_speed_ms);

        self.report.path_idx = self.path_idx;
        self.report.wp_idx = self.wp_idx;
        let report = self.report;

        if status != MotionStatus::Moving {
            self.stop();
        }

        (status, report)
    }

    /// Begin executing the current path set from its first waypoint.
    fn start(&mut self) {
        self.path_idx = 0;
        self.wp_idx = 0;
        self.pid.reset();
        self.active = Some(Behaviour::OnLine);

        info!("Starting path following in {:?}", Behaviour::OnLine);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::{CommandSink, FrameTransformer, PoseSource, Visualizer};
    use comms_if::PoseSe2;
    use std::f64::consts::PI;

    /// IO mock with a scripted pose and a record of published commands.
    struct MockIo {
        pose: Option<PoseSe2>,
        published: Vec<MotionCmd>,
    }

    impl MockIo {
        fn at(x: f64, y: f64, heading: f64) -> Self {
            Self {
                pose: Some(PoseSe2::new(x, y, heading)),
                published: Vec::new(),
            }
        }

        fn move_to(&mut self, x: f64, y: f64, heading: f64) {
            self.pose = Some(PoseSe2::new(x, y, heading));
        }
    }

    impl PoseSource for MockIo {
        fn world_pose(&self) -> Option<PoseSe2> {
            self.pose
        }
    }

    impl FrameTransformer for MockIo {
        fn to_local(&self, pose_map: &PoseSe2) -> Option<PoseSe2> {
            self.pose.map(|p| pose_map.in_frame_of(&p))
        }

        fn to_global(&self, pose_local: &PoseSe2) -> Option<PoseSe2> {
            self.pose.map(|p| pose_local.from_frame_of(&p))
        }
    }

    impl CommandSink for MockIo {
        fn publish(&mut self, cmd: &MotionCmd) {
            self.published.push(*cmd);
        }
    }

    impl Visualizer for MockIo {}

    /// Parameters with the sample-period gate disabled, so every tick is
    /// accepted regardless of wall-clock timing. The default `i_max` of zero
    /// pins the integrator, making outputs exactly proportional.
    fn test_params() -> Params {
        let mut params = Params::default();
        params.pid.ta_s = 0.0;
        params
    }

    fn straight_goal() -> MotionGoal {
        MotionGoal {
            path: vec![
                PoseSe2::new(0.0, 0.0, 0.0),
                PoseSe2::new(1.0, 0.0, 0.0),
                PoseSe2::new(2.0, 0.0, 0.0),
            ],
            v_ms: 1.0,
        }
    }

    fn out_and_back_goal() -> MotionGoal {
        MotionGoal {
            path: vec![
                PoseSe2::new(0.0, 0.0, 0.0),
                PoseSe2::new(1.0, 0.0, 0.0),
                PoseSe2::new(2.0, 0.0, 0.0),
                PoseSe2::new(1.0, 0.0, PI),
                PoseSe2::new(0.0, 0.0, PI),
            ],
            v_ms: 1.0,
        }
    }

    #[test]
    fn test_no_goal_is_success() {
        let mut drv = PathDrv::new(test_params());
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        let (status, _) = drv.execute(&mut io);

        assert_eq!(status, MotionStatus::Success);
        assert!(io.published.is_empty());
    }

    #[test]
    fn test_short_goal_arms_internal_error() {
        let mut drv = PathDrv::new(test_params());
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        drv.set_goal(&MotionGoal {
            path: vec![PoseSe2::new(0.0, 0.0, 0.0)],
            v_ms: 1.0,
        });

        // The error surfaces on the next tick, once, and the driver is idle
        // afterwards
        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::InternalError);

        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Success);
    }

    #[test]
    fn test_localisation_loss_stops_with_slam_fail() {
        let mut drv = PathDrv::new(test_params());
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        drv.set_goal(&straight_goal());

        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);

        io.pose = None;
        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::SlamFail);

        // The zeroed command was published
        assert_eq!(io.published.last().unwrap().v_ms, 0.0);

        // A fresh goal resumes cleanly
        io.move_to(0.0, 0.0, 0.0);
        drv.set_goal(&straight_goal());
        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);
    }

    #[test]
    fn test_straight_line_runs_to_success() {
        let mut drv = PathDrv::new(test_params());
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        drv.set_goal(&straight_goal());

        // On the line with zero error: full speed ahead, no steering
        let (status, report) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);
        assert_eq!(report.dir_sign, 1.0);
        let cmd = io.published.last().unwrap();
        assert_eq!(cmd.v_ms, 1.0);
        assert_eq!(cmd.steer_front_rad, 0.0);
        assert_eq!(cmd.steer_back_rad, 0.0);

        // Close to the middle waypoint: still on line, aiming at the last
        io.move_to(0.95, 0.0, 0.0);
        let (status, report) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);
        assert_eq!(report.wp_idx, 2);

        // Within tolerance of the last waypoint: hand-over tick
        io.move_to(1.85, 0.0, 0.0);
        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);

        // Approach tick: crawl speed toward the turning point
        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);
        assert!((io.published.last().unwrap().v_ms - 0.1).abs() < 1e-12);

        // Past the final pose: the waypoint has fallen behind the robot
        io.move_to(2.1, 0.0, 0.0);
        let (status, report) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Success);
        assert_eq!(report.path_idx, 1);
        assert_eq!(report.wp_idx, 0);
        assert_eq!(io.published.last().unwrap().v_ms, 0.0);

        // And the driver is idle afterwards
        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Success);
    }

    #[test]
    fn test_cursor_is_monotone_within_a_goal() {
        let mut drv = PathDrv::new(test_params());
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        drv.set_goal(&straight_goal());

        let positions = [0.0, 0.5, 0.95, 1.4, 1.85, 1.85, 2.1];
        let mut last = (0usize, 0usize);

        for &x in positions.iter() {
            io.move_to(x, 0.0, 0.0);
            let (_, report) = drv.execute(&mut io);

            let cursor = (report.path_idx, report.wp_idx);
            assert!(
                cursor.0 > last.0 || (cursor.0 == last.0 && cursor.1 >= last.1),
                "cursor went backwards: {:?} after {:?}",
                cursor,
                last
            );
            if cursor.0 > last.0 {
                assert_eq!(cursor.1, 0);
            }
            last = cursor;
        }
    }

    #[test]
    fn test_reversal_halves_speed_and_flips_sign() {
        let mut drv = PathDrv::new(test_params());
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        drv.set_goal(&out_and_back_goal());

        // Drive the outward leg to its turning point
        let script = [
            (0.0, MotionStatus::Moving),
            (0.95, MotionStatus::Moving),
            (1.85, MotionStatus::Moving), // hand-over to the approach
            (1.85, MotionStatus::Moving), // crawling at the cusp
        ];
        for &(x, expected) in script.iter() {
            io.move_to(x, 0.0, 0.0);
            let (status, _) = drv.execute(&mut io);
            assert_eq!(status, expected);
        }

        // Just past the cusp: reversal onto the second sub-path
        io.move_to(2.05, 0.0, 0.0);
        let (status, report) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);
        assert_eq!(report.path_idx, 1);
        assert_eq!(report.wp_idx, 0);

        // First tick of the reverse leg: the next waypoint is behind the
        // robot, so it reverses at half the goal speed, halved once more by
        // the steer slowdown (the return poses point the other way, so the
        // heading error term is large)
        let (status, report) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);
        assert_eq!(report.dir_sign, -1.0);

        let cmd = io.published.last().unwrap();
        assert!((cmd.v_ms + 0.25).abs() < 1e-9);
        assert!((cmd.steer_front_rad + 1.5 * PI).abs() < 1e-9);
        assert_eq!(cmd.steer_back_rad, 0.0);
    }

    #[test]
    fn test_steer_above_threshold_halves_speed() {
        let mut drv = PathDrv::new(test_params());
        // Path heading straight up while the robot faces +X: large heading
        // error, large steer demand
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        drv.set_goal(&MotionGoal {
            path: vec![
                PoseSe2::new(0.0, 0.0, PI / 2.0),
                PoseSe2::new(0.0, 2.0, PI / 2.0),
            ],
            v_ms: 1.0,
        });

        let (status, report) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);

        // The target sits exactly on the lateral axis: zero is forward
        assert_eq!(report.dir_sign, 1.0);

        let cmd = io.published.last().unwrap();
        assert!(cmd.steer_front_rad.abs() > 0.25);
        assert_eq!(cmd.v_ms, 0.5);
    }

    #[test]
    fn test_gated_tick_keeps_the_latched_command() {
        let mut params = Params::default();
        // A sample period no test will ever exceed
        params.pid.ta_s = 1000.0;

        let mut drv = PathDrv::new(params);
        let mut io = MockIo::at(0.0, 0.3, 0.0);

        drv.set_goal(&straight_goal());

        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);

        // The regulator declined the tick, so the command is still the
        // default latched one, published unchanged
        let cmd = io.published.last().unwrap();
        assert_eq!(cmd.v_ms, 0.0);
        assert_eq!(cmd.steer_front_rad, 0.0);

        let (_, _) = drv.execute(&mut io);
        assert_eq!(io.published.len(), 2);
        assert_eq!(io.published[0].v_ms, io.published[1].v_ms);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut drv = PathDrv::new(test_params());
        let mut io = MockIo::at(0.0, 0.0, 0.0);

        drv.set_goal(&straight_goal());
        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Moving);

        drv.stop();
        drv.stop();

        let (status, _) = drv.execute(&mut io);
        assert_eq!(status, MotionStatus::Success);
    }
}
