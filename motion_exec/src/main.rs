//! Motion executive entry point.
//!
//! Demonstrates the path driver in closed loop against the kinematic
//! simulation:
//!
//!     - Initialise the session and logger
//!     - Load the path driver parameters
//!     - Submit a demonstration goal
//!     - Main loop at a fixed period:
//!         - One driver tick (pose in, command out)
//!         - One simulation step
//!
//! The loop ends when the driver reports a terminal status.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::Duration;

// Internal
use comms_if::{MotionGoal, MotionStatus, PoseSe2};
use motion_lib::path_drv::{Params, PathDrv};
use motion_lib::sim::MotionSim;
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one control cycle.
const CYCLE_PERIOD_S: f64 = 0.01;

/// Cycles between status report log lines.
const REPORT_EVERY_CYCLES: u64 = 100;

/// Default parameter file, relative to the software root.
const DEFAULT_PARAMS_PATH: &str = "params/path_drv.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- INITIALISATION ----

    let session = Session::new("motion_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise the logger")?;

    let params_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PARAMS_PATH.into());
    let params: Params = util::params::load(&params_path)
        .wrap_err_with(|| format!("Failed to load parameters from {:?}", params_path))?;

    info!("Parameters loaded from {:?}", params_path);

    let wheelbase_m = params.wheelbase_m;
    let mut drv = PathDrv::new(params);

    // The robot starts slightly off the path, so the first leg shows the
    // cross-track correction
    let mut sim = MotionSim::new(PoseSe2::new(0.0, 0.3, 0.0), wheelbase_m);

    drv.set_goal(&MotionGoal {
        path: vec![
            PoseSe2::new(0.0, 0.0, 0.0),
            PoseSe2::new(1.5, 0.0, 0.0),
            PoseSe2::new(3.0, 0.0, 0.0),
        ],
        v_ms: 0.5,
    });

    // ---- MAIN LOOP ----

    let mut cycle: u64 = 0;

    loop {
        let (status, report) = drv.execute(&mut sim);

        match status {
            MotionStatus::Moving => (),
            MotionStatus::Success => {
                info!("Goal reached at {:?}", sim.pose());
                break;
            }
            other => {
                warn!("Path following ended with {:?}", other);
                break;
            }
        }

        if cycle % REPORT_EVERY_CYCLES == 0 {
            info!(
                "cycle {}: wp ({}, {}), dir {}, e = {:.3}, v_dem = {:.2} m/s",
                cycle,
                report.path_idx,
                report.wp_idx,
                report.dir_sign,
                report.combined_error,
                report.speed_dem_ms
            );
        }

        sim.step(CYCLE_PERIOD_S);
        thread::sleep(Duration::from_secs_f64(CYCLE_PERIOD_S));

        cycle += 1;
    }

    Ok(())
}
