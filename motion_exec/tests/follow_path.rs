//! Closed-loop integration of the path driver against the kinematic
//! simulation.

use comms_if::{MotionGoal, MotionStatus, PoseSe2};
use motion_lib::path_drv::{Params, PathDrv};
use motion_lib::sim::MotionSim;

/// Simulation step, in seconds of simulated time per driver tick.
const SIM_STEP_S: f64 = 0.01;

/// Tick limit well above what the scenarios need.
const MAX_TICKS: usize = 20_000;

#[test]
fn test_straight_path_converges_to_success() {
    let mut params = Params::default();
    // Run at test speed: the simulated clock, not the wall clock, paces the
    // loop
    params.pid.ta_s = 0.0;

    let wheelbase_m = params.wheelbase_m;
    let mut drv = PathDrv::new(params);

    // Start half a waypoint-tolerance off the path
    let mut sim = MotionSim::new(PoseSe2::new(0.0, 0.1, 0.0), wheelbase_m);

    drv.set_goal(&MotionGoal {
        path: vec![
            PoseSe2::new(0.0, 0.0, 0.0),
            PoseSe2::new(1.0, 0.0, 0.0),
            PoseSe2::new(2.0, 0.0, 0.0),
        ],
        v_ms: 0.5,
    });

    let mut status = MotionStatus::Moving;
    for _ in 0..MAX_TICKS {
        let (s, _) = drv.execute(&mut sim);
        status = s;
        if status != MotionStatus::Moving {
            break;
        }
        sim.step(SIM_STEP_S);
    }

    assert_eq!(status, MotionStatus::Success);

    // The robot ran the path to its far end and was told to stop there
    let pose = sim.pose();
    assert!(pose.position_m.x > 1.8, "stopped short at {:?}", pose);
    assert!(pose.position_m.y.abs() < 0.3, "off track at {:?}", pose);
    assert_eq!(sim.last_cmd().v_ms, 0.0);
}

#[test]
fn test_goal_can_be_rerun_after_success() {
    let mut params = Params::default();
    params.pid.ta_s = 0.0;

    let wheelbase_m = params.wheelbase_m;
    let mut drv = PathDrv::new(params);
    let mut sim = MotionSim::new(PoseSe2::new(0.0, 0.0, 0.0), wheelbase_m);

    let goal = MotionGoal {
        path: vec![PoseSe2::new(0.0, 0.0, 0.0), PoseSe2::new(1.0, 0.0, 0.0)],
        v_ms: 0.5,
    };

    for _ in 0..2 {
        drv.set_goal(&goal);

        let mut status = MotionStatus::Moving;
        for _ in 0..MAX_TICKS {
            let (s, _) = drv.execute(&mut sim);
            status = s;
            if status != MotionStatus::Moving {
                break;
            }
            sim.step(SIM_STEP_S);
        }

        assert_eq!(status, MotionStatus::Success);

        // Walk the robot back for the second run
        sim = MotionSim::new(PoseSe2::new(0.0, 0.0, 0.0), wheelbase_m);
    }
}
