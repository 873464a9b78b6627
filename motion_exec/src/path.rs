//! # Path
//!
//! This module defines the path model used by the executive: an ordered
//! sequence of waypoints whose tangent never turns sharply, plus the
//! segmenter that splits a raw pose list into such sub-paths at its cusps
//! (direction reversals).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use comms_if::PoseSe2;
use util::maths::normalize_angle;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Tangent changes strictly greater than this split the path, in radians.
pub const CUSP_ANGLE_RAD: f64 = std::f64::consts::FRAC_PI_3;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A single node of a path: a pose in the map frame, oriented along the
/// direction of travel. Immutable once emplaced.
pub type Waypoint = PoseSe2;

/// A direction-consistent sub-path.
///
/// Always holds at least two waypoints, and successive tangent directions
/// differ by no more than [`CUSP_ANGLE_RAD`]. Produced by
/// [`split_on_cusps`] and never modified after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Path {
    /// Get the number of waypoints in the path
    pub fn num_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    /// Get the index of the final waypoint, the path's turning point.
    pub fn last_idx(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Get the waypoint at the given index.
    ///
    /// # Panics
    /// - If `idx` is out of bounds. The driver's cursor invariants keep it in
    ///   bounds.
    pub fn waypoint(&self, idx: usize) -> &Waypoint {
        &self.waypoints[idx]
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Split a raw pose list into direction-consistent sub-paths at its cusps.
///
/// Walking the list, the tangent into each interior pose is compared with the
/// tangent out of it; a change strictly greater than [`CUSP_ANGLE_RAD`] closes
/// the current sub-path there and opens the next one *at the same pose*, so
/// neighbouring sub-paths share their cusp. Only 2D positions are consulted,
/// the stored orientations are informational.
///
/// Lists with fewer than two poses produce no sub-paths; callers reject such
/// goals before segmentation.
pub fn split_on_cusps(poses: &[PoseSe2]) -> Vec<Path> {
    let n = poses.len();
    if n < 2 {
        return Vec::new();
    }

    let mut paths: Vec<Path> = Vec::new();
    let mut current: Vec<Waypoint> = vec![poses[0]];
    let mut last_point = poses[0];

    for i in 1..n {
        let current_point = poses[i];
        current.push(current_point);

        let is_last_node = i == n - 1;
        let mut segment_ends_here = is_last_node;

        if !is_last_node {
            let next_point = poses[i + 1];

            let diff_last = current_point.position_m - last_point.position_m;
            let last_angle = diff_last.y.atan2(diff_last.x);

            let diff_next = next_point.position_m - current_point.position_m;
            let next_angle = diff_next.y.atan2(diff_next.x);

            let angle = normalize_angle(last_angle - next_angle);

            if angle.abs() > CUSP_ANGLE_RAD {
                // The current node is the last one of the old segment
                segment_ends_here = true;
            }
        }

        if segment_ends_here {
            paths.push(Path {
                waypoints: std::mem::take(&mut current),
            });

            if !is_last_node {
                // The cusp is also the first node of the new segment
                current.push(current_point);
            }
        }

        last_point = current_point;
    }

    paths
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn pose(x: f64, y: f64, heading: f64) -> PoseSe2 {
        PoseSe2::new(x, y, heading)
    }

    #[test]
    fn test_straight_path_is_one_segment() {
        let poses = vec![pose(0.0, 0.0, 0.0), pose(1.0, 0.0, 0.0), pose(2.0, 0.0, 0.0)];

        let paths = split_on_cusps(&poses);

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].waypoints(), poses.as_slice());
    }

    #[test]
    fn test_out_and_back_shares_the_cusp() {
        let poses = vec![
            pose(0.0, 0.0, 0.0),
            pose(1.0, 0.0, 0.0),
            pose(2.0, 0.0, 0.0),
            pose(1.0, 0.0, PI),
            pose(0.0, 0.0, PI),
        ];

        let paths = split_on_cusps(&poses);

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].num_waypoints(), 3);
        assert_eq!(paths[1].num_waypoints(), 3);
        assert_eq!(
            paths[0].waypoint(paths[0].last_idx()),
            paths[1].waypoint(0)
        );
    }

    #[test]
    fn test_turn_below_threshold_does_not_split() {
        let turn = 59f64.to_radians();
        let poses = vec![
            pose(0.0, 0.0, 0.0),
            pose(1.0, 0.0, 0.0),
            pose(1.0 + turn.cos(), turn.sin(), 0.0),
        ];

        assert_eq!(split_on_cusps(&poses).len(), 1);
    }

    #[test]
    fn test_turn_above_threshold_splits() {
        let turn = 61f64.to_radians();
        let poses = vec![
            pose(0.0, 0.0, 0.0),
            pose(1.0, 0.0, 0.0),
            pose(1.0 + turn.cos(), turn.sin(), 0.0),
        ];

        assert_eq!(split_on_cusps(&poses).len(), 2);
    }

    #[test]
    fn test_reconcatenation_reproduces_the_input() {
        let poses = vec![
            pose(0.0, 0.0, 0.0),
            pose(1.0, 0.0, 0.0),
            pose(2.0, 0.0, 0.0),
            pose(1.0, 0.0, PI),
            pose(0.0, 0.0, PI),
            pose(1.0, 0.0, 0.0),
        ];

        let paths = split_on_cusps(&poses);
        assert_eq!(paths.len(), 3);

        // Rebuild the input by dropping the duplicated cusp at each join
        let mut rebuilt: Vec<Waypoint> = paths[0].waypoints().to_vec();
        for path in &paths[1..] {
            rebuilt.extend_from_slice(&path.waypoints()[1..]);
        }

        assert_eq!(rebuilt, poses);
    }

    #[test]
    fn test_too_short_input_yields_nothing() {
        assert!(split_on_cusps(&[]).is_empty());
        assert!(split_on_cusps(&[pose(0.0, 0.0, 0.0)]).is_empty());
    }
}
