//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// Generic version of `f64::rem_euclid` for any `Float`. Note that due to
/// floating point round-off the result can equal `rhs.abs()` when `lhs` is
/// tiny and negative.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Fold an angle in radians into the half-open range `(-pi, pi]`.
pub fn normalize_angle<T>(angle: T) -> T
where
    T: Float,
{
    let pi = T::from(std::f64::consts::PI).unwrap();
    let tau = T::from(std::f64::consts::TAU).unwrap();

    let a = rem_euclid(angle, tau);

    if a > pi {
        a - tau
    } else {
        a
    }
}

/// Sign of a value, with zero counted as positive.
///
/// Returns `+1` for `x >= 0` and `-1` otherwise. The zero-positive convention
/// means a target sitting exactly on the robot's lateral axis is driven to
/// forwards.
pub fn sgn<T>(x: T) -> T
where
    T: Float,
{
    if x >= T::from(0.0).unwrap() {
        T::from(1.0).unwrap()
    } else {
        T::from(-1.0).unwrap()
    }
}
