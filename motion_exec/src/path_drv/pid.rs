//! # Discrete steering regulator
//!
//! A PI regulator with a clamped integrator and a minimum sample period. The
//! sample period gate decouples the discrete integrator from control-loop
//! jitter: a tick arriving early produces no output and the caller keeps the
//! previously latched command.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Instant;

use super::params::PidParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A discrete-time PI regulator.
#[derive(Debug, Clone)]
pub struct PidCtrl {
    /// Proportional gain
    kp: f64,

    /// Integral gain
    ki: f64,

    /// Integrator saturation magnitude
    i_max: f64,

    /// Minimum sample period in seconds
    ta_s: f64,

    /// The integral accumulation
    i_f: f64,

    /// Instant of the previous accepted tick (or of the last reset)
    last_update: Instant,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PidCtrl {
    /// Create a new regulator from the given parameters.
    pub fn new(params: &PidParams) -> Self {
        Self {
            kp: params.kp,
            ki: params.ki,
            i_max: params.i_max,
            ta_s: params.ta_s,
            i_f: 0.0,
            last_update: Instant::now(),
        }
    }

    /// Reconfigure the gains. Resets the regulator.
    pub fn configure(&mut self, params: &PidParams) {
        self.kp = params.kp;
        self.ki = params.ki;
        self.i_max = params.i_max;
        self.ta_s = params.ta_s;
        self.reset();
    }

    /// Zero the integrator and restart the sample timer.
    pub fn reset(&mut self) {
        self.i_f = 0.0;
        self.last_update = Instant::now();
    }

    /// Advance the regulator with the current error.
    ///
    /// Returns `None` when less than the sample period has elapsed since the
    /// previous accepted tick; the regulator state is untouched and the
    /// caller must keep its previous output. Otherwise the integrator is
    /// advanced by the elapsed time (and clamped to `±i_max`) and the new
    /// output `kp·e + ki·i` is returned.
    pub fn execute(&mut self, error: f64) -> Option<f64> {
        let dt_s = self.last_update.elapsed().as_secs_f64();

        if dt_s < self.ta_s {
            return None;
        }

        self.i_f = (self.i_f + dt_s * error).clamp(-self.i_max, self.i_max);
        self.last_update = Instant::now();

        Some(self.kp * error + self.ki * self.i_f)
    }

    /// Current value of the integrator.
    pub fn integral(&self) -> f64 {
        self.i_f
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_sample_period_gating() {
        let params = PidParams {
            ta_s: 0.03,
            i_max: 10.0,
            ..Default::default()
        };
        let mut pid = PidCtrl::new(&params);

        sleep(Duration::from_millis(40));
        assert!(pid.execute(0.5).is_some());
        let i_after_first = pid.integral();

        // Immediately again, well inside the sample period: no update, and
        // the integrator is untouched
        assert!(pid.execute(0.5).is_none());
        assert_eq!(pid.integral(), i_after_first);
    }

    #[test]
    fn test_integrator_clamps() {
        let params = PidParams {
            ta_s: 0.0,
            ki: 1.0,
            i_max: 0.1,
            ..Default::default()
        };
        let mut pid = PidCtrl::new(&params);

        sleep(Duration::from_millis(10));
        pid.execute(1000.0);
        assert_eq!(pid.integral(), 0.1);

        sleep(Duration::from_millis(10));
        pid.execute(-1000.0);
        assert_eq!(pid.integral(), -0.1);
    }

    #[test]
    fn test_output_with_saturated_integrator() {
        // The default i_max of zero pins the integrator, leaving a pure
        // proportional output
        let params = PidParams {
            ta_s: 0.0,
            kp: 1.5,
            ..Default::default()
        };
        let mut pid = PidCtrl::new(&params);

        assert_eq!(pid.execute(2.0), Some(3.0));
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn test_reset_rearms_the_gate() {
        let params = PidParams {
            ta_s: 0.05,
            ..Default::default()
        };
        let mut pid = PidCtrl::new(&params);

        sleep(Duration::from_millis(60));
        assert!(pid.execute(1.0).is_some());

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert!(pid.execute(1.0).is_none());
    }
}
