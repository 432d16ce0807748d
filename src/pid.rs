use core::time::Duration;

use libm::fabs;
use serde::{Deserialize, Serialize};

/// Control loop period. Settle times and timeouts are counted in these ticks, not wall-clock time,
/// so changing it means retuning every exit condition.
pub const TICK: Duration = Duration::from_millis(10);

/// Gains for one feedback channel, plus the voltage ceiling its output is clamped to.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PidConstants {
    pub max_voltage: f64,
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
    /// The integral stays untouched until |error| drops below this.
    #[serde(default)]
    pub starti: f64,
}

impl PidConstants {
    pub const fn new(max_voltage: f64, kp: f64, ki: f64, kd: f64, starti: f64) -> Self {
        Self {
            max_voltage,
            kp,
            ki,
            kd,
            starti,
        }
    }

    /// Proportional-derivative only, as used for holding heading while driving.
    pub const fn pd(max_voltage: f64, kp: f64, kd: f64) -> Self {
        Self::new(max_voltage, kp, 0.0, kd, 0.0)
    }
}

/// When a motion counts as finished.
///
/// A motion is settled once |error| stays below `settle_error` for longer than `settle_time`.
/// `timeout` ends it regardless; zero disables the timeout. Both times are stored in configs as
/// whole milliseconds, and the chassis rejects anything finer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExitConditions {
    pub settle_error: f64,
    #[serde(with = "crate::chassis::millis")]
    pub settle_time: Duration,
    #[serde(with = "crate::chassis::millis")]
    pub timeout: Duration,
}

impl ExitConditions {
    pub const fn new(settle_error: f64, settle_time: Duration, timeout: Duration) -> Self {
        Self {
            settle_error,
            settle_time,
            timeout,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub starti: f64,
    pub exit: ExitConditions,
    error: f64,
    accumulated_error: f64,
    prev_error: f64,
    time_settled: Duration,
    time_running: Duration,
}

impl Pid {
    /// A full controller that can tell when it is done.
    ///
    /// `error` is the starting error; it is reported by [`Pid::error`] until the first
    /// [`Pid::compute`].
    pub fn new(error: f64, constants: PidConstants, exit: ExitConditions) -> Self {
        Self {
            kp: constants.kp,
            ki: constants.ki,
            kd: constants.kd,
            starti: constants.starti,
            exit,
            error,
            accumulated_error: 0.0,
            prev_error: 0.0,
            time_settled: Duration::ZERO,
            time_running: Duration::ZERO,
        }
    }

    /// A proportional-derivative controller with no exit conditions. It never reports done.
    pub fn pd(error: f64, kp: f64, kd: f64) -> Self {
        Self::new(
            error,
            PidConstants::pd(0.0, kp, kd),
            ExitConditions::default(),
        )
    }

    /// Advances the controller by one [`TICK`] and returns the new output.
    pub fn compute(&mut self, error: f64) -> f64 {
        if fabs(error) < self.starti {
            self.accumulated_error += error;
        }
        // crossing the setpoint throws away the built up integral
        if (error > 0.0 && self.prev_error < 0.0) || (error < 0.0 && self.prev_error > 0.0) {
            self.accumulated_error = 0.0;
        }

        let output = self.kp * error
            + self.ki * self.accumulated_error
            + self.kd * (error - self.prev_error);

        self.error = error;
        self.prev_error = error;

        if fabs(error) < self.exit.settle_error {
            self.time_settled += TICK;
        } else {
            self.time_settled = Duration::ZERO;
        }
        self.time_running += TICK;

        output
    }

    pub fn is_settled(&self) -> bool {
        self.time_settled > self.exit.settle_time
    }

    pub fn is_timed_out(&self) -> bool {
        !self.exit.timeout.is_zero() && self.time_running > self.exit.timeout
    }

    pub fn is_done(&self) -> bool {
        self.is_timed_out() || self.is_settled()
    }

    /// Most recent error fed to the controller.
    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn accumulated_error(&self) -> f64 {
        self.accumulated_error
    }

    /// Simulated time spent in [`Pid::compute`].
    pub fn elapsed(&self) -> Duration {
        self.time_running
    }

    pub fn time_settled(&self) -> Duration {
        self.time_settled
    }
}
