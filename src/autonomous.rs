use core::time::Duration;

use log::{debug, info, warn};

use crate::{
    chassis::{Chassis, check_voltage},
    devices::{BrakeMode, Clock, HeadingSensor, MotorGroup},
    pid::{ExitConditions, Pid, TICK},
    utils::{normalize_180, normalize_360, threshold},
};

/// Optional overrides for [`Chassis::turn_to_heading`]. Anything left `None` comes from the
/// chassis config.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TurnSettings {
    pub max_voltage: Option<f64>,
    /// Leave the motors running at the end so the next motion blends in.
    pub chaining: bool,
    pub settle_error: Option<f64>,
    pub settle_time: Option<Duration>,
}

impl TurnSettings {
    pub fn max_voltage(mut self, volts: f64) -> Self {
        self.max_voltage = Some(volts);
        self
    }
    pub fn chaining(mut self, chaining: bool) -> Self {
        self.chaining = chaining;
        self
    }
    pub fn settle(mut self, error: f64, time: Duration) -> Self {
        self.settle_error = Some(error);
        self.settle_time = Some(time);
        self
    }
}

/// Optional overrides for [`Chassis::drive_distance`]. Anything left `None` comes from the
/// chassis config, and `heading` defaults to the heading the previous motion aimed for.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DriveSettings {
    pub max_voltage: Option<f64>,
    pub heading: Option<f64>,
    pub heading_max_voltage: Option<f64>,
    pub chaining: bool,
    pub settle_error: Option<f64>,
    pub settle_time: Option<Duration>,
}

impl DriveSettings {
    pub fn max_voltage(mut self, volts: f64) -> Self {
        self.max_voltage = Some(volts);
        self
    }
    /// Heading to hold while driving, and the voltage budget for correcting it.
    pub fn heading(mut self, heading: f64, max_voltage: f64) -> Self {
        self.heading = Some(heading);
        self.heading_max_voltage = Some(max_voltage);
        self
    }
    pub fn chaining(mut self, chaining: bool) -> Self {
        self.chaining = chaining;
        self
    }
    pub fn settle(mut self, error: f64, time: Duration) -> Self {
        self.settle_error = Some(error);
        self.settle_time = Some(time);
        self
    }
}

/// Why a motion ended. None of these are failures; a routine decides what a timeout means to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotionExit {
    Settled,
    TimedOut,
    /// The stop flag was raised mid-drive.
    Stopped,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionReport {
    pub exit: MotionExit,
    /// Loop time spent, in ticks of [`TICK`].
    pub elapsed: Duration,
    /// Last tracked error: degrees for turns, inches for drives.
    pub error: f64,
}

impl MotionReport {
    fn from_pid(pid: &Pid) -> Self {
        let exit = if pid.is_settled() {
            MotionExit::Settled
        } else {
            MotionExit::TimedOut
        };
        Self {
            exit,
            elapsed: pid.elapsed(),
            error: pid.error(),
        }
    }
}

/// Picks the voltage limit for one channel of a motion. An override outside `(0, 12]` would invert
/// or skip the clamp, so it is logged and the configured limit is used instead.
fn voltage_limit(channel: &'static str, requested: Option<f64>, configured: f64) -> f64 {
    let Some(volts) = requested else {
        return configured;
    };
    match check_voltage(channel, volts) {
        Ok(()) => volts,
        Err(e) => {
            warn!("{}, using {:.1}V", e, configured);
            configured
        }
    }
}

impl<L, R, G, C> Chassis<L, R, G, C>
where
    L: MotorGroup,
    R: MotorGroup,
    G: HeadingSensor,
    C: Clock,
{
    /// Turns in place to an absolute heading, the short way round.
    ///
    /// Does not watch the stop flag; only settling or the turn timeout end it.
    pub async fn turn_to_heading(&mut self, heading: f64, settings: TurnSettings) -> MotionReport {
        let max_voltage =
            voltage_limit("turn", settings.max_voltage, self.config.turn.max_voltage);
        let exit = ExitConditions {
            settle_error: settings
                .settle_error
                .unwrap_or(self.config.turn_exit.settle_error),
            settle_time: settings
                .settle_time
                .unwrap_or(self.config.turn_exit.settle_time),
            timeout: self.config.turn_exit.timeout,
        };

        self.desired_heading = normalize_360(heading);
        let mut turn_pid = Pid::new(
            normalize_180(heading - self.heading()),
            self.config.turn,
            exit,
        );
        debug!(
            "turn_to_heading: {:.1} from {:.1} at {:.1}V",
            self.desired_heading,
            self.heading(),
            max_voltage
        );

        while !turn_pid.is_done() {
            let error = normalize_180(heading - self.heading());
            let output = threshold(turn_pid.compute(error), -max_voltage, max_voltage);
            self.drive_with_voltage(output, -output);
            self.clock.sleep(TICK).await;
        }

        if !settings.chaining {
            self.stop(BrakeMode::Hold);
        }

        let report = MotionReport::from_pid(&turn_pid);
        match report.exit {
            MotionExit::Settled => info!(
                "turn_to_heading: settled in {}ms, {:.2} deg off",
                report.elapsed.as_millis(),
                report.error
            ),
            _ => warn!(
                "turn_to_heading: timed out after {}ms, {:.2} deg off",
                report.elapsed.as_millis(),
                report.error
            ),
        }
        report
    }

    /// Drives straight for `distance` inches (negative backs up) while holding a heading.
    ///
    /// Drive and heading corrections are clamped separately and then added, so the sum can exceed
    /// either limit. Raising the stop flag ends the drive at the next tick; the flag is cleared on
    /// the way out.
    pub async fn drive_distance(&mut self, distance: f64, settings: DriveSettings) -> MotionReport {
        let drive_max_voltage =
            voltage_limit("drive", settings.max_voltage, self.config.drive.max_voltage);
        let heading_max_voltage = voltage_limit(
            "heading",
            settings.heading_max_voltage,
            self.config.heading.max_voltage,
        );
        let exit = ExitConditions {
            settle_error: settings
                .settle_error
                .unwrap_or(self.config.drive_exit.settle_error),
            settle_time: settings
                .settle_time
                .unwrap_or(self.config.drive_exit.settle_time),
            timeout: self.config.drive_exit.timeout,
        };

        self.desired_heading = normalize_360(settings.heading.unwrap_or(self.desired_heading));
        let mut drive_pid = Pid::new(distance, self.config.drive, exit);
        let mut heading_pid = Pid::pd(
            normalize_180(self.desired_heading - self.heading()),
            self.config.heading.kp,
            self.config.heading.kd,
        );
        // the encoders are never zeroed here, only the starting point is noted
        let start_position = self.average_position_in();
        debug!(
            "drive_distance: {:.2}in holding {:.1} at {:.1}V/{:.1}V",
            distance, self.desired_heading, drive_max_voltage, heading_max_voltage
        );

        let mut stopped = false;
        while !drive_pid.is_done() {
            if self.stop_flag.is_requested() {
                stopped = true;
                break;
            }
            let travelled = self.average_position_in() - start_position;
            let drive_error = distance - travelled;
            let heading_error = normalize_180(self.desired_heading - self.heading());

            let drive_output = threshold(
                drive_pid.compute(drive_error),
                -drive_max_voltage,
                drive_max_voltage,
            );
            let heading_output = threshold(
                heading_pid.compute(heading_error),
                -heading_max_voltage,
                heading_max_voltage,
            );

            self.drive_with_voltage(drive_output + heading_output, drive_output - heading_output);
            self.clock.sleep(TICK).await;
        }
        self.stop_flag.clear();

        if !settings.chaining {
            self.stop(BrakeMode::Hold);
        }

        let mut report = MotionReport::from_pid(&drive_pid);
        if stopped {
            report.exit = MotionExit::Stopped;
        }
        match report.exit {
            MotionExit::Settled => info!(
                "drive_distance: settled in {}ms, {:.2}in off",
                report.elapsed.as_millis(),
                report.error
            ),
            MotionExit::TimedOut => warn!(
                "drive_distance: timed out after {}ms, {:.2}in off",
                report.elapsed.as_millis(),
                report.error
            ),
            MotionExit::Stopped => info!(
                "drive_distance: stopped after {}ms, {:.2}in off",
                report.elapsed.as_millis(),
                report.error
            ),
        }
        report
    }
}
