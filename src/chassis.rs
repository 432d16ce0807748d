use core::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use alloc::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    devices::{BrakeMode, Clock, HeadingSensor, MotorGroup},
    pid::{ExitConditions, PidConstants},
    utils::{MAX_VOLTS, normalize_360, units::inches_per_degree},
};

#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("wheel diameter must be positive, got {0}")]
    WheelDiameter(f64),
    #[error("gear ratio must be positive, got {0}")]
    GearRatio(f64),
    #[error("{channel} max voltage must be within (0, 12], got {volts}")]
    MaxVoltage { channel: &'static str, volts: f64 },
    #[error("{channel} integral start must not be negative, got {starti}")]
    StartI { channel: &'static str, starti: f64 },
    #[error("{channel} settle error must not be negative, got {settle_error}")]
    SettleError {
        channel: &'static str,
        settle_error: f64,
    },
    #[error("{channel} exit times are kept in whole milliseconds, got {duration:?}")]
    SubMillisecond {
        channel: &'static str,
        duration: Duration,
    },
}

/// Everything tunable about the drivetrain.
///
/// Geometry is required; every other field defaults to the tuning the template ships with.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChassisConfig {
    /// Wheel diameter in inches.
    pub wheel_diameter: f64,
    /// Motor to wheel gear ratio.
    pub gear_ratio: f64,
    #[serde(default = "ChassisConfig::default_turn")]
    pub turn: PidConstants,
    #[serde(default = "ChassisConfig::default_drive")]
    pub drive: PidConstants,
    /// Only `max_voltage`, `kp` and `kd` are used.
    #[serde(default = "ChassisConfig::default_heading")]
    pub heading: PidConstants,
    #[serde(default = "ChassisConfig::default_turn_exit")]
    pub turn_exit: ExitConditions,
    #[serde(default = "ChassisConfig::default_drive_exit")]
    pub drive_exit: ExitConditions,
    #[serde(default)]
    pub stop_mode: BrakeMode,
}

impl ChassisConfig {
    pub fn new(wheel_diameter: f64, gear_ratio: f64) -> Self {
        Self {
            wheel_diameter,
            gear_ratio,
            turn: Self::default_turn(),
            drive: Self::default_drive(),
            heading: Self::default_heading(),
            turn_exit: Self::default_turn_exit(),
            drive_exit: Self::default_drive_exit(),
            stop_mode: BrakeMode::Coast,
        }
    }

    fn default_turn() -> PidConstants {
        PidConstants::new(10.0, 0.2, 0.015, 1.5, 7.5)
    }
    fn default_drive() -> PidConstants {
        PidConstants::new(10.0, 1.5, 0.0, 10.0, 0.0)
    }
    fn default_heading() -> PidConstants {
        PidConstants::pd(6.0, 0.4, 1.0)
    }
    fn default_turn_exit() -> ExitConditions {
        ExitConditions::new(1.5, Duration::from_millis(300), Duration::from_millis(1500))
    }
    fn default_drive_exit() -> ExitConditions {
        ExitConditions::new(1.0, Duration::from_millis(300), Duration::from_millis(2000))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.wheel_diameter.is_finite() && self.wheel_diameter > 0.0) {
            return Err(ConfigError::WheelDiameter(self.wheel_diameter));
        }
        if !(self.gear_ratio.is_finite() && self.gear_ratio > 0.0) {
            return Err(ConfigError::GearRatio(self.gear_ratio));
        }
        check_constants("turn", &self.turn)?;
        check_constants("drive", &self.drive)?;
        check_voltage("heading", self.heading.max_voltage)?;
        check_exit("turn", &self.turn_exit)?;
        check_exit("drive", &self.drive_exit)?;
        Ok(())
    }
}

pub(crate) fn check_voltage(channel: &'static str, volts: f64) -> Result<(), ConfigError> {
    if volts > 0.0 && volts <= MAX_VOLTS {
        Ok(())
    } else {
        Err(ConfigError::MaxVoltage { channel, volts })
    }
}

fn check_constants(channel: &'static str, constants: &PidConstants) -> Result<(), ConfigError> {
    check_voltage(channel, constants.max_voltage)?;
    if constants.starti < 0.0 || constants.starti.is_nan() {
        return Err(ConfigError::StartI {
            channel,
            starti: constants.starti,
        });
    }
    Ok(())
}

fn check_exit(channel: &'static str, exit: &ExitConditions) -> Result<(), ConfigError> {
    if exit.settle_error < 0.0 || exit.settle_error.is_nan() {
        return Err(ConfigError::SettleError {
            channel,
            settle_error: exit.settle_error,
        });
    }
    for duration in [exit.settle_time, exit.timeout] {
        if duration.subsec_nanos() % 1_000_000 != 0 {
            return Err(ConfigError::SubMillisecond { channel, duration });
        }
    }
    Ok(())
}

/// Serializes a [`Duration`] as whole milliseconds. `check_exit` keeps anything finer out of a
/// validated config, so nothing is lost on the way through.
pub(crate) mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Asks a running [`Chassis::drive_distance`] to give up at its next tick.
///
/// Clones share the same flag, so one can be handed to another task.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct Chassis<L, R, G, C> {
    pub left_motors: L,
    pub right_motors: R,
    pub imu: G,
    pub clock: C,
    pub(crate) config: ChassisConfig,
    inches_per_degree: f64,
    /// Heading the last motion aimed for, in `[0, 360)`. Drives hold it unless told otherwise.
    pub(crate) desired_heading: f64,
    pub(crate) stop_flag: StopHandle,
}

impl<L, R, G, C> Chassis<L, R, G, C>
where
    L: MotorGroup,
    R: MotorGroup,
    G: HeadingSensor,
    C: Clock,
{
    pub fn new(
        left_motors: L,
        right_motors: R,
        imu: G,
        clock: C,
        config: ChassisConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let inches_per_degree = inches_per_degree(config.wheel_diameter, config.gear_ratio);
        let desired_heading = normalize_360(imu.rotation().unwrap_or_default());
        log::debug!(
            "chassis: {:.4} in/deg, starting heading {:.1}",
            inches_per_degree,
            desired_heading
        );
        Ok(Self {
            left_motors,
            right_motors,
            imu,
            clock,
            config,
            inches_per_degree,
            desired_heading,
            stop_flag: StopHandle::default(),
        })
    }

    pub fn config(&self) -> &ChassisConfig {
        &self.config
    }

    /// Sets the turn gains. `starti` keeps the integral at zero until |error| is below it, which
    /// keeps big turns from winding up.
    pub fn set_turn_constants(
        &mut self,
        max_voltage: f64,
        kp: f64,
        ki: f64,
        kd: f64,
        starti: f64,
    ) -> Result<(), ConfigError> {
        let constants = PidConstants::new(max_voltage, kp, ki, kd, starti);
        check_constants("turn", &constants)?;
        self.config.turn = constants;
        Ok(())
    }

    pub fn set_drive_constants(
        &mut self,
        max_voltage: f64,
        kp: f64,
        ki: f64,
        kd: f64,
        starti: f64,
    ) -> Result<(), ConfigError> {
        let constants = PidConstants::new(max_voltage, kp, ki, kd, starti);
        check_constants("drive", &constants)?;
        self.config.drive = constants;
        Ok(())
    }

    pub fn set_heading_constants(
        &mut self,
        max_voltage: f64,
        kp: f64,
        kd: f64,
    ) -> Result<(), ConfigError> {
        check_voltage("heading", max_voltage)?;
        self.config.heading = PidConstants::pd(max_voltage, kp, kd);
        Ok(())
    }

    pub fn set_turn_exit_conditions(
        &mut self,
        settle_error: f64,
        settle_time: Duration,
        timeout: Duration,
    ) -> Result<(), ConfigError> {
        let exit = ExitConditions::new(settle_error, settle_time, timeout);
        check_exit("turn", &exit)?;
        self.config.turn_exit = exit;
        Ok(())
    }

    pub fn set_drive_exit_conditions(
        &mut self,
        settle_error: f64,
        settle_time: Duration,
        timeout: Duration,
    ) -> Result<(), ConfigError> {
        let exit = ExitConditions::new(settle_error, settle_time, timeout);
        check_exit("drive", &exit)?;
        self.config.drive_exit = exit;
        Ok(())
    }

    pub fn set_stop_mode(&mut self, mode: BrakeMode) {
        self.config.stop_mode = mode;
    }

    /// Tells the heading sensor which way the robot is facing and aims future motions that way.
    pub fn set_heading(&mut self, orientation: f64) {
        let _ = self.imu.set_rotation(orientation);
        self.desired_heading = normalize_360(orientation);
    }

    /// Absolute heading in `[0, 360)`.
    pub fn heading(&self) -> f64 {
        normalize_360(self.imu.rotation().unwrap_or_default())
    }

    pub fn desired_heading(&self) -> f64 {
        self.desired_heading
    }

    pub fn left_position_in(&self) -> f64 {
        self.left_motors.position().unwrap_or_default() * self.inches_per_degree
    }

    pub fn right_position_in(&self) -> f64 {
        self.right_motors.position().unwrap_or_default() * self.inches_per_degree
    }

    pub(crate) fn average_position_in(&self) -> f64 {
        (self.left_position_in() + self.right_position_in()) / 2.0
    }

    pub fn reset_positions(&mut self) {
        let _ = self.left_motors.reset_position();
        let _ = self.right_motors.reset_position();
    }

    pub fn drive_with_voltage(&mut self, left: f64, right: f64) {
        let _ = self.left_motors.set_voltage(left);
        let _ = self.right_motors.set_voltage(right);
    }

    pub fn stop(&mut self, mode: BrakeMode) {
        let _ = self.left_motors.brake(mode);
        let _ = self.right_motors.brake(mode);
    }

    /// Stops with the mode picked by [`Chassis::set_stop_mode`].
    pub fn stop_default(&mut self) {
        self.stop(self.config.stop_mode);
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop_flag.clone()
    }
}
