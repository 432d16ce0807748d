//! Device trait implementations for the V5 brain.

use core::time::Duration;

use vexide::{
    devices::smart::{
        imu::{InertialError, InertialSensor},
        motor::MotorError,
    },
    prelude::*,
};

use crate::devices::{self, Clock, HeadingSensor, MotorGroup};

pub mod logger;

impl From<devices::BrakeMode> for BrakeMode {
    fn from(mode: devices::BrakeMode) -> Self {
        match mode {
            devices::BrakeMode::Coast => BrakeMode::Coast,
            devices::BrakeMode::Brake => BrakeMode::Brake,
            devices::BrakeMode::Hold => BrakeMode::Hold,
        }
    }
}

/// Runs `f` on every motor, reporting the last failure after all of them were tried.
fn for_each_motor<const N: usize>(
    motors: &mut [Motor; N],
    mut f: impl FnMut(&mut Motor) -> Result<(), MotorError>,
) -> Result<(), MotorError> {
    let mut result = Ok(());
    for m in motors.iter_mut() {
        if let Err(e) = f(m) {
            result = Err(e);
        }
    }
    result
}

impl<const N: usize> MotorGroup for [Motor; N] {
    type Error = MotorError;

    fn set_voltage(&mut self, volts: f64) -> Result<(), MotorError> {
        for_each_motor(self, |m| m.set_voltage(volts))
    }

    fn position(&self) -> Result<f64, MotorError> {
        let mut total = 0.0;
        for m in self.iter() {
            total += m.position()?.as_revolutions() * 360.0;
        }
        Ok(total / N as f64)
    }

    fn reset_position(&mut self) -> Result<(), MotorError> {
        for_each_motor(self, |m| m.reset_position())
    }

    fn brake(&mut self, mode: devices::BrakeMode) -> Result<(), MotorError> {
        let mode = BrakeMode::from(mode);
        for_each_motor(self, |m| m.brake(mode))
    }
}

impl HeadingSensor for InertialSensor {
    type Error = InertialError;

    fn rotation(&self) -> Result<f64, InertialError> {
        InertialSensor::rotation(self)
    }

    fn set_rotation(&mut self, degrees: f64) -> Result<(), InertialError> {
        InertialSensor::set_rotation(self, degrees)
    }
}

/// Sleeps on the vexide runtime, letting other tasks run between ticks.
#[derive(Copy, Clone, Debug, Default)]
pub struct VexClock;

impl Clock for VexClock {
    async fn sleep(&mut self, duration: Duration) {
        sleep(duration).await;
    }
}
