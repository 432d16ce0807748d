//! The hardware the chassis drives, as traits.
//!
//! The motion loops only ever talk to these, so the same code runs on the brain (see the `vex`
//! module) and against a simulated drivetrain in tests.

use core::{fmt::Debug, future::Future, time::Duration};

use serde::{Deserialize, Serialize};

/// What a bank of motors does when told to stop.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrakeMode {
    /// Spin freely.
    #[default]
    Coast,
    /// Short the windings for a quick stop.
    Brake,
    /// Actively hold the current position.
    Hold,
}

/// One side of the drivetrain. Every motor in the group is commanded together.
pub trait MotorGroup {
    type Error: Debug;

    fn set_voltage(&mut self, volts: f64) -> Result<(), Self::Error>;

    /// Average motor shaft rotation in degrees, positive driving forward.
    fn position(&self) -> Result<f64, Self::Error>;

    fn reset_position(&mut self) -> Result<(), Self::Error>;

    fn brake(&mut self, mode: BrakeMode) -> Result<(), Self::Error>;
}

/// Chassis orientation in degrees, clockwise positive.
pub trait HeadingSensor {
    type Error: Debug;

    /// Accumulated rotation; may run past 360 or below 0.
    fn rotation(&self) -> Result<f64, Self::Error>;

    fn set_rotation(&mut self, degrees: f64) -> Result<(), Self::Error>;
}

/// Lets the control loop give up the processor between ticks.
pub trait Clock {
    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()>;
}
