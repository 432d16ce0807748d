//! Closed-loop turning and driving for a differential drivetrain.
//!
//! A [`Chassis`] owns both drive banks, the heading sensor and the tuning. Routines call
//! [`Chassis::turn_to_heading`] and [`Chassis::drive_distance`], which run a PID loop every
//! [`pid::TICK`] until the motion settles, times out or, for drives, is asked to stop.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod autonomous;
pub mod chassis;
pub mod devices;
pub mod pid;
pub mod utils;
#[cfg(feature = "vexide")]
pub mod vex;

pub use autonomous::{DriveSettings, MotionExit, MotionReport, TurnSettings};
pub use chassis::{Chassis, ChassisConfig, ConfigError, StopHandle};
pub use devices::{BrakeMode, Clock, HeadingSensor, MotorGroup};
pub use pid::{ExitConditions, Pid, PidConstants};
