#![no_main]
#![no_std]

use core::time::Duration;

use hurricane_drive::{
    Chassis, ChassisConfig, DriveSettings, MotionExit, TurnSettings,
    utils::units::ft,
    vex::{VexClock, logger},
};
use log::{LevelFilter, error, info, warn};
use vexide::{
    devices::smart::imu::{InertialError, InertialSensor},
    prelude::*,
};

type Drivetrain = Chassis<[Motor; 3], [Motor; 3], InertialSensor, VexClock>;

pub struct Robot {
    chassis: Drivetrain,
}

impl Robot {
    async fn new(peripherals: Peripherals) -> Option<Self> {
        let left_motors = [
            Motor::new(peripherals.port_1, Gearset::Blue, Direction::Reverse),
            Motor::new(peripherals.port_2, Gearset::Blue, Direction::Reverse),
            Motor::new(peripherals.port_3, Gearset::Blue, Direction::Reverse),
        ];
        let right_motors = [
            Motor::new(peripherals.port_4, Gearset::Blue, Direction::Forward),
            Motor::new(peripherals.port_5, Gearset::Blue, Direction::Forward),
            Motor::new(peripherals.port_6, Gearset::Blue, Direction::Forward),
        ];
        let mut imu = InertialSensor::new(peripherals.port_9);
        match imu.calibrate().await {
            Ok(_) => info!("IMU calibration successful"),
            Err(e) => {
                let msg = match e {
                    InertialError::CalibrationTimedOut => "IMU calibration timed out",
                    InertialError::Port { .. } => "IMU not detected on the configured port",
                    _ => "IMU calibration error",
                };
                // turns will still run, they just end on their timeout
                warn!("{}: {:?}", msg, e);
            }
        }

        // 2.75in wheels, 36 tooth motor gear driving a 48 tooth wheel gear
        let config = ChassisConfig::new(2.75, 0.75);
        let mut chassis = match Chassis::new(left_motors, right_motors, imu, VexClock, config) {
            Ok(chassis) => chassis,
            Err(e) => {
                error!("bad chassis config: {}", e);
                return None;
            }
        };
        chassis.reset_positions();
        chassis.set_heading(0.0);
        chassis.stop_default();
        Some(Self { chassis })
    }
}

/// Drives a rectangle and ends facing the starting direction.
async fn square_routine(chassis: &mut Drivetrain) {
    let legs = [(0.0, ft(1.0)), (90.0, 20.0), (180.0, ft(1.0)), (270.0, 20.0)];
    for (i, (heading, distance)) in legs.into_iter().enumerate() {
        if i > 0 {
            let report = chassis
                .turn_to_heading(heading, TurnSettings::default().max_voltage(10.0).chaining(true))
                .await;
            if report.exit == MotionExit::TimedOut {
                warn!("square: turn to {} gave up {:.1} deg short", heading, report.error);
            }
        }
        let report = chassis
            .drive_distance(
                distance,
                DriveSettings::default()
                    .max_voltage(10.0)
                    .heading(heading, 6.0)
                    .chaining(true),
            )
            .await;
        if report.exit != MotionExit::Settled {
            warn!("square: leg {} ended {:?}, {:.1}in off", i, report.exit, report.error);
        }
    }
    chassis.turn_to_heading(0.0, TurnSettings::default()).await;
}

impl Compete for Robot {
    async fn autonomous(&mut self) {
        square_routine(&mut self.chassis).await;
    }

    async fn driver(&mut self) {
        self.chassis.stop_default();
        loop {
            sleep(Duration::from_millis(10)).await;
        }
    }
}

#[vexide::main]
async fn main(peripherals: Peripherals) {
    let _ = logger::init(LevelFilter::Info);
    if let Some(robot) = Robot::new(peripherals).await {
        robot.compete().await;
    }
}
