//! A simulated differential drivetrain for exercising the motion loops off the robot.

#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, time::Duration};

use hurricane_drive::{
    BrakeMode, Chassis, ChassisConfig, Clock, HeadingSensor, MotorGroup, StopHandle,
};

/// Blue cartridge free speed, degrees per second.
const FREE_SPEED: f64 = 3600.0;
/// Fraction of the gap to the commanded speed closed each tick.
const RESPONSE: f64 = 0.25;
pub const TRACK_WIDTH: f64 = 12.0;
pub const WHEEL_DIAMETER: f64 = 2.75;
pub const GEAR_RATIO: f64 = 0.75;

#[derive(Debug, Default)]
pub struct Side {
    pub volts: f64,
    pub velocity: f64,
    pub position: f64,
    pub brake: Option<BrakeMode>,
}

impl Side {
    fn step(&mut self, dt: f64) -> f64 {
        let target = self.volts.clamp(-12.0, 12.0) / 12.0 * FREE_SPEED;
        self.velocity += (target - self.velocity) * RESPONSE;
        let travelled = self.velocity * dt;
        self.position += travelled;
        travelled
    }
}

/// Something to do at the end of a given tick.
pub enum Event {
    /// Knock the heading by this many degrees, as if bumped.
    Bump(f64),
    /// Raise the stop flag, as another task would.
    RequestStop(StopHandle),
}

#[derive(Default)]
pub struct World {
    pub left: Side,
    pub right: Side,
    pub heading: f64,
    pub heading_dead: bool,
    pub ticks: u64,
    /// (left, right) volts seen at each tick.
    pub commands: Vec<(f64, f64)>,
    pub events: Vec<(u64, Event)>,
}

impl World {
    pub fn inches_per_degree() -> f64 {
        GEAR_RATIO / 360.0 * std::f64::consts::PI * WHEEL_DIAMETER
    }

    pub fn average_inches(&self) -> f64 {
        (self.left.position + self.right.position) / 2.0 * Self::inches_per_degree()
    }

    fn step(&mut self, duration: Duration) {
        let dt = duration.as_secs_f64();
        self.commands.push((self.left.volts, self.right.volts));
        let dl = self.left.step(dt) * Self::inches_per_degree();
        let dr = self.right.step(dt) * Self::inches_per_degree();
        self.heading += ((dl - dr) / TRACK_WIDTH).to_degrees();
        self.ticks += 1;

        let now = self.ticks;
        for (_, event) in self.events.iter().filter(|(at, _)| *at == now) {
            match event {
                Event::Bump(degrees) => self.heading += degrees,
                Event::RequestStop(handle) => handle.request_stop(),
            }
        }
    }
}

#[derive(Debug)]
pub struct Disconnected;

pub struct SimMotors {
    world: Rc<RefCell<World>>,
    left: bool,
}

impl SimMotors {
    fn with_side<T>(&self, f: impl FnOnce(&mut Side) -> T) -> T {
        let mut world = self.world.borrow_mut();
        f(if self.left { &mut world.left } else { &mut world.right })
    }
}

impl MotorGroup for SimMotors {
    type Error = Disconnected;

    fn set_voltage(&mut self, volts: f64) -> Result<(), Disconnected> {
        self.with_side(|side| {
            side.volts = volts;
            side.brake = None;
        });
        Ok(())
    }

    fn position(&self) -> Result<f64, Disconnected> {
        Ok(self.with_side(|side| side.position))
    }

    fn reset_position(&mut self) -> Result<(), Disconnected> {
        self.with_side(|side| side.position = 0.0);
        Ok(())
    }

    fn brake(&mut self, mode: BrakeMode) -> Result<(), Disconnected> {
        self.with_side(|side| {
            side.brake = Some(mode);
            side.volts = 0.0;
            if mode == BrakeMode::Hold {
                side.velocity = 0.0;
            }
        });
        Ok(())
    }
}

pub struct SimImu(Rc<RefCell<World>>);

impl HeadingSensor for SimImu {
    type Error = Disconnected;

    fn rotation(&self) -> Result<f64, Disconnected> {
        let world = self.0.borrow();
        if world.heading_dead {
            Err(Disconnected)
        } else {
            Ok(world.heading)
        }
    }

    fn set_rotation(&mut self, degrees: f64) -> Result<(), Disconnected> {
        self.0.borrow_mut().heading = degrees;
        Ok(())
    }
}

pub struct SimClock(Rc<RefCell<World>>);

impl Clock for SimClock {
    async fn sleep(&mut self, duration: Duration) {
        self.0.borrow_mut().step(duration);
    }
}

pub type SimChassis = Chassis<SimMotors, SimMotors, SimImu, SimClock>;

pub fn chassis_with(world: World, config: ChassisConfig) -> (SimChassis, Rc<RefCell<World>>) {
    let world = Rc::new(RefCell::new(world));
    let chassis = Chassis::new(
        SimMotors {
            world: world.clone(),
            left: true,
        },
        SimMotors {
            world: world.clone(),
            left: false,
        },
        SimImu(world.clone()),
        SimClock(world.clone()),
        config,
    )
    .expect("valid config");
    (chassis, world)
}

pub fn chassis_facing(heading: f64) -> (SimChassis, Rc<RefCell<World>>) {
    chassis_with(
        World {
            heading,
            ..World::default()
        },
        ChassisConfig::new(WHEEL_DIAMETER, GEAR_RATIO),
    )
}
