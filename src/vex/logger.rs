//! `log` backend that prints to the brain's terminal.
//!
//! ```ignore
//! hurricane_drive::vex::logger::init(log::LevelFilter::Info).ok();
//! ```

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use vexide::prelude::*;

struct BrainLogger;

impl log::Log for BrainLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} {} - {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: BrainLogger = BrainLogger;

/// Installs the terminal logger. Fails if a logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
