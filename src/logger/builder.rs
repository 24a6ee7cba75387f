// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::Error;
use crate::Level;
use crate::Logger;
use crate::Trap;
use crate::clock::Clock;
use crate::monitor::Monitor;
use crate::rolling::RollingFileBuilder;
use crate::rotation::Rotation;
use crate::trap::DefaultTrap;

/// A builder to configure and create a file [`Logger`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use rotalog::Level;
/// use rotalog::LoggerBuilder;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = LoggerBuilder::new(dir.path(), "app.log")
///     .rollover_daily()
///     .level(Level::Info)
///     .console(false)
///     .check_interval(Duration::from_millis(500))
///     .build()
///     .unwrap();
///
/// logger.info("written to app.log");
/// ```
#[derive(Debug)]
pub struct LoggerBuilder {
    // required
    basedir: PathBuf,
    filename: String,

    // has default
    rotation: Rotation,
    level: Level,
    console: bool,
    check_interval: Duration,
    trap: Arc<dyn Trap>,
    clock: Clock,
}

impl LoggerBuilder {
    /// Create a new builder for a logger writing to `<basedir>/<filename>`.
    ///
    /// Without a rollover strategy the file is never rotated.
    pub fn new(basedir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            filename: filename.into(),
            rotation: Rotation::Never,
            level: Level::Debug,
            console: true,
            check_interval: Duration::from_secs(1),
            trap: Arc::new(DefaultTrap::default()),
            clock: Clock::DefaultClock,
        }
    }

    /// Roll over the log file once it reaches `max_file_size` bytes, keeping up to
    /// `max_backups` backups named `<filename>.1` to `<filename>.<max_backups>`.
    ///
    /// Size rotation is disabled when `max_backups <= 1`.
    pub fn rollover_size(mut self, max_backups: usize, max_file_size: u64) -> Self {
        self.rotation = Rotation::Size {
            max_backups,
            max_file_size,
        };
        self
    }

    /// Roll over the log file when the local calendar day changes, keeping the old file as
    /// `<filename>.<YYYY-MM-DD>`.
    pub fn rollover_daily(mut self) -> Self {
        self.rotation = Rotation::Daily;
        self
    }

    /// Set the minimum level of emitted records.
    ///
    /// Default to [`Level::Debug`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Read the minimum level from the environment variable `key`.
    ///
    /// The current level is kept if the variable is unset or does not name a level.
    pub fn level_from_env(mut self, key: &str) -> Self {
        if let Some(level) = std::env::var(key).ok().and_then(|v| v.parse().ok()) {
            self.level = level;
        }
        self
    }

    /// Whether records are also printed to standard output.
    ///
    /// Default to `true`.
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Set how often the background monitor checks whether a rotation is due.
    ///
    /// Default to one second. A zero interval is rejected by [`LoggerBuilder::build`].
    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Set the trap for handling errors during logging.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.trap = Arc::new(trap);
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the [`Logger`] and start its rotation monitor.
    ///
    /// # Errors
    ///
    /// Return an error if either:
    ///
    /// * The log directory cannot be created.
    /// * The configured filename is empty.
    /// * The log file cannot be opened.
    /// * The check interval is zero.
    pub fn build(self) -> Result<Logger, Error> {
        let LoggerBuilder {
            basedir,
            filename,
            rotation,
            level,
            console,
            check_interval,
            trap,
            clock,
        } = self;

        if check_interval.is_zero() {
            return Err(Error::new("check interval must be greater than zero"));
        }

        let file = RollingFileBuilder::new(basedir, filename)
            .rotation(rotation)
            .trap(trap.clone())
            .clock(clock)
            .build()?;
        let file = Arc::new(file);
        let monitor = Monitor::spawn(file.clone(), check_interval, trap.clone())?;

        Ok(Logger::new(level, console, trap, Some((file, monitor))))
    }
}
