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

use std::any::Any;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::panic::Location;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use jiff::Zoned;

pub use self::builder::LoggerBuilder;
use crate::Error;
use crate::Level;
use crate::Trap;
use crate::console::Console;
use crate::layout::TextLayout;
use crate::monitor::Monitor;
use crate::record::Record;
use crate::rolling::RollingFile;
use crate::trap::DefaultTrap;

mod builder;

/// A leveled logger writing to standard output and, optionally, to a rotating log file.
///
/// Logging never fails from the caller's point of view: write errors, rotation errors and panics
/// raised while formatting a message are handed to the logger's [`Trap`].
///
/// # Examples
///
/// ```
/// use rotalog::Level;
/// use rotalog::Logger;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = Logger::rolling_size(dir.path(), "app.log", 5, 5 * rotalog::MB).unwrap();
/// logger.set_level(Level::Info);
/// logger.set_console(false);
///
/// logger.info("service started");
/// rotalog::warn!(logger, "queue is {}% full", 90);
/// rotalog::debug!(logger; "not", "written");
/// ```
#[derive(Debug)]
pub struct Logger {
    level: AtomicU8,
    console_enabled: AtomicBool,
    console: Console,
    layout: TextLayout,
    trap: Arc<dyn Trap>,
    file: Option<FileSink>,
}

#[derive(Debug)]
struct FileSink {
    // dropped first, so the monitor thread releases the file before it is closed
    _monitor: Monitor,
    file: Arc<RollingFile>,
}

impl Logger {
    fn new(
        level: Level,
        console_enabled: bool,
        trap: Arc<dyn Trap>,
        file: Option<(Arc<RollingFile>, Monitor)>,
    ) -> Self {
        Self {
            level: AtomicU8::new(level as u8),
            console_enabled: AtomicBool::new(console_enabled),
            console: Console::default(),
            layout: TextLayout::default().no_color(),
            trap,
            file: file.map(|(file, monitor)| FileSink {
                _monitor: monitor,
                file,
            }),
        }
    }

    /// Create a logger that only prints to standard output.
    ///
    /// The minimum level is [`Level::Debug`] and console output is enabled.
    pub fn console() -> Logger {
        Logger::new(
            Level::Debug,
            true,
            Arc::new(DefaultTrap::default()),
            None,
        )
    }

    /// Create a logger writing to `<dir>/<filename>`, rotated by size.
    ///
    /// Once the active file reaches `max_file_size` bytes it is moved to `<filename>.<n>`, where
    /// `n` cycles through `1..=max_backups`; the backup previously held in that slot is deleted.
    /// With `max_backups <= 1` the file is never rotated.
    ///
    /// # Errors
    ///
    /// Return an error if the directory cannot be created or the log file cannot be opened.
    pub fn rolling_size(
        dir: impl Into<PathBuf>,
        filename: impl Into<String>,
        max_backups: usize,
        max_file_size: u64,
    ) -> Result<Logger, Error> {
        LoggerBuilder::new(dir, filename)
            .rollover_size(max_backups, max_file_size)
            .build()
    }

    /// Create a logger writing to `<dir>/<filename>`, rotated when the local calendar day
    /// changes.
    ///
    /// The file of a finished day is moved to `<filename>.<YYYY-MM-DD>`.
    ///
    /// # Errors
    ///
    /// Return an error if the directory cannot be created or the log file cannot be opened.
    pub fn rolling_daily(
        dir: impl Into<PathBuf>,
        filename: impl Into<String>,
    ) -> Result<Logger, Error> {
        LoggerBuilder::new(dir, filename).rollover_daily().build()
    }

    /// Create a [`LoggerBuilder`] for a file logger.
    pub fn builder(dir: impl Into<PathBuf>, filename: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(dir, filename)
    }

    /// The minimum level of records this logger emits.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Set the minimum level of records this logger emits.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether records are also printed to standard output.
    pub fn console_enabled(&self) -> bool {
        self.console_enabled.load(Ordering::Relaxed)
    }

    /// Turn printing to standard output on or off.
    pub fn set_console(&self, enabled: bool) {
        self.console_enabled.store(enabled, Ordering::Relaxed);
    }

    /// The path of the active log file, if this logger writes to a file.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|sink| sink.file.path())
    }

    /// Rotate the active log file now if its rotation policy says so.
    ///
    /// Return whether a rotation happened. Calling this when no rotation is due touches nothing.
    pub fn check_rotation(&self) -> bool {
        self.file
            .as_ref()
            .is_some_and(|sink| sink.file.check_rotation())
    }

    /// Flush the log file and standard output.
    pub fn flush(&self) {
        if let Some(sink) = &self.file {
            if let Err(err) = sink.file.flush() {
                self.trap.trap(&err);
            }
        }
        if let Err(err) = self.console.flush() {
            self.trap.trap(&err);
        }
    }

    /// Log a message at the given level.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let location = Location::caller();
        self.dispatch(level, location.file(), location.line(), args);
    }

    /// Log a message at the debug level.
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, format_args!("{message}"));
    }

    /// Log formatted arguments at the debug level.
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Log a message at the info level.
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, format_args!("{message}"));
    }

    /// Log formatted arguments at the info level.
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    /// Log a message at the warn level.
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warn, format_args!("{message}"));
    }

    /// Log formatted arguments at the warn level.
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Log a message at the error level.
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, format_args!("{message}"));
    }

    /// Log formatted arguments at the error level.
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    /// Log a message at the fatal level. The process keeps running.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(Level::Fatal, format_args!("{message}"));
    }

    /// Log formatted arguments at the fatal level. The process keeps running.
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args);
    }

    pub(crate) fn dispatch(&self, level: Level, file: &str, line: u32, args: fmt::Arguments<'_>) {
        if !self.level().enabled(level) {
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.try_dispatch(level, file, line, args)
        }));
        if let Err(payload) = outcome {
            let err = Error::new("panicked while logging")
                .with_context("file", file)
                .with_context("line", line)
                .with_context("panic", panic_message(payload.as_ref()));
            self.trap.trap(&err);
        }
    }

    /// Write the record to every enabled sink. A failing sink does not stop the others.
    fn try_dispatch(&self, level: Level, file: &str, line: u32, args: fmt::Arguments<'_>) {
        let record = Record::new(level, file, line, args, Zoned::now());

        if let Some(sink) = &self.file {
            let written = self
                .layout
                .format(&record)
                .and_then(|bytes| sink.file.write(&bytes));
            if let Err(err) = written {
                self.trap.trap(&err);
            }
        }

        if self.console_enabled() {
            if let Err(err) = self.console.write(&record) {
                self.trap.trap(&err);
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "Box<dyn Any>"
    }
}

/// Displays a list of values separated by single spaces.
///
/// This backs the variadic form of the logging macros:
///
/// ```
/// let logger = rotalog::Logger::console();
/// rotalog::info!(logger; "user", 42, "logged in");
/// assert_eq!(rotalog::Values(&[&"user", &42]).to_string(), "user 42");
/// ```
pub struct Values<'a>(pub &'a [&'a dyn fmt::Display]);

impl fmt::Display for Values<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}
