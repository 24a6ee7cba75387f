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

//! Rotalog is a small leveled logger that prints to the console and writes to a log file rotated
//! by size or by calendar day.
//!
//! # Overview
//!
//! A [`Logger`] filters records by a runtime-adjustable minimum [`Level`], prints them to
//! standard output if console output is on, and appends them to its active log file. Before a
//! record is appended, the file's rotation policy is consulted:
//!
//! * size rotation moves the active file to `<name>.1`, `<name>.2`, … `<name>.<max_backups>` in
//!   a cycle, deleting the backup it replaces;
//! * daily rotation moves the active file to `<name>.<YYYY-MM-DD>` once the local day changes.
//!
//! A background thread checks for due rotations every second, so a daily log rolls over at
//! midnight even when nothing is written. The thread stops when the logger is dropped.
//!
//! Logging never returns an error and never panics into the caller. Failures are sent to a
//! [`Trap`], by default [`DefaultTrap`], which prints them to standard error.
//!
//! # Examples
//!
//! ```
//! use rotalog::Level;
//! use rotalog::Logger;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::rolling_size(dir.path(), "app.log", 10, 5 * rotalog::KB).unwrap();
//! logger.set_console(false);
//!
//! rotalog::info!(logger, "listening on {}", "127.0.0.1:8080");
//! rotalog::warn!(logger; "disk", 91, "% full");
//! logger.error("connection reset");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod bridge;
mod clock;
mod console;
mod error;
mod layout;
mod level;
mod logger;
mod monitor;
mod record;
mod rolling;
mod rotation;
mod trap;

pub use self::bridge::setup_log_crate;
pub use self::error::Error;
pub use self::level::Level;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::logger::Values;
pub use self::trap::DefaultTrap;
pub use self::trap::Trap;

/// One kibibyte, in bytes.
pub const KB: u64 = 1 << 10;
/// One mebibyte, in bytes.
pub const MB: u64 = 1 << 20;
/// One gibibyte, in bytes.
pub const GB: u64 = 1 << 30;
/// One tebibyte, in bytes.
pub const TB: u64 = 1 << 40;

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($method:ident, $logger:expr; $($value:expr),+ $(,)?) => {
        $logger.$method($crate::Values(&[$(&$value as &dyn ::std::fmt::Display),+]))
    };
    ($method:ident, $logger:expr, $($arg:tt)+) => {
        $logger.$method(::std::format_args!($($arg)+))
    };
}

/// Log at the debug level.
///
/// `debug!(logger, "x = {}", x)` formats its arguments; `debug!(logger; a, b)` joins the
/// values with spaces.
#[macro_export]
macro_rules! debug {
    ($logger:expr; $($value:expr),+ $(,)?) => { $crate::__log!(debug, $logger; $($value),+) };
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(debugf, $logger, $($arg)+) };
}

/// Log at the info level. See [`debug!`] for the two forms.
#[macro_export]
macro_rules! info {
    ($logger:expr; $($value:expr),+ $(,)?) => { $crate::__log!(info, $logger; $($value),+) };
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(infof, $logger, $($arg)+) };
}

/// Log at the warn level. See [`debug!`] for the two forms.
#[macro_export]
macro_rules! warn {
    ($logger:expr; $($value:expr),+ $(,)?) => { $crate::__log!(warn, $logger; $($value),+) };
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(warnf, $logger, $($arg)+) };
}

/// Log at the error level. See [`debug!`] for the two forms.
#[macro_export]
macro_rules! error {
    ($logger:expr; $($value:expr),+ $(,)?) => { $crate::__log!(error, $logger; $($value),+) };
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(errorf, $logger, $($arg)+) };
}

/// Log at the fatal level. The process keeps running. See [`debug!`] for the two forms.
#[macro_export]
macro_rules! fatal {
    ($logger:expr; $($value:expr),+ $(,)?) => { $crate::__log!(fatal, $logger; $($value),+) };
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(fatalf, $logger, $($arg)+) };
}
