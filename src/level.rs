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

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The severity of a log record, and the minimum severity a logger emits.
///
/// Levels are ordered from the most verbose to the most severe:
///
/// `All < Debug < Info < Warn < Error < Fatal < Off`
///
/// `All` and `Off` are only meaningful as a minimum: a logger set to `All` emits every record,
/// one set to `Off` emits none.
///
/// `Fatal` is a naming convention only. Logging at `Fatal` never terminates the process.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Level {
    /// Enables every record.
    All = 0,
    /// Designates lower priority information.
    #[default]
    Debug = 1,
    /// Designates useful information.
    Info = 2,
    /// Designates hazardous situations.
    Warn = 3,
    /// Designates serious errors.
    Error = 4,
    /// Designates errors the application may not recover from.
    Fatal = 5,
    /// Disables every record.
    Off = 6,
}

impl Level {
    const LEVELS: [Level; 7] = [
        Level::All,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Off,
    ];

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::All => "ALL",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    /// Checks whether a record at `level` passes when `self` is the configured minimum.
    ///
    /// # Examples
    ///
    /// ```
    /// use rotalog::Level;
    ///
    /// assert!(Level::Info.enabled(Level::Warn));
    /// assert!(Level::Info.enabled(Level::Info));
    /// assert!(!Level::Info.enabled(Level::Debug));
    /// assert!(!Level::Off.enabled(Level::Fatal));
    /// ```
    pub fn enabled(&self, level: Level) -> bool {
        level >= *self
    }

    /// Return an iterator over all levels, from `All` to `Off`.
    pub fn iter() -> impl Iterator<Item = Level> {
        Self::LEVELS.into_iter()
    }

    pub(crate) fn from_u8(n: u8) -> Level {
        Self::LEVELS
            .get(n as usize)
            .copied()
            .unwrap_or(Level::Off)
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for level in Self::LEVELS {
            if s.eq_ignore_ascii_case(level.as_str()) {
                return Ok(level);
            }
        }

        Err(Error::new(format!("malformed level: {s:?}")))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}
