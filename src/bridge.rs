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

//! Bridge the [`log`] crate facade to a [`Logger`].

use std::sync::Arc;

use crate::Error;
use crate::Logger;

#[derive(Debug)]
struct LogCrateLogger(Arc<Logger>);

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.0.level().enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        self.0.dispatch(
            record.level().into(),
            record.file().unwrap_or_default(),
            record.line().unwrap_or_default(),
            *record.args(),
        );
    }

    fn flush(&self) {
        self.0.flush();
    }
}

/// Install `logger` as the global logger of the [`log`] crate.
///
/// Records logged with `log::info!` and friends are then filtered and written by `logger`;
/// `log::Level::Trace` is treated as [`Level::Debug`](crate::Level::Debug). The caller keeps
/// the `Arc` to change the level or console output at runtime.
///
/// # Errors
///
/// Return an error if a global logger has already been set.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// let logger = Arc::new(rotalog::Logger::console());
/// rotalog::setup_log_crate(logger.clone()).unwrap();
///
/// log::info!("This goes through rotalog.");
/// ```
pub fn setup_log_crate(logger: Arc<Logger>) -> Result<(), Error> {
    log::set_boxed_logger(Box::new(LogCrateLogger(logger)))
        .map_err(|err| Error::new("failed to set up log crate").with_source(err))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
