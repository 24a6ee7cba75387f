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

use std::fmt::Write;

#[cfg(feature = "colored")]
use colored::Color;
#[cfg(feature = "colored")]
use colored::ColoredString;
#[cfg(feature = "colored")]
use colored::Colorize;

use crate::Error;
use crate::Level;
use crate::record::Record;

/// A layout that formats a record as one line of text, terminated by a newline.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR main.rs:51 Hello error!
/// 2024-08-11T22:44:57.172219+08:00  WARN main.rs:52 Hello warn!
/// 2024-08-11T22:44:57.172276+08:00  INFO main.rs:53 Hello info!
/// 2024-08-11T22:44:57.172329+08:00 DEBUG main.rs:54 Hello debug!
/// ```
///
/// With the `colored` feature enabled, levels are colored unless [`TextLayout::no_color`] is set.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextLayout {
    no_color: bool,
}

impl TextLayout {
    /// Disables colored levels. Files are always written without color.
    pub(crate) fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    pub(crate) fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let mut text = String::new();

        let time = record.time().strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let file = record.filename();
        let line = record.line();
        let message = record.payload();

        let written = if self.no_color {
            let level = record.level();
            write!(&mut text, "{time} {level:>5} {file}:{line} {message}")
        } else {
            let level = self.colored_level(record.level());
            write!(&mut text, "{time} {level:>5} {file}:{line} {message}")
        };
        written.map_err(Error::from_fmt_error)?;

        text.push('\n');
        Ok(text.into_bytes())
    }

    #[cfg(feature = "colored")]
    fn colored_level(&self, level: Level) -> ColoredString {
        let color = match level {
            Level::Fatal => Color::BrightRed,
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Green,
            Level::Debug => Color::Blue,
            Level::All | Level::Off => Color::Magenta,
        };
        ColoredString::from(level.as_str()).color(color)
    }

    #[cfg(not(feature = "colored"))]
    fn colored_level(&self, level: Level) -> Level {
        level
    }
}
