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

use jiff::Zoned;

use crate::Level;

/// A log record, alive for the duration of one logging call.
#[derive(Clone, Debug)]
pub(crate) struct Record<'a> {
    level: Level,
    file: &'a str,
    line: u32,
    payload: fmt::Arguments<'a>,
    time: Zoned,
}

impl<'a> Record<'a> {
    pub(crate) fn new(
        level: Level,
        file: &'a str,
        line: u32,
        payload: fmt::Arguments<'a>,
        time: Zoned,
    ) -> Self {
        Self {
            level,
            file,
            line,
            payload,
            time,
        }
    }

    pub(crate) fn level(&self) -> Level {
        self.level
    }

    /// The final path component of the caller's source file.
    pub(crate) fn filename(&self) -> &'a str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("<unknown>")
    }

    pub(crate) fn line(&self) -> u32 {
        self.line
    }

    pub(crate) fn payload(&self) -> fmt::Arguments<'a> {
        self.payload
    }

    pub(crate) fn time(&self) -> &Zoned {
        &self.time
    }
}
