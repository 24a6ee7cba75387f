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

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use jiff::civil::Date;

/// The rotation bookkeeping of the active log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    /// The backup slot the active file was last rotated into, `0` before the first rotation.
    pub(crate) suffix: usize,
    /// The calendar day of the active file.
    pub(crate) day: Date,
}

/// The rotation policy of a rolling file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rotation {
    /// Never rotate; the active file grows unbounded.
    Never,
    /// Rotate once the active file reaches `max_file_size` bytes, cycling through backups
    /// `<name>.1` to `<name>.<max_backups>`.
    ///
    /// Size rotation is disabled when `max_backups <= 1`.
    Size {
        max_backups: usize,
        max_file_size: u64,
    },
    /// Rotate when the local calendar day changes, renaming the active file to
    /// `<name>.<YYYY-MM-DD>` of the day it was written.
    Daily,
}

/// What a due rotation must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RotationPlan {
    /// Delete `backup` if present, then move the active file into it.
    Cycle { suffix: usize, backup: PathBuf },
    /// Move the active file into `backup` unless it exists, then move the day marker to `today`.
    Dated { backup: PathBuf, today: Date },
}

impl Rotation {
    /// Whether the active file at `active` must be rotated before the next write.
    ///
    /// The size of the active file is read from the filesystem on every call.
    pub(crate) fn is_due(&self, active: &Path, cursor: &Cursor, today: Date) -> bool {
        match *self {
            Rotation::Never => false,
            Rotation::Size {
                max_backups,
                max_file_size,
            } => max_backups > 1 && file_size(active) >= max_file_size,
            Rotation::Daily => today > cursor.day,
        }
    }

    /// Compute the rotation to perform, or `None` if no rotation is due.
    pub(crate) fn plan(&self, active: &Path, cursor: &Cursor, today: Date) -> Option<RotationPlan> {
        if !self.is_due(active, cursor, today) {
            return None;
        }

        match *self {
            Rotation::Never => None,
            Rotation::Size { max_backups, .. } => {
                let suffix = next_suffix(cursor.suffix, max_backups);
                Some(RotationPlan::Cycle {
                    suffix,
                    backup: backup_path(active, suffix),
                })
            }
            Rotation::Daily => Some(RotationPlan::Dated {
                backup: dated_path(active, cursor.day),
                today,
            }),
        }
    }

    /// The highest suffix `i` such that the backups `1..=i` all exist.
    pub(crate) fn discover_suffix(&self, active: &Path) -> usize {
        let Rotation::Size { max_backups, .. } = *self else {
            return 0;
        };

        let mut suffix = 0;
        for i in 1..=max_backups {
            if !fs::exists(backup_path(active, i)).unwrap_or(false) {
                break;
            }
            suffix = i;
        }
        suffix
    }
}

pub(crate) fn next_suffix(current: usize, max_backups: usize) -> usize {
    current % max_backups + 1
}

pub(crate) fn backup_path(active: &Path, suffix: usize) -> PathBuf {
    with_extension(active, &suffix.to_string())
}

pub(crate) fn dated_path(active: &Path, day: Date) -> PathBuf {
    with_extension(active, &day.strftime("%Y-%m-%d").to_string())
}

fn with_extension(active: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(active.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
