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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use jiff::Zoned;
use jiff::civil::Date;

use crate::Error;
use crate::Trap;
use crate::clock::Clock;
use crate::rotation::Cursor;
use crate::rotation::Rotation;
use crate::rotation::RotationPlan;
use crate::trap::DefaultTrap;

/// An append-only log file that rotates itself according to a [`Rotation`] policy.
///
/// Writers share the active handle under the read lock; a rotation takes the write lock, so no
/// write interleaves with the swap of handles and no two rotations run at once.
#[derive(Debug)]
pub(crate) struct RollingFile {
    path: PathBuf,
    rotation: Rotation,
    clock: Clock,
    trap: Arc<dyn Trap>,
    state: RwLock<State>,
}

#[derive(Debug)]
struct State {
    writer: Option<File>,
    cursor: Cursor,
}

impl RollingFile {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Append one formatted line to the active file, rotating first if a rotation is due.
    pub(crate) fn write(&self, line: &[u8]) -> Result<(), Error> {
        self.check_rotation();

        let state = self.read_state();
        match state.writer.as_ref() {
            Some(mut file) => file
                .write_all(line)
                .map_err(|err| Error::io("failed to write log file", &self.path, err)),
            None => Err(Error::new("no log file is open").with_context("path", self.path.display())),
        }
    }

    pub(crate) fn flush(&self) -> Result<(), Error> {
        let state = self.read_state();
        if let Some(mut file) = state.writer.as_ref() {
            file.flush()
                .map_err(|err| Error::io("failed to flush log file", &self.path, err))?;
        }
        Ok(())
    }

    /// Rotate the active file if the policy says so. Return whether a rotation happened.
    ///
    /// The policy is consulted once under the read lock, and again under the write lock before
    /// anything on disk is touched. Rotation failures go to the trap.
    pub(crate) fn check_rotation(&self) -> bool {
        let today = self.today();
        let due = {
            let state = self.read_state();
            self.rotation.is_due(&self.path, &state.cursor, today)
        };
        if !due {
            return false;
        }

        let mut state = self.write_state();
        let today = self.today();
        let Some(plan) = self.rotation.plan(&self.path, &state.cursor, today) else {
            return false;
        };

        let rotated = self.rotate(&mut state, plan);
        // the trap may log back into this file
        drop(state);

        match rotated {
            Ok(()) => true,
            Err(err) => {
                self.trap.trap(&err);
                false
            }
        }
    }

    fn rotate(&self, state: &mut State, plan: RotationPlan) -> Result<(), Error> {
        match plan {
            RotationPlan::Cycle { suffix, backup } => {
                if fs::exists(&backup).unwrap_or(false) {
                    fs::remove_file(&backup)
                        .map_err(|err| Error::io("failed to remove oldest log file", &backup, err))?;
                }
                self.swap(state, &backup)?;
                state.cursor.suffix = suffix;
                Ok(())
            }
            RotationPlan::Dated { backup, today } => {
                // move on even if the rename fails, so the check is not repeated on every write
                state.cursor.day = today;
                if fs::exists(&backup).unwrap_or(false) {
                    return Err(Error::new("dated log file already exists, skip rotation")
                        .with_context("path", self.path.display())
                        .with_context("backup", backup.display()));
                }
                self.swap(state, &backup)
            }
        }
    }

    /// Close the active file, move it to `backup` and open a fresh active file.
    ///
    /// On failure the writer is left on whichever file still holds the log: the un-renamed active
    /// file if the rename failed, or the renamed backup if the fresh file could not be created.
    fn swap(&self, state: &mut State, backup: &Path) -> Result<(), Error> {
        drop(state.writer.take());

        if let Err(err) = fs::rename(&self.path, backup) {
            state.writer = open_append(&self.path).ok();
            return Err(Error::io("failed to rename log file", &self.path, err)
                .with_context("backup", backup.display()));
        }

        match open_append(&self.path) {
            Ok(file) => {
                state.writer = Some(file);
                Ok(())
            }
            Err(err) => {
                state.writer = open_append(backup).ok();
                Err(Error::io("failed to create log file", &self.path, err))
            }
        }
    }

    fn today(&self) -> Date {
        self.clock.now().date()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn cursor(&self) -> Cursor {
        self.read_state().cursor
    }
}

/// A builder for configuring [`RollingFile`].
#[derive(Debug)]
pub(crate) struct RollingFileBuilder {
    // required
    basedir: PathBuf,
    filename: String,

    // has default
    rotation: Rotation,
    clock: Clock,
    trap: Arc<dyn Trap>,
}

impl RollingFileBuilder {
    pub(crate) fn new(basedir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            filename: filename.into(),
            rotation: Rotation::Never,
            clock: Clock::DefaultClock,
            trap: Arc::new(DefaultTrap::default()),
        }
    }

    pub(crate) fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub(crate) fn trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = trap;
        self
    }

    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Create the log directory, open the active file and rotate it right away if it is
    /// already due.
    pub(crate) fn build(self) -> Result<RollingFile, Error> {
        let Self {
            basedir,
            filename,
            rotation,
            clock,
            trap,
        } = self;

        if filename.is_empty() {
            return Err(Error::new("filename must not be empty"));
        }

        fs::create_dir_all(&basedir)
            .map_err(|err| Error::io("failed to create log directory", &basedir, err))?;

        let path = basedir.join(filename);
        let today = clock.now().date();
        let cursor = Cursor {
            suffix: rotation.discover_suffix(&path),
            day: last_written_day(&path).map_or(today, |day| day.min(today)),
        };
        let writer = open_append(&path)
            .map_err(|err| Error::io("failed to open log file", &path, err))?;

        let file = RollingFile {
            path,
            rotation,
            clock,
            trap,
            state: RwLock::new(State {
                writer: Some(writer),
                cursor,
            }),
        };
        file.check_rotation();
        Ok(file)
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().append(true).create(true).open(path)
}

/// The local calendar day an existing, non-empty log file was last written.
fn last_written_day(path: &Path) -> Option<Date> {
    let metadata = fs::metadata(path).ok()?;
    if metadata.len() == 0 {
        return None;
    }
    let mtime = metadata.modified().ok()?;
    Zoned::try_from(mtime).ok().map(|zoned| zoned.date())
}

#[cfg(test)]
mod tests {
    use std::fs::FileTimes;
    use std::str::FromStr;
    use std::sync::Mutex;
    use std::time::Duration;
    use std::time::SystemTime;

    use jiff::civil::date;
    use rand::Rng;
    use rand::distr::Alphanumeric;
    use tempfile::TempDir;

    use super::*;
    use crate::clock::ManualClock;
    use crate::rotation::backup_path;
    use crate::rotation::dated_path;
    use crate::trap::testing::CollectingTrap;

    fn line(len: usize) -> Vec<u8> {
        let mut bytes = vec![b'x'; len - 1];
        bytes.push(b'\n');
        bytes
    }

    fn count_backups(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("app.log."))
            .count()
    }

    fn dir_listing(dir: &Path) -> Vec<(String, u64)> {
        let mut files = fs::read_dir(dir)
            .unwrap()
            .map(|entry| {
                let entry = entry.unwrap();
                let name = entry.file_name().to_string_lossy().into_owned();
                (name, entry.metadata().unwrap().len())
            })
            .collect::<Vec<_>>();
        files.sort();
        files
    }

    #[test]
    fn test_size_rotation_cycles_through_backups() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let max_backups = 3;
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups,
                max_file_size: 100,
            })
            .build()
            .unwrap();

        let chunk = line(50);
        file.write(&chunk).unwrap();
        file.write(&chunk).unwrap();
        assert_eq!(count_backups(temp_dir.path()), 0);

        for k in 1..=(max_backups * 3) {
            // the active file holds 100 bytes, this write rotates it first
            file.write(&chunk).unwrap();
            assert_eq!(file.cursor().suffix, (k - 1) % max_backups + 1);
            assert_eq!(count_backups(temp_dir.path()), k.min(max_backups));

            let backup = backup_path(file.path(), file.cursor().suffix);
            assert_eq!(fs::metadata(&backup).unwrap().len(), 100);
            assert_eq!(fs::metadata(file.path()).unwrap().len(), 50);

            file.write(&chunk).unwrap();
        }
    }

    #[test]
    fn test_size_rotation_disabled_with_single_backup() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups: 1,
                max_file_size: 64,
            })
            .build()
            .unwrap();

        let mut written = 0;
        for _ in 0..100 {
            let len = rand::rng().random_range(10..=60);
            file.write(&line(len)).unwrap();
            written += len as u64;
        }

        assert_eq!(count_backups(temp_dir.path()), 0);
        assert_eq!(fs::metadata(file.path()).unwrap().len(), written);
    }

    #[test]
    fn test_check_rotation_is_idempotent_when_not_due() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups: 3,
                max_file_size: 1024,
            })
            .build()
            .unwrap();
        file.write(&line(100)).unwrap();

        let before = dir_listing(temp_dir.path());
        let cursor = file.cursor();
        for _ in 0..3 {
            assert!(!file.check_rotation());
        }
        assert_eq!(dir_listing(temp_dir.path()), before);
        assert_eq!(file.cursor(), cursor);
    }

    #[test]
    fn test_oversized_file_rotates_on_build() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let active = temp_dir.path().join("app.log");
        fs::write(&active, line(200)).unwrap();

        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups: 3,
                max_file_size: 100,
            })
            .build()
            .unwrap();

        assert_eq!(file.cursor().suffix, 1);
        assert_eq!(fs::read(backup_path(&active, 1)).unwrap(), line(200));
        assert_eq!(fs::metadata(&active).unwrap().len(), 0);

        file.write(b"first\n").unwrap();
        assert_eq!(fs::read(&active).unwrap(), b"first\n");
    }

    #[test]
    fn test_existing_backups_resume_cycle() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let active = temp_dir.path().join("app.log");
        fs::write(backup_path(&active, 1), b"one\n").unwrap();
        fs::write(backup_path(&active, 2), b"two\n").unwrap();

        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups: 3,
                max_file_size: 10,
            })
            .build()
            .unwrap();
        assert_eq!(file.cursor().suffix, 2);

        file.write(&line(10)).unwrap();
        file.write(&line(10)).unwrap();
        assert_eq!(file.cursor().suffix, 3);
        assert_eq!(fs::read(backup_path(&active, 3)).unwrap(), line(10));
        assert_eq!(fs::read(backup_path(&active, 1)).unwrap(), b"one\n");

        // the oldest backup is replaced next
        file.write(&line(10)).unwrap();
        assert_eq!(file.cursor().suffix, 1);
        assert_eq!(fs::read(backup_path(&active, 1)).unwrap(), line(10));
    }

    #[test]
    fn test_daily_rotation_at_midnight() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let clock = ManualClock::new(Zoned::from_str("2024-08-10T23:59:00[UTC]").unwrap());
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Daily)
            .clock(Clock::ManualClock(clock.clone()))
            .build()
            .unwrap();

        file.write(b"before midnight\n").unwrap();
        assert!(!file.check_rotation());

        clock.set_now(Zoned::from_str("2024-08-11T00:00:01[UTC]").unwrap());
        assert!(file.check_rotation());

        let backup = dated_path(file.path(), date(2024, 8, 10));
        assert_eq!(fs::read(&backup).unwrap(), b"before midnight\n");
        assert_eq!(fs::metadata(file.path()).unwrap().len(), 0);
        assert_eq!(file.cursor().day, date(2024, 8, 11));
        assert_eq!(count_backups(temp_dir.path()), 1);

        // nothing more to do on the same day
        let before = dir_listing(temp_dir.path());
        assert!(!file.check_rotation());
        assert_eq!(dir_listing(temp_dir.path()), before);
    }

    #[test]
    fn test_daily_rotation_happens_before_write() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let clock = ManualClock::new(Zoned::from_str("2024-08-10T12:00:00[UTC]").unwrap());
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Daily)
            .clock(Clock::ManualClock(clock.clone()))
            .build()
            .unwrap();

        file.write(b"day one\n").unwrap();
        clock.set_now(Zoned::from_str("2024-08-12T08:00:00[UTC]").unwrap());
        file.write(b"day three\n").unwrap();

        let backup = dated_path(file.path(), date(2024, 8, 10));
        assert_eq!(fs::read(&backup).unwrap(), b"day one\n");
        assert_eq!(fs::read(file.path()).unwrap(), b"day three\n");
        assert_eq!(file.cursor().day, date(2024, 8, 12));
    }

    #[test]
    fn test_daily_rotation_skips_existing_backup() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let active = temp_dir.path().join("app.log");
        let backup = dated_path(&active, date(2024, 8, 10));
        fs::write(&backup, b"kept\n").unwrap();

        let trap = CollectingTrap::default();
        let clock = ManualClock::new(Zoned::from_str("2024-08-10T12:00:00[UTC]").unwrap());
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Daily)
            .clock(Clock::ManualClock(clock.clone()))
            .trap(Arc::new(trap.clone()))
            .build()
            .unwrap();

        file.write(b"day one\n").unwrap();
        clock.set_now(Zoned::from_str("2024-08-11T00:00:00[UTC]").unwrap());
        file.write(b"day two\n").unwrap();

        assert_eq!(fs::read(&backup).unwrap(), b"kept\n");
        assert_eq!(fs::read(&active).unwrap(), b"day one\nday two\n");
        assert_eq!(file.cursor().day, date(2024, 8, 11));

        let errors = trap.errors();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].starts_with("dated log file already exists"));
    }

    #[test]
    fn test_stale_file_is_dated_on_build() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let active = temp_dir.path().join("app.log");
        fs::write(&active, b"from the day before yesterday\n").unwrap();

        let modified = SystemTime::now() - Duration::from_secs(2 * 24 * 60 * 60);
        File::options()
            .write(true)
            .open(&active)
            .unwrap()
            .set_times(FileTimes::new().set_modified(modified))
            .unwrap();
        let last_day = Zoned::try_from(modified).unwrap().date();

        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Daily)
            .build()
            .unwrap();

        let backup = dated_path(&active, last_day);
        assert_eq!(
            fs::read(&backup).unwrap(),
            b"from the day before yesterday\n"
        );
        assert_eq!(fs::metadata(&active).unwrap().len(), 0);
        assert_eq!(file.cursor().day, Zoned::now().date());
    }

    #[test]
    fn test_failed_rotation_keeps_writing_to_active_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let active = temp_dir.path().join("app.log");
        fs::write(backup_path(&active, 1), b"one\n").unwrap();

        let trap = CollectingTrap::default();
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups: 2,
                max_file_size: 10,
            })
            .trap(Arc::new(trap.clone()))
            .build()
            .unwrap();
        assert_eq!(file.cursor().suffix, 1);

        // the next slot cannot be removed, so every rotation fails
        let blocked = backup_path(&active, 2);
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), b"").unwrap();

        let chunk = line(11);
        for _ in 0..4 {
            file.write(&chunk).unwrap();
        }

        assert_eq!(fs::read(&active).unwrap(), chunk.repeat(4));
        assert_eq!(fs::read(backup_path(&active, 1)).unwrap(), b"one\n");
        assert_eq!(file.cursor().suffix, 1);

        let errors = trap.errors();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(
            errors
                .iter()
                .all(|err| err.starts_with("failed to remove oldest log file"))
        );
    }

    /// Writes into the rolling file it guards, the first time it is called.
    #[derive(Debug, Default)]
    struct ReentrantTrap {
        file: Mutex<Option<Arc<RollingFile>>>,
        errors: CollectingTrap,
    }

    impl Trap for ReentrantTrap {
        fn trap(&self, err: &Error) {
            self.errors.trap(err);
            let file = self.file.lock().unwrap().take();
            if let Some(file) = file {
                file.write(b"trapped\n").unwrap();
            }
        }
    }

    #[test]
    fn test_trap_can_write_to_rotating_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let active = temp_dir.path().join("app.log");
        fs::write(backup_path(&active, 1), b"one\n").unwrap();

        let trap = Arc::new(ReentrantTrap::default());
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups: 2,
                max_file_size: 10,
            })
            .trap(trap.clone())
            .build()
            .unwrap();
        let file = Arc::new(file);
        *trap.file.lock().unwrap() = Some(file.clone());
        fs::create_dir(backup_path(&active, 2)).unwrap();

        file.write(&line(11)).unwrap();
        assert!(!file.check_rotation());

        // the nested write retries the rotation once more before appending
        let mut expected = line(11);
        expected.extend_from_slice(b"trapped\n");
        assert_eq!(fs::read(&active).unwrap(), expected);
        assert_eq!(trap.errors.errors().len(), 2);
    }

    #[test]
    fn test_random_lines_survive_rotation() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = RollingFileBuilder::new(temp_dir.path(), "app.log")
            .rotation(Rotation::Size {
                max_backups: 100,
                max_file_size: 500,
            })
            .build()
            .unwrap();

        let mut expected = vec![];
        for _ in 0..200 {
            let len = rand::rng().random_range(20..=80);
            let text: String = rand::rng()
                .sample_iter(Alphanumeric)
                .map(char::from)
                .take(len)
                .collect();
            file.write(format!("{text}\n").as_bytes()).unwrap();
            expected.push(text);
        }

        let mut actual = vec![];
        for suffix in 1..=file.cursor().suffix {
            let content = fs::read_to_string(backup_path(file.path(), suffix)).unwrap();
            actual.extend(content.lines().map(String::from));
        }
        let content = fs::read_to_string(file.path()).unwrap();
        actual.extend(content.lines().map(String::from));

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_empty_filename_is_rejected() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let err = RollingFileBuilder::new(temp_dir.path(), "")
            .build()
            .unwrap_err();
        assert_eq!(err.message(), "filename must not be empty");
    }
}
