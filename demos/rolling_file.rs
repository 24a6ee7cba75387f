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

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rotalog::Level;
use rotalog::Logger;

fn log_all_levels(logger: &Logger, i: usize) {
    rotalog::debug!(logger; "Debug>>>>>>>>>>>>>>>>>>>>>>", i);
    rotalog::debug!(logger, "Debug>>>>>>>>>>>>>>>>>>>>>>{} {i}", "format test");
    rotalog::info!(logger; "Info>>>>>>>>>>>>>>>>>>>>>>>>", i);
    rotalog::warn!(logger; "Warn>>>>>>>>>>>>>>>>>>>>>>>>", i);
    rotalog::error!(logger; "Error>>>>>>>>>>>>>>>>>>>>>>>", i);
    rotalog::fatal!(logger; "Fatal>>>>>>>>>>>>>>>>>>>>>>>", i);
}

fn main() {
    let console = Arc::new(Logger::console());

    let rolling = Logger::rolling_size("logs/rolling_file", "test.log", 10, 5 * rotalog::KB)
        .map(Arc::new)
        .unwrap();
    rolling.set_level(Level::Debug);
    rolling.set_console(false);

    let daily = Logger::rolling_daily("logs/rolling_daily", "test.log")
        .map(Arc::new)
        .unwrap();
    daily.set_console(false);

    let mut handles = vec![];
    for logger in [console, rolling, daily] {
        handles.push(thread::spawn(move || {
            for i in (1..=20).rev() {
                let logger = logger.clone();
                thread::spawn(move || log_all_levels(&logger, i));
                thread::sleep(Duration::from_millis(100));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    thread::sleep(Duration::from_millis(100));
}
