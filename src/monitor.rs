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
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::select;
use crossbeam_channel::tick;

use crate::Error;
use crate::Trap;
use crate::logger::panic_message;
use crate::rolling::RollingFile;

/// A guard for the thread that checks a rolling file for due rotations on a fixed interval.
///
/// Dropping the guard stops the thread and waits for it to exit. If the thread died from a
/// panic, the panic is reported to the trap.
#[derive(Debug)]
pub(crate) struct Monitor {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    trap: Arc<dyn Trap>,
}

impl Monitor {
    pub(crate) fn spawn(
        file: Arc<RollingFile>,
        interval: Duration,
        trap: Arc<dyn Trap>,
    ) -> Result<Monitor, Error> {
        let (shutdown, stopped) = bounded::<()>(0);
        let ticker = tick(interval);

        let handle = std::thread::Builder::new()
            .name("rotalog-monitor".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            file.check_rotation();
                        }
                        // disconnected once the guard is dropped
                        recv(stopped) -> _ => break,
                    }
                }
            })
            .map_err(|err| Error::new("failed to spawn rotation monitor").with_source(err))?;

        Ok(Monitor {
            shutdown: Some(shutdown),
            handle: Some(handle),
            trap,
        })
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        drop(self.shutdown.take());
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                let err = Error::new("rotation monitor panicked")
                    .with_context("panic", panic_message(payload.as_ref()));
                self.trap.trap(&err);
            }
        }
    }
}
