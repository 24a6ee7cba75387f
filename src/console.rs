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

use std::io::Write;

use crate::Error;
use crate::layout::TextLayout;
use crate::record::Record;

/// Prints records to standard output.
#[derive(Debug, Default)]
pub(crate) struct Console {
    layout: TextLayout,
    #[cfg(test)]
    closed: bool,
}

impl Console {
    /// A console whose output stream is gone, so every write fails.
    #[cfg(test)]
    pub(crate) fn closed() -> Console {
        Console {
            layout: TextLayout::default(),
            closed: true,
        }
    }

    pub(crate) fn write(&self, record: &Record) -> Result<(), Error> {
        let bytes = self.layout.format(record)?;

        #[cfg(test)]
        if self.closed {
            let err = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
            return Err(Error::from_io_error(err));
        }

        std::io::stdout()
            .lock()
            .write_all(&bytes)
            .map_err(Error::from_io_error)
    }

    pub(crate) fn flush(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)
    }
}
