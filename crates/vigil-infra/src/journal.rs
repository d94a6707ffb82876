// Copyright 2025 eraflo
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

//! The engine journal: an application log file written off the hot path.
//!
//! Producers call [`Journal::write`] from any thread; lines go onto a
//! bounded queue and are mirrored to the `log` facade immediately. A
//! background [`JournalWorker`] drains the queue and appends complete lines
//! to the journal file through the file service, so no caller ever blocks
//! on disk.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use vigil_core::fs::FileService;
use vigil_core::worker::{Worker, WorkerConfig, WorkerContext};

/// Severity of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalLevel {
    /// Developer chatter.
    Debug,
    /// Normal progress messages.
    Message,
    /// Something odd but survivable.
    Warning,
    /// An operation failed.
    Error,
    /// The engine cannot continue.
    Critical,
}

impl fmt::Display for JournalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JournalLevel::Debug => "debug",
            JournalLevel::Message => "message",
            JournalLevel::Warning => "warning",
            JournalLevel::Error => "error",
            JournalLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
struct JournalLine {
    level: JournalLevel,
    text: String,
}

/// Cloneable producer handle to the journal.
#[derive(Debug, Clone)]
pub struct Journal {
    sender: Sender<JournalLine>,
}

impl Journal {
    /// Queues a line for the journal file and mirrors it to the `log`
    /// facade. If the queue is full the line still reaches the facade but
    /// is dropped from the file.
    pub fn write(&self, level: JournalLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            JournalLevel::Debug => log::debug!("{text}"),
            JournalLevel::Message => log::info!("{text}"),
            JournalLevel::Warning => log::warn!("{text}"),
            JournalLevel::Error | JournalLevel::Critical => log::error!("{text}"),
        }
        match self.sender.try_send(JournalLine { level, text }) {
            Ok(()) => {}
            Err(TrySendError::Full(line)) => {
                log::warn!("journal queue full; dropped line: {}", line.text);
            }
            Err(TrySendError::Disconnected(_)) => {
                // Journal worker already gone; the facade copy above is all
                // that survives.
            }
        }
    }
}

/// The worker that owns the journal file.
pub struct JournalWorker {
    receiver: Receiver<JournalLine>,
    files: Arc<dyn FileService>,
    file_name: String,
}

impl JournalWorker {
    /// The journal worker's well-known name.
    pub const NAME: &'static str = "journal";
    /// Pinned id, below the registry's assignment seed.
    pub const ID: u64 = 0;

    /// Creates the producer handle and the worker, truncating any previous
    /// journal file of the same name.
    pub fn create(
        files: Arc<dyn FileService>,
        file_name: impl Into<String>,
        capacity: usize,
    ) -> io::Result<(Journal, JournalWorker)> {
        let file_name = file_name.into();
        files.write(&file_name, b"")?;
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Ok((
            Journal { sender },
            JournalWorker {
                receiver,
                files,
                file_name,
            },
        ))
    }

    /// The registration this worker always uses: pinned, looping, relaxed
    /// poll interval.
    pub fn config() -> WorkerConfig {
        WorkerConfig::new(Self::NAME)
            .with_id(Self::ID)
            .pinned()
            .looping()
            .with_update_time(Duration::from_millis(10))
    }

    fn drain(&mut self) -> usize {
        let mut written = 0;
        while let Ok(line) = self.receiver.try_recv() {
            let rendered = format!("[{}] {}\n", line.level, line.text);
            if let Err(e) = self.files.append(&self.file_name, rendered.as_bytes()) {
                log::error!("journal write to '{}' failed: {e}", self.file_name);
            }
            written += 1;
        }
        written
    }
}

impl Worker for JournalWorker {
    fn work(&mut self, ctx: &WorkerContext) {
        if self.drain() == 0 {
            ctx.sleep(Duration::from_millis(10));
        }
    }

    fn end_work(&mut self, _ctx: &WorkerContext) {
        // Flush whatever producers managed to queue before the stop.
        let flushed = self.drain();
        if flushed > 0 {
            log::debug!("journal flushed {flushed} lines at shutdown");
        }
    }
}
