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

//! Central owner of all workers.
//!
//! A worker cannot safely free itself: the thread that would drop its own
//! backing object is the one still running it. So the registry defers every
//! reclamation to [`WorkerRegistry::maintain`], a single serialized sweep on
//! the thread that owns the registry, which is also the only place a
//! worker's deferred main-thread message is delivered.

use crate::worker::WorkerEntry;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use vigil_core::worker::{Worker, WorkerConfig, WorkerId, WorkerState};
use vigil_core::Identity;

/// Owns the worker collection, the registry-wide mutex, and id allocation.
pub struct WorkerRegistry {
    entries: Vec<WorkerEntry>,
    next_id: WorkerId,
    global: Arc<Mutex<()>>,
}

impl WorkerRegistry {
    /// Registry-assigned ids start here; anything below is reserved for
    /// application-pinned ids, so the two ranges never collide.
    pub const ID_SEED: WorkerId = 1000;

    /// How long the forced teardown tier waits for a cooperative exit
    /// before abandoning a worker's thread.
    const DESTROY_TIMEOUT: Duration = Duration::from_millis(500);

    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: Self::ID_SEED,
            global: Arc::new(Mutex::new(())),
        }
    }

    /// The registry-wide mutex, for a non-worker thread (the render owner)
    /// that must serialize against workers' global critical sections.
    pub fn global_mutex(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.global)
    }

    /// A fresh id, strictly increasing from [`Self::ID_SEED`].
    pub fn next_id(&mut self) -> WorkerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Registers `hooks` under `config` and spawns its execution thread.
    ///
    /// With `auto_start` the worker begins running immediately; without it
    /// the thread parks disabled until [`play`](Self::play). Returns the
    /// worker's id (pinned or assigned).
    pub fn add(
        &mut self,
        hooks: Arc<Mutex<dyn Worker>>,
        config: WorkerConfig,
        auto_start: bool,
    ) -> io::Result<WorkerId> {
        let id = match config.id {
            Some(pinned) => pinned,
            None => self.next_id(),
        };
        let mut ident = Identity::new(config.name.clone(), id);
        ident.pinned = config.pinned;

        let state = Arc::new(WorkerState::new(
            ident,
            &config,
            auto_start,
            Arc::clone(&self.global),
        ));
        let entry = WorkerEntry::spawn(hooks, state)?;
        log::info!(
            "registry: added worker '{}' (id {}, auto_start={})",
            config.name,
            id,
            auto_start
        );
        self.entries.push(entry);
        Ok(id)
    }

    /// First worker with the given name, if any.
    pub fn find(&self, name: &str) -> Option<&WorkerEntry> {
        self.entries.iter().find(|e| e.state().name() == name)
    }

    /// Resumes a paused worker. Silent no-op if the name is absent.
    pub fn play(&self, name: &str) {
        if let Some(entry) = self.find(name) {
            entry.state().set_enabled(true);
        }
    }

    /// Suspends a worker. Silent no-op if the name is absent.
    pub fn pause(&self, name: &str) {
        if let Some(entry) = self.find(name) {
            entry.state().set_enabled(false);
        }
    }

    /// Requests a cooperative stop: disables the worker, stops looping, and
    /// raises the stop flag. The worker exits on its own schedule and is
    /// reclaimed by a later maintenance pass. Silent no-op if absent.
    pub fn stop(&self, name: &str) {
        if let Some(entry) = self.find(name) {
            let state = entry.state();
            state.set_enabled(false);
            state.set_looping(false);
            state.request_stop();
        }
    }

    /// Evicts the first worker with the given name through the forced tier,
    /// unless it is pinned. Silent no-op if absent.
    pub fn remove(&mut self, name: &str) {
        let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.state().name() == name)
        else {
            return;
        };
        if self.entries[pos].state().ident().pinned {
            log::debug!("registry: worker '{name}' is pinned; not removed");
            return;
        }
        let mut entry = self.entries.remove(pos);
        entry.destroy(Self::DESTROY_TIMEOUT);
    }

    /// Tears down every worker through the forced tier (pinned or not) and
    /// clears the collection. Bounded: a worker that ignores its stop flag
    /// is abandoned after [`Self::DESTROY_TIMEOUT`].
    pub fn stop_all(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        log::info!("registry: stopping all {} workers", self.entries.len());
        // Raise every stop flag first so the workers wind down in parallel
        // instead of serially eating the timeout.
        for entry in &self.entries {
            entry.state().request_stop();
        }
        for entry in &mut self.entries {
            entry.destroy(Self::DESTROY_TIMEOUT);
        }
        self.entries.clear();
    }

    /// The per-tick maintenance pass; call once per outer-loop tick from
    /// the thread that owns the registry.
    ///
    /// For each worker: a pending message is delivered synchronously on
    /// this thread (the mechanism by which background work reaches
    /// main-thread-only resources), then a stopping worker whose thread has
    /// exited is joined and removed. Calling this repeatedly after a
    /// removal is idempotent.
    pub fn maintain(&mut self) {
        self.entries.retain_mut(|entry| {
            if entry.state().take_message() {
                entry
                    .hooks()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .message();
            }
            if entry.state().is_stopping() && entry.thread_finished() {
                entry.join();
                log::debug!(
                    "registry: reclaimed worker '{}' (id {})",
                    entry.state().name(),
                    entry.state().id()
                );
                false
            } else {
                true
            }
        });
    }

    /// Number of registered workers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no workers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
