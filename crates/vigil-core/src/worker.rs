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

//! Worker contracts: the hooks a unit of background work implements and the
//! shared flag block its execution thread is driven by.
//!
//! A worker is a unit of repeatable work bound to one OS thread. The thread
//! body itself lives in `vigil-control`; this module defines everything both
//! sides of the thread boundary agree on: the [`Worker`] hook trait, the
//! [`WorkerState`] flag block, and the [`WorkerContext`] handed to hooks.

use crate::ident::Identity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Numeric worker id. Registry-assigned ids start at the registry's seed;
/// anything below it is reserved for application-pinned ids.
pub type WorkerId = u64;

/// The overridable hooks of a worker.
///
/// `work` runs repeatedly on the worker's own thread while the worker is
/// enabled; `end_work` runs exactly once when the thread winds down.
/// `message` is never invoked by the worker itself, only by the registry's
/// maintenance pass, on the thread that calls maintenance, after the worker
/// has raised its needs-message flag via [`WorkerContext::request_message`].
pub trait Worker: Send + 'static {
    /// The action repeatedly executed on the worker's thread.
    ///
    /// The default is a cooperative no-op that yields briefly.
    fn work(&mut self, ctx: &WorkerContext) {
        ctx.sleep(Duration::from_millis(1));
    }

    /// Runs exactly once when the worker's thread winds down cooperatively.
    fn end_work(&mut self, _ctx: &WorkerContext) {}

    /// Deferred main-thread callback, delivered by the maintenance pass.
    fn message(&mut self) {}
}

/// Construction parameters for a worker registration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Lookup name within the registry. Collisions are not rejected; only the
    /// first-inserted match is reachable by name.
    pub name: String,
    /// Pinned id. When absent the registry assigns the next free id.
    pub id: Option<WorkerId>,
    /// A pinned worker is not removable by name-based eviction.
    pub pinned: bool,
    /// Repeat `work` indefinitely instead of running it once.
    pub looping: bool,
    /// Poll interval while disabled; also bounds the wake latency if a
    /// condvar signal is missed.
    pub update_time: Duration,
}

impl WorkerConfig {
    /// A one-shot, unpinned worker with a 1 ms idle poll interval.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            pinned: false,
            looping: false,
            update_time: Duration::from_millis(1),
        }
    }

    /// Pins the worker to an application-chosen id.
    pub fn with_id(mut self, id: WorkerId) -> Self {
        self.id = Some(id);
        self
    }

    /// Protects the worker from name-based eviction.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Repeats `work` until a stop is requested.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Sets the disabled-poll interval.
    pub fn with_update_time(mut self, update_time: Duration) -> Self {
        self.update_time = update_time;
        self
    }
}

#[derive(Debug)]
struct WorkerFlags {
    enabled: bool,
    looping: bool,
    stopping: bool,
    needs_message: bool,
}

/// The flag block shared between a worker's thread, the registry, and any
/// other owner of a handle to the worker.
///
/// All flags live behind one private mutex; enable and stop transitions
/// signal a condvar so a parked thread wakes immediately instead of waiting
/// out its poll interval. Once `stopping` is set it never clears: a stopped
/// worker is only ever reclaimed, never restarted.
#[derive(Debug)]
pub struct WorkerState {
    ident: Identity,
    update_time: Duration,
    flags: Mutex<WorkerFlags>,
    wake: Condvar,
    finished: AtomicBool,
    global: Arc<Mutex<()>>,
}

impl WorkerState {
    /// Creates the shared state for a worker registration.
    ///
    /// `global` is the registry-wide mutex every worker of one registry
    /// shares for explicit cross-worker critical sections.
    pub fn new(
        ident: Identity,
        config: &WorkerConfig,
        enabled: bool,
        global: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            ident,
            update_time: config.update_time,
            flags: Mutex::new(WorkerFlags {
                enabled,
                looping: config.looping,
                stopping: false,
                needs_message: false,
            }),
            wake: Condvar::new(),
            finished: AtomicBool::new(false),
            global,
        }
    }

    fn flags(&self) -> MutexGuard<'_, WorkerFlags> {
        // Nothing user-provided ever runs under this lock, so it cannot be
        // poisoned in practice; recover the guard rather than cascade.
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The worker's identity (name, id, pinned flag).
    pub fn ident(&self) -> &Identity {
        &self.ident
    }

    /// The worker's lookup name.
    pub fn name(&self) -> &str {
        &self.ident.name
    }

    /// The worker's numeric id.
    pub fn id(&self) -> WorkerId {
        self.ident.id
    }

    /// Poll interval while disabled.
    pub fn update_time(&self) -> Duration {
        self.update_time
    }

    /// Allows or suspends execution of `work`. Takes effect on the worker's
    /// next loop iteration, not synchronously.
    pub fn set_enabled(&self, enabled: bool) {
        self.flags().enabled = enabled;
        self.wake.notify_all();
    }

    /// Switches between one-shot and repeating execution. Takes effect on
    /// the next loop iteration.
    pub fn set_looping(&self, looping: bool) {
        self.flags().looping = looping;
    }

    /// Requests a cooperative stop. Terminal: once set it never clears.
    pub fn request_stop(&self) {
        self.flags().stopping = true;
        self.wake.notify_all();
    }

    /// Whether execution of `work` is currently allowed.
    pub fn is_enabled(&self) -> bool {
        self.flags().enabled
    }

    /// Whether `work` repeats indefinitely.
    pub fn is_looping(&self) -> bool {
        self.flags().looping
    }

    /// Whether a stop has been requested.
    pub fn is_stopping(&self) -> bool {
        self.flags().stopping
    }

    /// Raises the needs-message flag; the registry's next maintenance pass
    /// will invoke the worker's `message` hook on the maintaining thread.
    pub fn request_message(&self) {
        self.flags().needs_message = true;
    }

    /// Whether a message delivery is pending.
    pub fn needs_message(&self) -> bool {
        self.flags().needs_message
    }

    /// Clears and returns the needs-message flag. Called by the maintenance
    /// pass so each request is delivered exactly once.
    pub fn take_message(&self) -> bool {
        let mut flags = self.flags();
        std::mem::replace(&mut flags.needs_message, false)
    }

    /// Records that the worker's thread body has returned.
    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Whether the worker's thread body has returned.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Parks until the worker is enabled, waking at most `update_time` after
    /// each enable/stop transition.
    ///
    /// Returns `false` if a stop was observed while disabled; the caller must
    /// then wind down without running `work` again.
    pub fn await_enabled(&self) -> bool {
        let mut flags = self.flags();
        loop {
            if flags.stopping {
                return false;
            }
            if flags.enabled {
                return true;
            }
            let (guard, _) = self
                .wake
                .wait_timeout(flags, self.update_time)
                .unwrap_or_else(PoisonError::into_inner);
            flags = guard;
        }
    }

    /// Acquires the registry-wide mutex for a cross-worker critical section.
    ///
    /// Exactly one worker holds this lock at a time. Re-entrant acquisition
    /// from the same thread deadlocks; that is a documented precondition on
    /// callers, not a runtime check. The guard releases on drop, so the lock
    /// can never be left held across the worker's own park/sleep points.
    pub fn global_lock(&self) -> MutexGuard<'_, ()> {
        // The payload is (), so a panic inside someone else's critical
        // section leaves nothing to repair; recover the guard.
        self.global.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle passed to worker hooks, giving a worker access to its own flags
/// and to the registry-wide lock without reaching into any global.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    state: Arc<WorkerState>,
}

impl WorkerContext {
    /// Wraps the shared state of one worker.
    pub fn new(state: Arc<WorkerState>) -> Self {
        Self { state }
    }

    /// The underlying shared state.
    pub fn state(&self) -> &WorkerState {
        &self.state
    }

    /// The worker's lookup name.
    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// The worker's numeric id.
    pub fn id(&self) -> WorkerId {
        self.state.id()
    }

    /// Whether a stop has been requested. Long-running `work` bodies should
    /// poll this; the framework imposes no other cancellation.
    pub fn stopping(&self) -> bool {
        self.state.is_stopping()
    }

    /// Requests a cooperative stop of this worker.
    pub fn request_stop(&self) {
        self.state.request_stop();
    }

    /// Asks the registry to invoke this worker's `message` hook on the
    /// maintenance thread. The mechanism by which background work safely
    /// reaches resources owned by the main thread.
    pub fn request_message(&self) {
        self.state.request_message();
    }

    /// Acquires the registry-wide mutex. See [`WorkerState::global_lock`].
    pub fn global_lock(&self) -> MutexGuard<'_, ()> {
        self.state.global_lock()
    }

    /// Puts the worker's thread to sleep.
    pub fn sleep(&self, dur: Duration) {
        std::thread::sleep(dur);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    fn state(config: &WorkerConfig, enabled: bool) -> Arc<WorkerState> {
        Arc::new(WorkerState::new(
            Identity::new(config.name.clone(), 1),
            config,
            enabled,
            Arc::new(Mutex::new(())),
        ))
    }

    #[test]
    fn stop_is_terminal() {
        let s = state(&WorkerConfig::new("t"), true);
        assert!(!s.is_stopping());
        s.request_stop();
        assert!(s.is_stopping());
        // No API can clear it; enabling does not resurrect the worker.
        s.set_enabled(true);
        assert!(s.is_stopping());
    }

    #[test]
    fn take_message_is_one_shot() {
        let s = state(&WorkerConfig::new("t"), true);
        assert!(!s.take_message());
        s.request_message();
        assert!(s.needs_message());
        assert!(s.take_message());
        assert!(!s.take_message());
    }

    #[test]
    fn await_enabled_returns_false_on_stop_while_disabled() {
        let config = WorkerConfig::new("t").with_update_time(Duration::from_millis(5));
        let s = state(&config, false);
        let s2 = Arc::clone(&s);
        let handle = thread::spawn(move || s2.await_enabled());
        thread::sleep(Duration::from_millis(20));
        s.request_stop();
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn await_enabled_wakes_promptly_on_enable() {
        // The condvar should wake the parked thread well before a long poll
        // interval would.
        let config = WorkerConfig::new("t").with_update_time(Duration::from_secs(5));
        let s = state(&config, false);
        let s2 = Arc::clone(&s);
        let handle = thread::spawn(move || s2.await_enabled());
        thread::sleep(Duration::from_millis(20));
        let woke_at = Instant::now();
        s.set_enabled(true);
        assert!(handle.join().unwrap());
        assert!(woke_at.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn global_lock_excludes_other_holders() {
        let config = WorkerConfig::new("t");
        let a = state(&config, true);
        let b = Arc::new(WorkerState::new(
            Identity::new("u", 2),
            &config,
            true,
            Arc::clone(&a.global),
        ));

        let guard = a.global_lock();
        let b2 = Arc::clone(&b);
        let handle = thread::spawn(move || {
            let _guard = b2.global_lock();
            Instant::now()
        });
        thread::sleep(Duration::from_millis(50));
        let released_at = Instant::now();
        drop(guard);
        let acquired_at = handle.join().unwrap();
        assert!(acquired_at >= released_at);
    }
}
