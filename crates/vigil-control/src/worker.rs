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

//! Execution side of a worker: the thread body and the registry's handle to
//! a running worker.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use vigil_core::worker::{Worker, WorkerContext, WorkerState};

/// The thread body every worker runs.
///
/// While disabled the worker parks on the state's condvar, polling at most
/// every `update_time`; a stop observed while disabled winds down without
/// running `work` again. Otherwise `work` runs, once for a one-shot worker
/// and repeatedly until a stop is observed for a looping one. `end_work`
/// runs exactly once on the cooperative path, after which the worker is
/// stopping and finished, so the next maintenance pass reclaims it; a
/// one-shot worker therefore reaches `stopping` without anyone requesting
/// it.
fn worker_main(hooks: Arc<Mutex<dyn Worker>>, state: Arc<WorkerState>) {
    // Reaching `stopping` + `finished` must survive a panicking hook, or the
    // registry would carry the corpse forever.
    struct ExitGuard(Arc<WorkerState>);
    impl Drop for ExitGuard {
        fn drop(&mut self) {
            self.0.request_stop();
            self.0.mark_finished();
        }
    }
    let _exit = ExitGuard(Arc::clone(&state));

    let ctx = WorkerContext::new(Arc::clone(&state));
    log::debug!("worker '{}' (id {}) thread running", state.name(), state.id());

    loop {
        if !state.await_enabled() {
            break;
        }
        {
            // The worker's local lock: held for the whole of one `work`
            // invocation, the same lock the maintenance pass takes to
            // deliver `message`.
            let mut hooks = hooks.lock().unwrap_or_else(PoisonError::into_inner);
            hooks.work(&ctx);
        }
        if !state.is_looping() {
            break;
        }
    }

    let mut hooks = hooks.lock().unwrap_or_else(PoisonError::into_inner);
    hooks.end_work(&ctx);
    log::debug!("worker '{}' (id {}) thread exiting", state.name(), state.id());
}

/// A registered worker as the registry holds it: shared flag block, the
/// hook object behind the worker's local lock, and the execution thread.
pub struct WorkerEntry {
    state: Arc<WorkerState>,
    hooks: Arc<Mutex<dyn Worker>>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerEntry {
    /// Spawns the execution thread for `hooks` driven by `state`.
    pub(crate) fn spawn(
        hooks: Arc<Mutex<dyn Worker>>,
        state: Arc<WorkerState>,
    ) -> io::Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("worker-{}", state.name()))
            .spawn({
                let hooks = Arc::clone(&hooks);
                let state = Arc::clone(&state);
                move || worker_main(hooks, state)
            })?;
        Ok(Self {
            state,
            hooks,
            thread: Some(thread),
        })
    }

    /// The worker's shared flag block.
    pub fn state(&self) -> &Arc<WorkerState> {
        &self.state
    }

    /// The worker's hook object, behind its local lock.
    pub fn hooks(&self) -> &Arc<Mutex<dyn Worker>> {
        &self.hooks
    }

    /// Whether the execution thread has exited.
    pub fn thread_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Joins an exited thread, logging if it died by panic.
    pub(crate) fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("worker '{}' thread panicked", self.state.name());
            }
        }
    }

    /// The forced teardown tier: request a cooperative stop, wait up to
    /// `timeout` for the thread to exit, and abandon it if it does not.
    ///
    /// An abandoned thread keeps running until its current `work` returns;
    /// its `end_work` is not guaranteed and no partial work should be
    /// assumed committed.
    pub(crate) fn destroy(&mut self, timeout: Duration) {
        self.state.request_stop();

        let Some(thread) = self.thread.take() else {
            return;
        };
        let deadline = Instant::now() + timeout;
        while !thread.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        if thread.is_finished() {
            if thread.join().is_err() {
                log::warn!("worker '{}' thread panicked", self.state.name());
            }
        } else {
            log::warn!(
                "worker '{}' (id {}) did not stop within {:?}; abandoning its thread",
                self.state.name(),
                self.state.id(),
                timeout
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vigil_core::worker::WorkerConfig;
    use vigil_core::Identity;

    fn entry(
        worker: impl Worker,
        config: WorkerConfig,
        enabled: bool,
    ) -> (WorkerEntry, Arc<WorkerState>) {
        let state = Arc::new(WorkerState::new(
            Identity::new(config.name.clone(), 1),
            &config,
            enabled,
            Arc::new(Mutex::new(())),
        ));
        let entry = WorkerEntry::spawn(Arc::new(Mutex::new(worker)), Arc::clone(&state)).unwrap();
        (entry, state)
    }

    fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let end = Instant::now() + deadline;
        while Instant::now() < end {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    struct Counting {
        work_runs: Arc<AtomicUsize>,
        end_runs: Arc<AtomicUsize>,
    }

    impl Worker for Counting {
        fn work(&mut self, ctx: &WorkerContext) {
            self.work_runs.fetch_add(1, Ordering::SeqCst);
            ctx.sleep(Duration::from_millis(1));
        }
        fn end_work(&mut self, _ctx: &WorkerContext) {
            self.end_runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn one_shot_worker_runs_work_once_and_stops_itself() {
        let work_runs = Arc::new(AtomicUsize::new(0));
        let end_runs = Arc::new(AtomicUsize::new(0));
        let (mut entry, state) = entry(
            Counting {
                work_runs: Arc::clone(&work_runs),
                end_runs: Arc::clone(&end_runs),
            },
            WorkerConfig::new("once"),
            true,
        );

        assert!(wait_until(Duration::from_secs(2), || state.is_finished()));
        assert_eq!(work_runs.load(Ordering::SeqCst), 1);
        assert_eq!(end_runs.load(Ordering::SeqCst), 1);
        // Nobody called request_stop; the worker got there on its own.
        assert!(state.is_stopping());
        entry.join();
    }

    #[test]
    fn looping_worker_repeats_until_stopped() {
        let work_runs = Arc::new(AtomicUsize::new(0));
        let end_runs = Arc::new(AtomicUsize::new(0));
        let (mut entry, state) = entry(
            Counting {
                work_runs: Arc::clone(&work_runs),
                end_runs: Arc::clone(&end_runs),
            },
            WorkerConfig::new("looper").looping(),
            true,
        );

        assert!(wait_until(Duration::from_secs(2), || {
            work_runs.load(Ordering::SeqCst) >= 5
        }));
        state.request_stop();
        assert!(wait_until(Duration::from_secs(2), || state.is_finished()));
        assert_eq!(end_runs.load(Ordering::SeqCst), 1);
        entry.join();
    }

    #[test]
    fn stop_while_disabled_skips_work_entirely() {
        let work_runs = Arc::new(AtomicUsize::new(0));
        let end_runs = Arc::new(AtomicUsize::new(0));
        let (mut entry, state) = entry(
            Counting {
                work_runs: Arc::clone(&work_runs),
                end_runs: Arc::clone(&end_runs),
            },
            WorkerConfig::new("parked").looping(),
            false,
        );

        thread::sleep(Duration::from_millis(30));
        state.request_stop();
        assert!(wait_until(Duration::from_secs(2), || state.is_finished()));
        assert_eq!(work_runs.load(Ordering::SeqCst), 0);
        assert_eq!(end_runs.load(Ordering::SeqCst), 1);
        entry.join();
    }

    #[test]
    fn panicking_work_still_reaches_stopping_and_finished() {
        struct Bomb;
        impl Worker for Bomb {
            fn work(&mut self, _ctx: &WorkerContext) {
                panic!("boom");
            }
        }

        let (mut entry, state) = entry(Bomb, WorkerConfig::new("bomb").looping(), true);
        assert!(wait_until(Duration::from_secs(2), || state.is_finished()));
        assert!(state.is_stopping());
        entry.join();
    }

    #[test]
    fn destroy_abandons_a_stuck_worker_within_the_timeout() {
        struct Stuck;
        impl Worker for Stuck {
            fn work(&mut self, ctx: &WorkerContext) {
                // Blocks far longer than any teardown budget and never
                // polls the stop flag.
                ctx.sleep(Duration::from_secs(30));
            }
        }

        let (mut entry, state) = entry(Stuck, WorkerConfig::new("stuck").looping(), true);
        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        entry.destroy(Duration::from_millis(100));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(state.is_stopping());
    }
}
