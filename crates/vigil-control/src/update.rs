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

//! The update worker: the always-looping worker that advances the
//! application state machine, decoupling state/game-logic stepping from the
//! render/event thread.

use crate::registry::WorkerRegistry;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use vigil_core::worker::{Worker, WorkerConfig, WorkerContext, WorkerId};
use vigil_core::{StateMachine, Stopwatch};

/// The state machine as shared between the update worker and the main
/// thread's render step.
pub type SharedStateMachine = Arc<Mutex<StateMachine>>;

/// Advances the shared [`StateMachine`] by one tick per `work` invocation.
///
/// Each tick runs under the machine's own mutex, so the main thread (which
/// reads state-machine-adjacent data during its render step) can never
/// observe a half-applied transition.
pub struct UpdateWorker {
    machine: SharedStateMachine,
    stopwatch: Stopwatch,
}

impl UpdateWorker {
    /// The update worker's well-known name.
    pub const NAME: &'static str = "update";
    /// The update worker's pinned id, below the registry's assignment seed.
    pub const ID: WorkerId = 1;

    /// An update worker driving `machine`.
    pub fn new(machine: SharedStateMachine) -> Self {
        Self {
            machine,
            stopwatch: Stopwatch::new(),
        }
    }

    /// The registration this worker always uses: pinned name/id, looping,
    /// 1 ms idle poll.
    pub fn config() -> WorkerConfig {
        WorkerConfig::new(Self::NAME)
            .with_id(Self::ID)
            .pinned()
            .looping()
            .with_update_time(Duration::from_millis(1))
    }

    /// Registers an update worker for `machine` and starts it.
    pub fn register(
        registry: &mut WorkerRegistry,
        machine: SharedStateMachine,
    ) -> io::Result<WorkerId> {
        registry.add(
            Arc::new(Mutex::new(Self::new(machine))),
            Self::config(),
            true,
        )
    }
}

impl Worker for UpdateWorker {
    fn work(&mut self, ctx: &WorkerContext) {
        // Yield first so a trivial state stack does not spin a core.
        ctx.sleep(Duration::from_millis(1));
        let dt = self.stopwatch.tick();
        let mut machine = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        machine.update(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Instant;
    use vigil_core::{State, Transition};

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
        ticks: Arc<AtomicUsize>,
    }

    impl State for Counting {
        fn id(&self) -> &str {
            "counting"
        }
        fn update(&mut self, dt: Duration) -> Transition {
            assert!(dt > Duration::ZERO);
            self.ticks.fetch_add(1, Ordering::SeqCst);
            Transition::None
        }
    }

    #[test]
    fn update_worker_ticks_the_machine_off_thread() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let machine: SharedStateMachine = Arc::new(Mutex::new(StateMachine::new()));
        machine.lock().unwrap().push(Box::new(Counting {
            ticks: Arc::clone(&ticks),
        }));

        let mut registry = WorkerRegistry::new();
        let id = UpdateWorker::register(&mut registry, Arc::clone(&machine)).unwrap();
        assert_eq!(id, UpdateWorker::ID);

        assert!(wait_until(Duration::from_secs(2), || {
            ticks.load(Ordering::SeqCst) >= 10
        }));

        // The main thread can take the machine lock between ticks, the same
        // way the render step does.
        {
            let machine = machine.lock().unwrap();
            assert_eq!(machine.current_id(), Some("counting"));
        }

        registry.stop_all();
        let after_stop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn state_transitions_apply_between_render_reads() {
        struct Flip {
            remaining: usize,
        }
        impl State for Flip {
            fn id(&self) -> &str {
                "flip"
            }
            fn update(&mut self, _dt: Duration) -> Transition {
                self.remaining -= 1;
                if self.remaining == 0 {
                    Transition::Pop
                } else {
                    Transition::None
                }
            }
        }

        let machine: SharedStateMachine = Arc::new(Mutex::new(StateMachine::new()));
        machine
            .lock()
            .unwrap()
            .push(Box::new(Flip { remaining: 20 }));

        let mut registry = WorkerRegistry::new();
        UpdateWorker::register(&mut registry, Arc::clone(&machine)).unwrap();

        // Poll the machine under its lock like a render step; the observed
        // id must only ever be "flip" or nothing, never anything torn.
        assert!(wait_until(Duration::from_secs(2), || {
            let machine = machine.lock().unwrap();
            match machine.current_id() {
                None => true,
                Some("flip") => false,
                Some(other) => panic!("unexpected state '{other}'"),
            }
        }));

        registry.stop_all();
    }
}
