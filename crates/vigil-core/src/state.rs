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

//! Stack-based application state machine.
//!
//! Application phases (loading, menu, gameplay, ...) are strictly nested, so
//! control flow is a pure stack: pushing suspends the current phase, popping
//! returns control to it. This is not a general state graph: there is no
//! lookup-by-id and no non-stack transition.
//!
//! Lifecycle hooks return a [`Transition`] that the machine applies
//! immediately, so a state can push its successor or pop itself from inside
//! `start`, `update`, or `end` without holding a handle to the machine.

use std::fmt;
use std::time::Duration;

/// A state-requested change to the stack, applied by the machine as soon as
/// the hook that produced it returns.
pub enum Transition {
    /// Stay as is.
    None,
    /// Push a new state on top; it becomes current and its `start` runs
    /// before control returns.
    Push(Box<dyn State>),
    /// Pop the current state; its `end` runs, and whatever it returns is
    /// applied in turn.
    Pop,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => f.write_str("None"),
            Transition::Push(state) => f.debug_tuple("Push").field(&state.id()).finish(),
            Transition::Pop => f.write_str("Pop"),
        }
    }
}

/// One phase of application control flow.
///
/// `start` is invoked exactly once at push time, `update` zero or more times
/// while the state is on top of the stack, and `end` exactly once at pop
/// time, unless a silent teardown skips it.
pub trait State: Send {
    /// Diagnostic identifier. Carries no transition semantics.
    fn id(&self) -> &str;

    /// Invoked once when the state becomes current.
    fn start(&mut self) -> Transition {
        Transition::None
    }

    /// Invoked once per tick while the state is current. States buried under
    /// another state receive no ticks.
    fn update(&mut self, dt: Duration) -> Transition;

    /// Invoked once when the state is popped.
    fn end(&mut self) -> Transition {
        Transition::None
    }
}

/// The stack of application states. At most one state is current at any
/// time: the top of the stack.
#[derive(Default)]
pub struct StateMachine {
    stack: Vec<Box<dyn State>>,
}

impl StateMachine {
    /// An empty machine.
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Pushes `state`, makes it current, and runs its `start` hook.
    pub fn push(&mut self, state: Box<dyn State>) {
        log::debug!("state '{}' pushed (depth {})", state.id(), self.stack.len() + 1);
        self.stack.push(state);
        let transition = self
            .stack
            .last_mut()
            .expect("state pushed above")
            .start();
        self.apply(transition);
    }

    /// Detaches the current state, runs its `end` hook, destroys it, and
    /// applies whatever transition `end` returned. No-op on an empty stack.
    pub fn pop(&mut self) {
        if let Some(mut state) = self.stack.pop() {
            log::debug!("state '{}' popped (depth {})", state.id(), self.stack.len());
            let transition = state.end();
            drop(state);
            self.apply(transition);
        }
    }

    /// Unwinds the whole stack, top to bottom.
    ///
    /// With `notify` false this is the silent teardown path: `end` is
    /// skipped entirely. With `notify` true every state's `end` runs, but
    /// transitions it returns are discarded; teardown is not a
    /// control-flow path.
    pub fn pop_all(&mut self, notify: bool) {
        while let Some(mut state) = self.stack.pop() {
            if notify {
                match state.end() {
                    Transition::None => {}
                    other => {
                        log::trace!(
                            "state '{}' returned {:?} from end during teardown; discarded",
                            state.id(),
                            other
                        );
                    }
                }
            }
        }
    }

    /// Ticks the current state, if any, and applies its transition.
    pub fn update(&mut self, dt: Duration) {
        let transition = match self.stack.last_mut() {
            Some(state) => state.update(dt),
            None => return,
        };
        self.apply(transition);
    }

    /// The current state, if any.
    pub fn current(&self) -> Option<&dyn State> {
        self.stack.last().map(|state| state.as_ref())
    }

    /// Diagnostic id of the current state.
    pub fn current_id(&self) -> Option<&str> {
        self.stack.last().map(|state| state.id())
    }

    /// Number of states on the stack.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Push(state) => self.push(state),
            Transition::Pop => self.pop(),
        }
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("depth", &self.stack.len())
            .field("current", &self.current_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const DT: Duration = Duration::from_millis(16);

    /// Shared event log so tests can assert call order across states.
    type Log = Arc<std::sync::Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        on_update: Box<dyn FnMut(usize) -> Transition + Send>,
        updates: usize,
    }

    impl Recorder {
        fn passive(name: &'static str, log: Log) -> Box<Self> {
            Box::new(Self {
                name,
                log,
                on_update: Box::new(|_| Transition::None),
                updates: 0,
            })
        }

        fn with_update(
            name: &'static str,
            log: Log,
            on_update: impl FnMut(usize) -> Transition + Send + 'static,
        ) -> Box<Self> {
            Box::new(Self {
                name,
                log,
                on_update: Box::new(on_update),
                updates: 0,
            })
        }

        fn record(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, what));
        }
    }

    impl State for Recorder {
        fn id(&self) -> &str {
            self.name
        }

        fn start(&mut self) -> Transition {
            self.record("start");
            Transition::None
        }

        fn update(&mut self, _dt: Duration) -> Transition {
            self.updates += 1;
            self.record("update");
            (self.on_update)(self.updates)
        }

        fn end(&mut self) -> Transition {
            self.record("end");
            Transition::None
        }
    }

    fn log() -> Log {
        Arc::new(std::sync::Mutex::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn update_always_ticks_the_top() {
        let log = log();
        let mut machine = StateMachine::new();

        machine.push(Recorder::passive("a", Arc::clone(&log)));
        machine.update(DT);
        machine.push(Recorder::passive("b", Arc::clone(&log)));
        machine.update(DT);
        machine.pop();
        machine.update(DT);

        assert_eq!(
            entries(&log),
            vec!["a:start", "a:update", "b:start", "b:update", "b:end", "a:update"]
        );
    }

    #[test]
    fn pop_on_empty_is_a_no_op() {
        let mut machine = StateMachine::new();
        machine.pop();
        machine.update(DT);
        assert!(machine.is_empty());
    }

    #[test]
    fn pop_all_silent_skips_end() {
        let log = log();
        let mut machine = StateMachine::new();
        machine.push(Recorder::passive("a", Arc::clone(&log)));
        machine.push(Recorder::passive("b", Arc::clone(&log)));

        machine.pop_all(false);

        assert!(machine.is_empty());
        assert_eq!(entries(&log), vec!["a:start", "b:start"]);
    }

    #[test]
    fn pop_all_notify_ends_top_to_bottom() {
        let log = log();
        let mut machine = StateMachine::new();
        machine.push(Recorder::passive("a", Arc::clone(&log)));
        machine.push(Recorder::passive("b", Arc::clone(&log)));
        machine.push(Recorder::passive("c", Arc::clone(&log)));

        machine.pop_all(true);

        assert!(machine.is_empty());
        assert_eq!(
            entries(&log),
            vec!["a:start", "b:start", "c:start", "c:end", "b:end", "a:end"]
        );
    }

    #[test]
    fn push_from_start_takes_effect_immediately() {
        struct Chainer {
            log: Log,
        }
        impl State for Chainer {
            fn id(&self) -> &str {
                "chainer"
            }
            fn start(&mut self) -> Transition {
                Transition::Push(Recorder::passive("inner", Arc::clone(&self.log)))
            }
            fn update(&mut self, _dt: Duration) -> Transition {
                Transition::None
            }
        }

        let log = log();
        let mut machine = StateMachine::new();
        machine.push(Box::new(Chainer {
            log: Arc::clone(&log),
        }));

        assert_eq!(machine.current_id(), Some("inner"));
        assert_eq!(machine.len(), 2);
        assert_eq!(entries(&log), vec!["inner:start"]);
    }

    /// The loading/menu scenario: loading counts 500 ticks, pops itself, and
    /// its `end` hands control to the menu state.
    #[test]
    fn loading_hands_off_to_menu_on_tick_500() {
        struct Loading {
            ticks: usize,
            menu_starts: Arc<AtomicUsize>,
        }
        struct Menu {
            starts: Arc<AtomicUsize>,
        }

        impl State for Loading {
            fn id(&self) -> &str {
                "loading"
            }
            fn update(&mut self, _dt: Duration) -> Transition {
                self.ticks += 1;
                if self.ticks >= 500 {
                    Transition::Pop
                } else {
                    Transition::None
                }
            }
            fn end(&mut self) -> Transition {
                Transition::Push(Box::new(Menu {
                    starts: Arc::clone(&self.menu_starts),
                }))
            }
        }

        impl State for Menu {
            fn id(&self) -> &str {
                "menu"
            }
            fn start(&mut self) -> Transition {
                self.starts.fetch_add(1, Ordering::SeqCst);
                Transition::None
            }
            fn update(&mut self, _dt: Duration) -> Transition {
                Transition::None
            }
        }

        let menu_starts = Arc::new(AtomicUsize::new(0));
        let mut machine = StateMachine::new();
        machine.push(Box::new(Loading {
            ticks: 0,
            menu_starts: Arc::clone(&menu_starts),
        }));

        for _ in 0..499 {
            machine.update(DT);
            assert_eq!(machine.current_id(), Some("loading"));
        }
        assert_eq!(menu_starts.load(Ordering::SeqCst), 0);

        machine.update(DT);

        assert_eq!(machine.current_id(), Some("menu"));
        assert_eq!(menu_starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pop_from_update_returns_control_to_caller() {
        let log = log();
        let mut machine = StateMachine::new();
        machine.push(Recorder::passive("base", Arc::clone(&log)));
        machine.push(Recorder::with_update("top", Arc::clone(&log), |n| {
            if n >= 2 {
                Transition::Pop
            } else {
                Transition::None
            }
        }));

        machine.update(DT);
        assert_eq!(machine.current_id(), Some("top"));
        machine.update(DT);
        assert_eq!(machine.current_id(), Some("base"));
    }
}
