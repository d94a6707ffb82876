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

//! Demo runtime: a loading state that hands off to a menu state once its
//! work is done, alongside a few looping workers reporting through the
//! journal under the registry-wide lock.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vigil_runtime::prelude::*;

struct Menu {
    journal: Journal,
}

impl State for Menu {
    fn id(&self) -> &str {
        "menu"
    }

    fn start(&mut self) -> Transition {
        self.journal.write(JournalLevel::Message, "menu state started");
        Transition::None
    }

    fn update(&mut self, _dt: Duration) -> Transition {
        Transition::None
    }
}

struct Loading {
    journal: Journal,
    ticks: usize,
}

impl State for Loading {
    fn id(&self) -> &str {
        "loading"
    }

    fn start(&mut self) -> Transition {
        self.journal.write(JournalLevel::Message, "loading state started");
        Transition::None
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
        self.journal.write(JournalLevel::Message, "loading state finished");
        Transition::Push(Box::new(Menu {
            journal: self.journal.clone(),
        }))
    }
}

/// Journals a line under the registry-wide lock, the way any worker that
/// touches shared output should.
struct Chatty {
    journal: Journal,
}

impl Worker for Chatty {
    fn work(&mut self, ctx: &WorkerContext) {
        {
            let _global = ctx.global_lock();
            self.journal
                .write(JournalLevel::Message, format!("worker {} reporting", ctx.id()));
        }
        ctx.sleep(Duration::from_millis(100));
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut engine = Engine::new(EngineSettings::new("vigil-data"))?;
    let (width, height) = engine.window_size();

    engine.push_state(Box::new(Loading {
        journal: engine.journal().clone(),
        ticks: 0,
    }));

    for i in 0..3 {
        let chatty = Chatty {
            journal: engine.journal().clone(),
        };
        engine.registry_mut().add(
            Arc::new(Mutex::new(chatty)),
            WorkerConfig::new(format!("chatty-{i}")).looping(),
            true,
        )?;
    }

    // Headless demo run; a desktop window backend would slot in here.
    let window = HeadlessWindow::new(width, height).close_after(1000);
    let renderer = NullRenderSystem::new();
    engine.run(Box::new(window), Box::new(renderer))
}
