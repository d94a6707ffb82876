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

//! The engine facade.
//!
//! `Engine` wires the subsystems together and drives the outer loop on the
//! calling thread: poll window events, run the render-owning step, present,
//! run the registry maintenance pass. Game logic never runs here; the
//! update worker advances the state machine on its own thread.
//!
//! Every component receives its services through this facade; there is no
//! process-wide engine singleton to reach for.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use vigil_control::update::{SharedStateMachine, UpdateWorker};
use vigil_control::WorkerRegistry;
use vigil_core::config::ConfigStore;
use vigil_core::event::EventBus;
use vigil_core::fs::FileService;
use vigil_core::platform::window::{EngineWindow, WindowEvent};
use vigil_core::renderer::RenderSystem;
use vigil_core::scene::SceneSet;
use vigil_core::{State, StateMachine};
use vigil_infra::config_io::{self, ConfigError};
use vigil_infra::journal::{Journal, JournalLevel, JournalWorker};
use vigil_infra::DiskFileService;

/// Where the engine keeps its files and how the outer loop paces itself.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Root directory for the file service.
    pub data_dir: PathBuf,
    /// Name of the config file under the data directory.
    pub config_file: String,
    /// Name of the journal file under the data directory.
    pub journal_file: String,
    /// Journal queue capacity before lines are dropped from the file.
    pub journal_capacity: usize,
    /// Sleep at the end of each outer-loop tick.
    pub frame_delay: Duration,
}

impl EngineSettings {
    /// Defaults rooted at `data_dir`: `engine.cf`, `journal.txt`, a 1024
    /// line journal queue, and a 1 ms frame delay.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            config_file: "engine.cf".to_string(),
            journal_file: "journal.txt".to_string(),
            journal_capacity: 1024,
            frame_delay: Duration::from_millis(1),
        }
    }
}

/// The assembled engine.
pub struct Engine {
    files: Arc<dyn FileService>,
    config: ConfigStore,
    journal: Journal,
    registry: WorkerRegistry,
    machine: SharedStateMachine,
    scenes: Arc<Mutex<SceneSet>>,
    events: EventBus<WindowEvent>,
    frame_delay: Duration,
    running: bool,
}

impl Engine {
    /// Builds the engine's subsystems.
    ///
    /// Loads the config file (falling back to built-in defaults when it
    /// does not exist yet, like a first run), enables auto-create so every
    /// key the engine touches materializes, saves the result back, and
    /// registers the journal and update workers.
    pub fn new(settings: EngineSettings) -> Result<Self> {
        let files: Arc<dyn FileService> =
            Arc::new(DiskFileService::new(settings.data_dir.clone())?);

        let config = match config_io::load_config(files.as_ref(), &settings.config_file) {
            Ok(store) => store,
            Err(ConfigError::Io(_)) => {
                log::warn!("config file not found: {}", settings.config_file);
                log::warn!("loading default values");
                ConfigStore::new(settings.config_file.clone())
            }
            Err(e) => return Err(e.into()),
        };
        config.enable_auto_create();
        // Touch the window keys so a first run writes them out with their
        // defaults.
        let _ = config.get_int("width", 640);
        let _ = config.get_int("height", 480);
        let _ = config.get_bool("window", true);

        let (journal, journal_worker) = JournalWorker::create(
            Arc::clone(&files),
            settings.journal_file.clone(),
            settings.journal_capacity,
        )?;

        let mut registry = WorkerRegistry::new();
        registry.add(
            Arc::new(Mutex::new(journal_worker)),
            JournalWorker::config(),
            true,
        )?;

        let machine: SharedStateMachine = Arc::new(Mutex::new(StateMachine::new()));
        UpdateWorker::register(&mut registry, Arc::clone(&machine))?;

        config_io::save_config(files.as_ref(), &config)?;
        journal.write(JournalLevel::Message, "engine subsystems initialized");

        Ok(Self {
            files,
            config,
            journal,
            registry,
            machine,
            scenes: Arc::new(Mutex::new(SceneSet::new())),
            events: EventBus::new(),
            frame_delay: settings.frame_delay,
            running: false,
        })
    }

    /// The engine's file service.
    pub fn files(&self) -> &Arc<dyn FileService> {
        &self.files
    }

    /// The engine's configuration.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// A producer handle to the journal.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// The worker registry, for registering application workers.
    pub fn registry_mut(&mut self) -> &mut WorkerRegistry {
        &mut self.registry
    }

    /// The worker registry.
    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// The shared state machine.
    pub fn states(&self) -> &SharedStateMachine {
        &self.machine
    }

    /// The set of loaded scenes, shared with whatever states drive them.
    pub fn scenes(&self) -> &Arc<Mutex<SceneSet>> {
        &self.scenes
    }

    /// Pushes an application state onto the machine.
    pub fn push_state(&self, state: Box<dyn State>) {
        self.machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(state);
    }

    /// A receiver of window events the engine does not consume itself
    /// (close and resize are handled in the loop; everything else is
    /// forwarded here).
    pub fn event_receiver(&self) -> flume::Receiver<WindowEvent> {
        self.events.receiver().clone()
    }

    /// Window size from config (`width`/`height`), for building the window
    /// backend before [`run`](Self::run).
    pub fn window_size(&self) -> (u32, u32) {
        let width = self.config.get_int("width", 640).max(1) as u32;
        let height = self.config.get_int("height", 480).max(1) as u32;
        (width, height)
    }

    /// Drives the outer loop until the window reports a close request.
    ///
    /// Must be called on the thread that owns `window` and `renderer`. On
    /// exit the registry is torn down through the forced tier and any
    /// remaining states are unwound silently.
    pub fn run(
        &mut self,
        mut window: Box<dyn EngineWindow>,
        mut renderer: Box<dyn RenderSystem>,
    ) -> Result<()> {
        self.running = true;
        let (width, height) = window.inner_size();
        renderer.resize(width, height);
        self.journal.write(JournalLevel::Message, "engine loop started");

        while self.running {
            self.handle_events(window.as_mut(), renderer.as_mut());

            {
                // Hold the machine lock across the render step so the
                // update worker cannot half-apply a transition under the
                // renderer.
                let _machine = self
                    .machine
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                renderer.render_step()?;
            }
            window.present();

            self.registry.maintain();
            thread::sleep(self.frame_delay);
        }

        self.journal.write(JournalLevel::Message, "engine loop stopped");
        self.shutdown();
        Ok(())
    }

    /// Requests that the outer loop exit after the current tick.
    pub fn stop(&mut self) {
        self.running = false;
    }

    fn handle_events(&mut self, window: &mut dyn EngineWindow, renderer: &mut dyn RenderSystem) {
        while let Some(event) = window.poll_event() {
            match event {
                WindowEvent::CloseRequested => {
                    log::info!("close requested; stopping engine loop");
                    self.running = false;
                }
                WindowEvent::Resized { width, height } => {
                    renderer.resize(width, height);
                    self.events.publish(WindowEvent::Resized { width, height });
                }
                other => self.events.publish(other),
            }
        }
    }

    fn shutdown(&mut self) {
        // Forced tier: bounded, does not wait for stragglers. The journal
        // worker flushes its queue from end_work on the way out.
        self.registry.stop_all();
        self.machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_all(false);
        log::info!("engine shutdown complete");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
