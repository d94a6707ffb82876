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

//! # Vigil Runtime
//!
//! The engine facade: one [`Engine`] value owns the file service, config
//! store, journal, worker registry, and state machine, and drives the outer
//! loop against whatever window and render backends the application hands
//! it.

pub mod engine;

pub use engine::{Engine, EngineSettings};

/// The imports an application embedding the engine usually wants.
pub mod prelude {
    pub use crate::engine::{Engine, EngineSettings};
    pub use vigil_core::fs::FileService;
    pub use vigil_core::platform::window::{EngineWindow, WindowEvent};
    pub use vigil_core::renderer::RenderSystem;
    pub use vigil_core::worker::{Worker, WorkerConfig, WorkerContext};
    pub use vigil_core::{State, StateMachine, Transition};
    pub use vigil_infra::{HeadlessWindow, Journal, JournalLevel, NullRenderSystem};
}
