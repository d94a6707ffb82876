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

//! # Vigil Infra
//!
//! Concrete implementations of the seams `vigil-core` defines: the disk
//! file service, config and scene file I/O, the journal worker, and the
//! headless window/render backends used by tests and server-style runs.

pub mod config_io;
pub mod fs;
pub mod journal;
pub mod platform;
pub mod scene_io;

pub use config_io::{load_config, save_config, ConfigError};
pub use fs::DiskFileService;
pub use journal::{Journal, JournalLevel, JournalWorker};
pub use platform::{HeadlessWindow, NullRenderSystem};
pub use scene_io::{load_scene, save_scene, SceneError};
