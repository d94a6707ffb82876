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

//! # Vigil Control
//!
//! The cooperative worker runtime: one OS thread per registered worker, a
//! central [`WorkerRegistry`] that owns lock discipline and reclaims
//! finished workers from its per-tick maintenance pass, and the
//! [`UpdateWorker`] that drives the application state machine off the
//! render/event thread.

pub mod registry;
pub mod update;
pub mod worker;

pub use registry::WorkerRegistry;
pub use update::UpdateWorker;
pub use worker::WorkerEntry;
