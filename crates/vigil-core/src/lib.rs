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

//! # Vigil Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! that define the engine's architecture. The concurrency runtime lives in
//! `vigil-control`, concrete backends in `vigil-infra`.

#![warn(missing_docs)]

pub mod config;
pub mod event;
pub mod fs;
pub mod ident;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod state;
pub mod utils;
pub mod worker;

pub use ident::Identity;
pub use state::{State, StateMachine, Transition};
pub use utils::timer::Stopwatch;
pub use worker::{Worker, WorkerConfig, WorkerContext, WorkerId, WorkerState};
