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

//! The window/event seam.
//!
//! The engine never owns an OS window directly; it drives whatever
//! implements [`EngineWindow`]. Desktop backends (winit/SDL-class) and the
//! headless backend used by tests and CI both live behind this trait.

/// An input or lifecycle event reported by the window backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// The user asked to close the window.
    CloseRequested,
    /// The window's inner area changed size.
    Resized {
        /// New inner width in physical pixels.
        width: u32,
        /// New inner height in physical pixels.
        height: u32,
    },
    /// The window gained input focus.
    FocusGained,
    /// The window lost input focus.
    FocusLost,
}

/// Behavior of a window, whatever backend provides it.
///
/// The engine polls events and presents from its outer loop on the thread
/// that owns the window; implementations are not required to tolerate calls
/// from any other thread.
pub trait EngineWindow: Send {
    /// The next pending event, if any. Non-blocking.
    fn poll_event(&mut self) -> Option<WindowEvent>;

    /// Presents the most recently rendered frame.
    fn present(&mut self);

    /// Physical dimensions (width, height) of the window's inner area.
    fn inner_size(&self) -> (u32, u32);
}
