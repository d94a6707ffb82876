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

//! The render seam.
//!
//! The render backend owns the graphics context and is driven one step per
//! outer-loop tick from the thread that owns it. Everything else in the
//! engine treats rendering as this trait.

use anyhow::Result;

/// Behavior of the render backend.
pub trait RenderSystem {
    /// Issues the draw calls for one frame. Must run only on the thread
    /// owning the graphics context.
    fn render_step(&mut self) -> Result<()>;

    /// Adjusts the backend to a new surface size.
    fn resize(&mut self, width: u32, height: u32);
}
