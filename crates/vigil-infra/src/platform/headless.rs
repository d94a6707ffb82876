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

//! Headless window and renderer.

use anyhow::Result;
use std::collections::VecDeque;
use vigil_core::platform::window::{EngineWindow, WindowEvent};
use vigil_core::renderer::RenderSystem;

/// A window with no OS surface behind it.
///
/// Events are scripted: tests and demos queue them up front (or via
/// [`close_after`](Self::close_after)) and the engine polls them exactly as
/// it would a real backend's.
#[derive(Debug)]
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    queued: VecDeque<WindowEvent>,
    close_after: Option<u64>,
    close_sent: bool,
    presented: u64,
}

impl HeadlessWindow {
    /// A window of the given inner size with an empty event script.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            queued: VecDeque::new(),
            close_after: None,
            close_sent: false,
            presented: 0,
        }
    }

    /// Reports a close request after `frames` presents, ending an engine
    /// run that would otherwise loop forever.
    pub fn close_after(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    /// Appends an event to the script.
    pub fn push_event(&mut self, event: WindowEvent) {
        self.queued.push_back(event);
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl EngineWindow for HeadlessWindow {
    fn poll_event(&mut self) -> Option<WindowEvent> {
        if let Some(event) = self.queued.pop_front() {
            if let WindowEvent::Resized { width, height } = event {
                self.width = width;
                self.height = height;
            }
            return Some(event);
        }
        if let Some(limit) = self.close_after {
            if self.presented >= limit && !self.close_sent {
                self.close_sent = true;
                return Some(WindowEvent::CloseRequested);
            }
        }
        None
    }

    fn present(&mut self) {
        self.presented += 1;
    }

    fn inner_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A renderer that issues no draw calls, tracking only what it was asked
/// to do.
#[derive(Debug, Default)]
pub struct NullRenderSystem {
    frames: u64,
    size: Option<(u32, u32)>,
}

impl NullRenderSystem {
    /// A fresh null renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The last size passed to `resize`, if any.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }
}

impl RenderSystem for NullRenderSystem {
    fn render_step(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::trace!("null renderer resized to {width}x{height}");
        self.size = Some((width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_events_come_back_in_order() {
        let mut window = HeadlessWindow::new(640, 480);
        window.push_event(WindowEvent::FocusGained);
        window.push_event(WindowEvent::Resized {
            width: 800,
            height: 600,
        });

        assert_eq!(window.poll_event(), Some(WindowEvent::FocusGained));
        assert_eq!(
            window.poll_event(),
            Some(WindowEvent::Resized {
                width: 800,
                height: 600
            })
        );
        assert_eq!(window.inner_size(), (800, 600));
        assert_eq!(window.poll_event(), None);
    }

    #[test]
    fn close_after_fires_once_past_the_frame_budget() {
        let mut window = HeadlessWindow::new(640, 480).close_after(2);
        assert_eq!(window.poll_event(), None);
        window.present();
        assert_eq!(window.poll_event(), None);
        window.present();
        assert_eq!(window.poll_event(), Some(WindowEvent::CloseRequested));
        assert_eq!(window.poll_event(), None);
    }

    #[test]
    fn null_renderer_tracks_frames_and_size() {
        let mut renderer = NullRenderSystem::new();
        renderer.render_step().unwrap();
        renderer.render_step().unwrap();
        renderer.resize(320, 200);
        assert_eq!(renderer.frames(), 2);
        assert_eq!(renderer.size(), Some((320, 200)));
    }
}
