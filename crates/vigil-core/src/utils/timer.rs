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

//! Wall-clock timing helpers.

use std::time::{Duration, Instant};

/// Measures the time between consecutive ticks; used to hand `dt` to the
/// state machine.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    last: Instant,
}

impl Stopwatch {
    /// A stopwatch whose first `tick` measures from now.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Time elapsed since the previous tick (or construction), and restarts
    /// the measurement.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt
    }

    /// Time elapsed since the previous tick without restarting.
    pub fn elapsed(&self) -> Duration {
        self.last.elapsed()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn tick_measures_and_restarts() {
        let mut sw = Stopwatch::new();
        thread::sleep(Duration::from_millis(10));
        let first = sw.tick();
        assert!(first >= Duration::from_millis(10));

        let second = sw.tick();
        assert!(second < first);
    }
}
