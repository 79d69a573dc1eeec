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

//! Frame pacing for the render loop.

use std::time::{Duration, Instant};

/// Paces a loop to a minimum frame duration and measures elapsed time.
///
/// Delta times are reported in **microseconds** — the unit every animation
/// and update path in the engine consumes.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    /// Creates a clock whose first tick measures from "now".
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Completes one frame: sleeps out the remainder of `min_frame_time`
    /// (pass `Duration::ZERO` to run uncapped) and returns the time elapsed
    /// since the previous tick, in microseconds.
    pub fn tick(&mut self, min_frame_time: Duration) -> f32 {
        let elapsed = self.last.elapsed();
        if elapsed < min_frame_time {
            std::thread::sleep(min_frame_time - elapsed);
        }
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta.as_micros() as f32
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_tick_returns_elapsed_micros() {
        let mut clock = FrameClock::new();
        std::thread::sleep(Duration::from_millis(5));
        let delta = clock.tick(Duration::ZERO);
        assert!(delta >= 5_000.0, "expected at least 5ms, got {delta}us");
    }

    #[test]
    fn capped_tick_sleeps_to_minimum() {
        let mut clock = FrameClock::new();
        let delta = clock.tick(Duration::from_millis(10));
        assert!(delta >= 10_000.0, "expected at least 10ms, got {delta}us");
    }
}
