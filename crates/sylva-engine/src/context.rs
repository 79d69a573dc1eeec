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

//! The engine context threaded from the application into scenes.
//!
//! There are no engine-wide globals: everything a scene needs from its host
//! application arrives through this explicitly constructed context.

use crate::tasks::TaskSender;
use sylva_core::math::Vec2;

/// Application-provided context required to construct a [`Scene`](crate::Scene).
#[derive(Clone)]
pub struct EngineContext {
    /// The window's inner size in pixels at the time of construction.
    pub window_size: (u32, u32),
    /// The number of update threads the application partitions nodes across.
    pub update_threads: usize,
    /// Submits work to the application's main thread.
    pub tasks: TaskSender,
}

impl EngineContext {
    /// The window size as an `f32` vector.
    pub fn window_size_f(&self) -> Vec2 {
        Vec2::new(self.window_size.0 as f32, self.window_size.1 as f32)
    }
}
