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

use crate::event::WindowEvent;

/// A trait that abstracts the behavior of a window.
///
/// Any windowing backend (winit, SDL, GLFW, a scripted test double) can
/// implement this trait to host the engine. The application owns the window
/// exclusively and calls every method from the main thread; the trait
/// deliberately carries no `Send`/`Sync` bound so backends built on
/// thread-affine event loops remain implementable.
pub trait PlatformWindow {
    /// The window title.
    fn title(&self) -> &str;

    /// The physical dimensions (width, height) of the window's inner area.
    fn size(&self) -> (u32, u32);

    /// Whether the window is still open. The application's render loop runs
    /// while this returns `true`.
    fn is_open(&self) -> bool;

    /// Polls the OS event queue and returns the events that arrived since
    /// the last pump, translated into the engine's event type.
    ///
    /// Called exactly once per frame, on the main thread.
    fn pump(&mut self) -> Vec<WindowEvent>;

    /// Closes the window. After this call `is_open` returns `false`.
    fn close(&mut self);
}
