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

//! The opaque render backend contract.
//!
//! The engine never talks to a graphics API directly. A scene clears the
//! frame, submits one [`DrawCommand`] per visible node in draw order, and
//! presents — everything past that boundary (buffers, shaders, swapchains)
//! belongs to the backend implementation.

use crate::math::{Color, Transform, Vec2};
use thiserror::Error;

/// An error reported by a render backend.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The surface or output target was lost and could not be restored.
    #[error("render surface lost: {0}")]
    SurfaceLost(String),
    /// A draw submission was rejected by the backend.
    #[error("draw submission failed: {0}")]
    DrawFailed(String),
    /// Any other backend failure.
    #[error("render backend error: {0}")]
    Backend(String),
}

/// A single filled shape, in world coordinates, ready for submission.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    /// The outline vertices of the shape, wound counter-clockwise.
    pub vertices: Vec<Vec2>,
    /// The fill color of the shape.
    pub color: Color,
    /// The full camera-to-screen matrix to apply to every vertex.
    pub transform: Transform,
    /// The draw-order key the shape was submitted under. Lower values are
    /// drawn first; backends may use it for depth writes.
    pub z_position: f32,
}

/// The contract the scene renders through.
///
/// All three methods must only be invoked on the thread owning the graphics
/// context (the application's main/render thread), once per frame, in
/// `begin_frame` → `draw`* → `present` order.
pub trait RenderBackend {
    /// Starts a new frame, clearing the output to `clear`.
    fn begin_frame(&mut self, clear: Color) -> Result<(), RenderError>;

    /// Submits one shape. Commands arrive in ascending z order.
    fn draw(&mut self, command: &DrawCommand) -> Result<(), RenderError>;

    /// Presents the finished frame (swaps buffers / submits the swapchain).
    fn present(&mut self) -> Result<(), RenderError>;
}
