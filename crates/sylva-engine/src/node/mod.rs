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

//! The scene node contract and its capability components.
//!
//! Nodes are built by composition: a concrete node owns the capability
//! components it needs — a [`Transformable`] for a synchronized transform, a
//! [`Collidable`] for a synchronized bounding box, a
//! [`StateAnimator`](crate::animation::StateAnimator) for animation — and
//! implements [`SceneNode`] on top of them.

mod components;
mod path;

pub use self::components::{Collidable, Transformable};
pub use self::path::{CubicBezier, Path, PathNode, PathRig};

use crate::scene::Scene;
use crate::tasks::TaskSender;
use sylva_core::math::{Rect, Transform, Vec2};
use sylva_core::renderer::RenderBackend;

/// Per-frame context handed to a node's update hooks.
pub struct UpdateContext<'a> {
    /// The index of the update thread running this hook, `0..update_threads`.
    pub thread_num: usize,
    /// The duration of the last frame in microseconds.
    pub delta_micros: f32,
    /// The scene the node currently belongs to.
    pub scene: &'a Scene,
    /// Submits work to run on the main thread before the next render.
    pub tasks: &'a TaskSender,
}

/// Per-frame context handed to a node's render hook. Main thread only.
pub struct RenderContext<'a> {
    /// The backend draw commands are submitted to.
    pub backend: &'a mut dyn RenderBackend,
    /// The combined world-to-screen and camera matrix for this frame.
    pub camera_to_screen: Transform,
    /// The world-space size of the visible area.
    pub viewport: Vec2,
}

/// The base contract every unit of scene content implements.
///
/// Scenes hold nodes by shared ownership (`Arc<dyn SceneNode>`): a node may
/// live in at most one scene's live set at a time, but its lifetime may
/// extend past removal while other holders keep it alive. Hooks therefore
/// take `&self`; nodes synchronize their own interior state.
///
/// Hook ordering per frame: `pre_update` for every node completes (across
/// all update threads) before any node's `update` runs; `render` only runs
/// after every `update` finished. `begin`/`end` run on the main thread when
/// the node is committed to / removed from the live set, between frames.
///
/// Every hook is fallible: an error is logged at the call site and the node
/// is skipped for that frame — one misbehaving node never stalls the frame
/// loop.
#[allow(unused_variables)]
pub trait SceneNode: Send + Sync {
    /// The draw-order key: lower values are drawn first. Captured when the
    /// node is committed to the scene.
    fn z_position(&self) -> f32 {
        0.0
    }

    /// The node's average measured update cost in microseconds, used to
    /// load-balance the partition of nodes across update threads. `None`
    /// means uncalibrated; such nodes are assigned a default cost.
    fn update_time(&self) -> Option<f32> {
        None
    }

    /// The world-space bounding box, recomputed during `pre_update` so other
    /// nodes may read it during `update`.
    fn bounding_box(&self) -> Rect {
        Rect::ZERO
    }

    /// Called once, on the main thread, when the node is committed to the
    /// scene's live set.
    fn begin(&self, scene: &Scene) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called before `update` each frame; the place to refresh derived state
    /// (bounding boxes, blended poses) other nodes will read.
    fn pre_update(&self, ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called each frame after every node's `pre_update` has completed.
    fn update(&self, ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called on the main thread to draw the node.
    fn render(&self, ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once, on the main thread, when the node is removed from the
    /// scene's live set.
    fn end(&self, scene: &Scene) -> anyhow::Result<()> {
        Ok(())
    }
}
