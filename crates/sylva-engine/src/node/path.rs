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

use super::components::{Collidable, Transformable};
use super::{RenderContext, SceneNode, UpdateContext};
use crate::animation::{StateAnimator, VertexSkinner, VertexWeights};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use sylva_core::math::{Color, Rect, Vec2};
use sylva_core::renderer::DrawCommand;

/// How many line segments each bezier is flattened into for rendering.
const FLATTEN_SEGMENTS: usize = 16;

/// A single cubic bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CubicBezier {
    /// The start point of the segment.
    pub start: Vec2,
    /// The first control point.
    pub control1: Vec2,
    /// The second control point.
    pub control2: Vec2,
    /// The end point of the segment.
    pub end: Vec2,
}

impl CubicBezier {
    /// Creates a segment from its four control points.
    pub const fn new(start: Vec2, control1: Vec2, control2: Vec2, end: Vec2) -> Self {
        Self {
            start,
            control1,
            control2,
            end,
        }
    }

    /// Evaluates the curve at `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.start * (u * u * u)
            + self.control1 * (3.0 * u * u * t)
            + self.control2 * (3.0 * u * t * t)
            + self.end * (t * t * t)
    }
}

/// A closed shape made of cubic bezier segments.
///
/// Paths form the pose data of animated shape nodes. Blending poses is a
/// weighted point sum, so `Path` carries the blend algebra: component-wise
/// addition and scalar multiplication over every control point. Two blended
/// paths must have the same segment count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    /// The bezier segments of the path, in winding order.
    pub beziers: Vec<CubicBezier>,
}

impl Path {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path of `n` segments with every point at the origin.
    pub fn with_len(n: usize) -> Self {
        Self {
            beziers: vec![CubicBezier::default(); n],
        }
    }

    /// The number of bezier segments.
    pub fn len(&self) -> usize {
        self.beziers.len()
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.beziers.is_empty()
    }

    /// Scales every control point of every segment.
    pub fn scaled(&self, value: f32) -> Self {
        Self {
            beziers: self
                .beziers
                .iter()
                .map(|b| CubicBezier {
                    start: b.start * value,
                    control1: b.control1 * value,
                    control2: b.control2 * value,
                    end: b.end * value,
                })
                .collect(),
        }
    }

    /// Adds another path's control points into this one, point by point.
    ///
    /// The paths must have the same segment count.
    pub fn accumulate(&mut self, other: &Self) {
        debug_assert_eq!(
            self.beziers.len(),
            other.beziers.len(),
            "blended paths must have the same segment count"
        );
        for (a, b) in self.beziers.iter_mut().zip(&other.beziers) {
            a.start += b.start;
            a.control1 += b.control1;
            a.control2 += b.control2;
            a.end += b.end;
        }
    }

    /// Visits every control point mutably, in segment order.
    pub fn for_each_point_mut(&mut self, mut f: impl FnMut(&mut Vec2)) {
        for b in &mut self.beziers {
            f(&mut b.start);
            f(&mut b.control1);
            f(&mut b.control2);
            f(&mut b.end);
        }
    }

    /// Collects every control point, in segment order.
    pub fn points(&self) -> Vec<Vec2> {
        let mut pts = Vec::with_capacity(self.beziers.len() * 4);
        for b in &self.beziers {
            pts.push(b.start);
            pts.push(b.control1);
            pts.push(b.control2);
            pts.push(b.end);
        }
        pts
    }

    /// Flattens the path into a polyline outline.
    pub fn flatten(&self, segments: usize) -> Vec<Vec2> {
        let mut out = Vec::with_capacity(self.beziers.len() * segments);
        for b in &self.beziers {
            // Skip t = 1; it coincides with the next segment's start.
            for i in 0..segments {
                let t = i as f32 / segments as f32;
                out.push(b.point_at(t));
            }
        }
        out
    }
}

/// A link from a path node to a skeletal rig.
pub struct PathRig {
    /// The rig control points are skinned against.
    pub skinner: Arc<dyn VertexSkinner>,
    /// One influence set per control point, in segment order (four control
    /// points per bezier).
    pub weights: Vec<VertexWeights>,
}

/// State behind the node's mutex: the FSM and the blended result.
struct PathNodeState<K> {
    animator: StateAnimator<K, Path>,
    /// The blended (and skinned, when rigged) path for the current frame,
    /// in the node's local space.
    current: Path,
}

/// A scene node drawing a filled bezier shape, animated between named path
/// poses by a [`StateAnimator`].
///
/// Each frame, `pre_update` advances the state machine, blends the (at most
/// two) composed poses by their weights, optionally skins every control
/// point through the linked rig, and refreshes the world-space bounding box.
/// `render` flattens the blended path and submits a single draw command.
pub struct PathNode<K> {
    state: Mutex<PathNodeState<K>>,
    transform: Transformable,
    bounds: Collidable,
    rig: Option<PathRig>,
    /// The fill color of the shape.
    color: Color,
    z_position: f32,
    update_time: Option<f32>,
}

impl<K> PathNode<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates a node resting in `initial` with that state's pose
    /// registered.
    pub fn new(initial: K, pose: Path, color: Color) -> Self {
        let mut animator = StateAnimator::new(initial);
        animator.add_pose(initial, pose.clone());
        Self {
            state: Mutex::new(PathNodeState {
                animator,
                current: pose,
            }),
            transform: Transformable::default(),
            bounds: Collidable::default(),
            rig: None,
            color,
            z_position: 0.0,
            update_time: None,
        }
    }

    /// Sets the draw-order key. Takes effect when the node is (re)added to a
    /// scene.
    pub fn set_z_position(&mut self, z: f32) {
        self.z_position = z;
    }

    /// Records the node's calibrated average update cost in microseconds.
    pub fn set_update_time(&mut self, micros: f32) {
        self.update_time = Some(micros);
    }

    /// Links the node's control points to a skeletal rig.
    pub fn set_rig(&mut self, rig: PathRig) {
        self.rig = Some(rig);
    }

    /// The transform capability of this node.
    pub fn transformable(&self) -> &Transformable {
        &self.transform
    }

    /// Registers (or replaces) the path pose for a state.
    pub fn add_pose(&self, state: K, pose: Path) {
        self.state.lock().unwrap().animator.add_pose(state, pose);
    }

    /// Removes the path pose for a state, if any.
    pub fn remove_pose(&self, state: K) {
        self.state.lock().unwrap().animator.remove_pose(state);
    }

    /// Begins a transition to `state` over `duration` seconds.
    pub fn animate_to(&self, state: K, duration: f32) {
        self.state.lock().unwrap().animator.animate_to(state, duration);
    }

    /// Plays an ordered list of (state, duration) stages once.
    pub fn animate_once(&self, stages: Vec<(K, f32)>) {
        self.state.lock().unwrap().animator.animate_once(stages);
    }

    /// Plays an ordered list of (state, duration) stages in an infinite
    /// loop.
    pub fn animate_loop(&self, stages: Vec<(K, f32)>) {
        self.state.lock().unwrap().animator.animate_loop(stages);
    }

    /// Immediately sets the authoritative state.
    pub fn set_state(&self, state: K) {
        self.state.lock().unwrap().animator.set_state(state);
    }

    /// The single discrete state the blend is currently closest to.
    pub fn current_state(&self) -> K {
        self.state.lock().unwrap().animator.current_state()
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.state.lock().unwrap().animator.is_transitioning()
    }

    /// A copy of the blended path for the current frame, in local space.
    pub fn current_path(&self) -> Path {
        self.state.lock().unwrap().current.clone()
    }
}

impl<K> SceneNode for PathNode<K>
where
    K: Copy + Eq + Hash + Debug + Send + Sync + 'static,
{
    fn z_position(&self) -> f32 {
        self.z_position
    }

    fn update_time(&self) -> Option<f32> {
        self.update_time
    }

    fn bounding_box(&self) -> Rect {
        self.bounds.bounding_box()
    }

    fn pre_update(&self, ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.animator.update_state(ctx.delta_micros);

        // Blend the composed poses by their weights.
        let composition = state.animator.composition();
        let mut blended: Option<Path> = None;
        for (key, weight) in &composition {
            let Some(pose) = state.animator.pose_ref(*key) else {
                anyhow::bail!("path pose missing for state {key:?}");
            };
            if let Some(path) = blended.as_mut() {
                path.accumulate(&pose.scaled(*weight));
            } else {
                blended = Some(pose.scaled(*weight));
            }
        }
        let mut blended = blended.expect("composition is never empty");

        // Deform through the rig, when linked. The synchronized accessor is
        // used because this node may pre-update before the rig does in the
        // same frame.
        if let Some(rig) = &self.rig {
            let mut index = 0;
            blended.for_each_point_mut(|p| {
                if let Some(weights) = rig.weights.get(index) {
                    *p = rig.skinner.skin_vertex(*p, weights, ctx.delta_micros);
                }
                index += 1;
            });
        }

        // Refresh the world-space bounding box from the transformed control
        // points.
        let transform = self.transform.transform();
        let world_points: Vec<Vec2> = blended
            .points()
            .into_iter()
            .map(|p| transform.transform_point(p))
            .collect();
        if let Some(rect) = Rect::from_points(&world_points) {
            self.bounds.set_bounding_box(rect);
        }

        state.current = blended;
        Ok(())
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        let vertices = {
            let state = self.state.lock().unwrap();
            state.current.flatten(FLATTEN_SEGMENTS)
        };
        if vertices.is_empty() {
            return Ok(());
        }
        let command = DrawCommand {
            vertices,
            color: self.color,
            transform: ctx.camera_to_screen * self.transform.transform(),
            z_position: self.z_position,
        };
        ctx.backend.draw(&command)?;
        Ok(())
    }
}
