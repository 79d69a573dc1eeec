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

use super::skeleton::{Skeleton, VertexWeights};
use super::state::StateAnimator;
use crate::error::AnimationError;
use crate::node::{RenderContext, SceneNode, UpdateContext};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Mutex;
use sylva_core::math::{Transform, Vec2};

/// The ability to deform vertices against an animated rig.
///
/// Nodes that link to a rig (e.g. a path node skinning its control points)
/// depend on this trait rather than on a concrete animator type, so the rig's
/// state-key type never leaks into theirs.
pub trait VertexSkinner: Send + Sync {
    /// Transforms a vertex, recalculating the rig for this frame first if
    /// needed. Safe to call from any update thread during pre-update.
    fn skin_vertex(&self, vert: Vec2, weights: &VertexWeights, delta_micros: f32) -> Vec2;

    /// Transforms a vertex against the rig as it currently is, skipping the
    /// freshness check. Only meaningful after this frame's pre-update pass
    /// has completed; callers that cannot guarantee that ordering must use
    /// [`skin_vertex`](Self::skin_vertex) instead.
    fn skin_vertex_no_recalc(&self, vert: Vec2, weights: &VertexWeights) -> Vec2;
}

/// State behind the animator's mutex: the FSM, the rig and the per-frame
/// offset cache.
#[derive(Debug)]
struct SkeletalState<K> {
    animator: StateAnimator<K, Skeleton>,
    base: Skeleton,
    offsets: Vec<Transform>,
    /// Whether the offsets have been recalculated for the current frame.
    /// Set by the first recalculation, cleared again every update.
    recalculated: bool,
}

/// A scene node that blends between named skeleton poses.
///
/// Owns a [`StateAnimator`] over [`Skeleton`] poses and produces, once per
/// frame, the per-bone offset transforms used to skin vertices: for each
/// bone, the pose's `world_to_bone` (or the component-wise lerp of two poses'
/// matrices while a transition is blending) multiplied by the base skeleton's
/// `inverse_world_to_bone`.
///
/// Reads may come from the render thread or from other nodes' update hooks
/// while recalculation happens on an update thread, so the whole
/// read-modify-write — the freshness flag, the FSM advance and the blend —
/// sits behind one mutex.
#[derive(Debug)]
pub struct SkeletalAnimator<K> {
    inner: Mutex<SkeletalState<K>>,
    z_position: f32,
}

impl<K> SkeletalAnimator<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates an animator resting in `initial`, rigged against `base`.
    pub fn new(initial: K, base: Skeleton) -> Self {
        Self {
            inner: Mutex::new(SkeletalState {
                animator: StateAnimator::new(initial),
                base,
                offsets: Vec::new(),
                recalculated: false,
            }),
            z_position: 0.0,
        }
    }

    /// Sets the draw-order key. Takes effect when the node is (re)added to
    /// a scene.
    pub fn set_z_position(&mut self, z: f32) {
        self.z_position = z;
    }

    /// Replaces the base skeleton vertices are rigged against.
    pub fn set_base(&self, base: Skeleton) {
        self.inner.lock().unwrap().base = base;
    }

    /// Registers (or replaces) the skeleton pose for a state.
    pub fn add_pose(&self, state: K, pose: Skeleton) {
        self.inner.lock().unwrap().animator.add_pose(state, pose);
    }

    /// Removes the skeleton pose for a state, if any.
    pub fn remove_pose(&self, state: K) {
        self.inner.lock().unwrap().animator.remove_pose(state);
    }

    /// Returns a copy of the skeleton pose for a state.
    pub fn pose(&self, state: K) -> Result<Skeleton, AnimationError> {
        self.inner.lock().unwrap().animator.pose(state)
    }

    /// Begins a transition to `state` over `duration` seconds.
    pub fn animate_to(&self, state: K, duration: f32) {
        self.inner.lock().unwrap().animator.animate_to(state, duration);
    }

    /// Plays an ordered list of (state, duration) stages once.
    pub fn animate_once(&self, stages: Vec<(K, f32)>) {
        self.inner.lock().unwrap().animator.animate_once(stages);
    }

    /// Plays an ordered list of (state, duration) stages in an infinite loop.
    pub fn animate_loop(&self, stages: Vec<(K, f32)>) {
        self.inner.lock().unwrap().animator.animate_loop(stages);
    }

    /// Immediately sets the authoritative state.
    pub fn set_state(&self, state: K) {
        self.inner.lock().unwrap().animator.set_state(state);
    }

    /// The single discrete state the blend is currently closest to.
    pub fn current_state(&self) -> K {
        self.inner.lock().unwrap().animator.current_state()
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.inner.lock().unwrap().animator.is_transitioning()
    }

    /// Recalculates the per-bone offsets for this frame if they have not
    /// been recalculated yet.
    pub fn recalculate(&self, delta_micros: f32) {
        let mut state = self.inner.lock().unwrap();
        Self::recalculate_locked(&mut state, delta_micros);
    }

    /// The per-bone offsets for this frame, recalculating first. Must not be
    /// called during the update phase; use
    /// [`offsets_no_recalc`](Self::offsets_no_recalc) there.
    pub fn offsets(&self, delta_micros: f32) -> Vec<Transform> {
        let mut state = self.inner.lock().unwrap();
        Self::recalculate_locked(&mut state, delta_micros);
        state.offsets.clone()
    }

    /// The per-bone offsets as they currently are, without recalculation.
    /// Only meaningful after this frame's pre-update pass.
    pub fn offsets_no_recalc(&self) -> Vec<Transform> {
        self.inner.lock().unwrap().offsets.clone()
    }

    fn recalculate_locked(state: &mut SkeletalState<K>, delta_micros: f32) {
        // Recompute at most once per frame, however many call sites query
        // the skeleton.
        if state.recalculated {
            return;
        }
        state.animator.update_state(delta_micros);
        state.recalculated = true;

        let composition = state.animator.composition();
        let Some(first) = state.animator.pose_ref(composition[0].0) else {
            log::error!(
                "Skeletal pose missing for state {:?}; skipping recalculation.",
                composition[0].0
            );
            return;
        };

        if state.offsets.len() != first.bones.len() {
            state
                .offsets
                .resize(first.bones.len(), Transform::IDENTITY);
        }

        // Single pose: the offset is just inverse-base times the pose.
        if composition.len() == 1 {
            let pose_bones: Vec<Transform> =
                first.bones.iter().map(|b| b.world_to_bone).collect();
            for (i, world_to_bone) in pose_bones.iter().enumerate() {
                state.offsets[i] = state.base.bones[i].inverse_world_to_bone * *world_to_bone;
            }
            return;
        }

        // Two poses: lerp the transformation matrices component-wise by the
        // composition weights, then apply the inverse base.
        let (from_key, from_weight) = composition[0];
        let (to_key, to_weight) = composition[1];
        let Some(to_pose) = state.animator.pose_ref(to_key) else {
            log::error!(
                "Skeletal pose missing for state {to_key:?}; skipping recalculation."
            );
            return;
        };
        let from_pose = state
            .animator
            .pose_ref(from_key)
            .expect("composition state verified above");
        let blended: Vec<Transform> = from_pose
            .bones
            .iter()
            .zip(&to_pose.bones)
            .map(|(from, to)| from.world_to_bone * from_weight + to.world_to_bone * to_weight)
            .collect();
        for (i, world_to_bone) in blended.iter().enumerate() {
            state.offsets[i] = state.base.bones[i].inverse_world_to_bone * *world_to_bone;
        }
    }
}

impl<K> VertexSkinner for SkeletalAnimator<K>
where
    K: Copy + Eq + Hash + Debug + Send + Sync,
{
    fn skin_vertex(&self, vert: Vec2, weights: &VertexWeights, delta_micros: f32) -> Vec2 {
        let mut state = self.inner.lock().unwrap();
        Self::recalculate_locked(&mut state, delta_micros);
        Skeleton::skin(&state.offsets, vert, weights)
    }

    fn skin_vertex_no_recalc(&self, vert: Vec2, weights: &VertexWeights) -> Vec2 {
        let state = self.inner.lock().unwrap();
        Skeleton::skin(&state.offsets, vert, weights)
    }
}

impl<K> SceneNode for SkeletalAnimator<K>
where
    K: Copy + Eq + Hash + Debug + Send + Sync + 'static,
{
    fn z_position(&self) -> f32 {
        self.z_position
    }

    fn pre_update(&self, ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        self.recalculate(ctx.delta_micros);
        Ok(())
    }

    fn update(&self, _ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        // Flag the cached offsets as stale so next frame's first reader
        // recomputes them.
        self.inner.lock().unwrap().recalculated = false;
        Ok(())
    }

    fn render(&self, _ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        // A rig has nothing to draw; nodes linked to it render themselves.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::skeleton::BoneWeight;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Stance {
        Idle,
        Raised,
    }

    const SECOND: f32 = 1_000_000.0;

    fn base_skeleton() -> Skeleton {
        Skeleton::from_parts(&[(-1, 1.0, 0.2), (0, 1.5, -0.4), (1, 0.75, 0.9)])
    }

    fn assert_identity(t: Transform) {
        for i in 0..3 {
            assert_relative_eq!(t.cols[i].x, Transform::IDENTITY.cols[i].x, epsilon = 1e-4);
            assert_relative_eq!(t.cols[i].y, Transform::IDENTITY.cols[i].y, epsilon = 1e-4);
        }
    }

    #[test]
    fn pose_equal_to_base_yields_identity_offsets() {
        let animator = SkeletalAnimator::new(Stance::Idle, base_skeleton());
        animator.add_pose(Stance::Idle, base_skeleton());

        for offset in animator.offsets(16_000.0) {
            assert_identity(offset);
        }
    }

    #[test]
    fn midway_blend_is_the_matrix_average() {
        let base = base_skeleton();
        let raised = Skeleton::from_parts(&[(-1, 1.0, 0.8), (0, 1.5, 0.1), (1, 0.75, 1.3)]);
        let animator = SkeletalAnimator::new(Stance::Idle, base.clone());
        animator.add_pose(Stance::Idle, base.clone());
        animator.add_pose(Stance::Raised, raised.clone());

        animator.animate_to(Stance::Raised, 1.0);
        // A single half-second update puts the blend exactly at t = 0.5.
        let offsets = animator.offsets(0.5 * SECOND);

        for (i, offset) in offsets.iter().enumerate() {
            let lerped =
                base.bones[i].world_to_bone * 0.5 + raised.bones[i].world_to_bone * 0.5;
            let expected = base.bones[i].inverse_world_to_bone * lerped;
            for c in 0..3 {
                assert_relative_eq!(offset.cols[c].x, expected.cols[c].x, epsilon = 1e-4);
                assert_relative_eq!(offset.cols[c].y, expected.cols[c].y, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn recalculation_runs_at_most_once_per_frame() {
        let animator = SkeletalAnimator::new(Stance::Idle, base_skeleton());
        animator.add_pose(Stance::Idle, base_skeleton());
        animator.add_pose(Stance::Raised, base_skeleton());

        animator.animate_to(Stance::Raised, 1.0);
        animator.recalculate(0.25 * SECOND);
        // A second recalculation in the same frame must not advance the FSM.
        animator.recalculate(0.25 * SECOND);
        assert!(animator.is_transitioning());
        assert_eq!(animator.current_state(), Stance::Idle);

        // Clearing the flag (what `update` does) lets the next frame advance.
        animator.inner.lock().unwrap().recalculated = false;
        animator.recalculate(0.5 * SECOND);
        assert_eq!(animator.current_state(), Stance::Raised);
    }

    #[test]
    fn skinning_follows_the_current_blend() {
        let base = Skeleton::from_parts(&[(-1, 0.0, 0.0)]);
        let mut shifted = base.clone();
        shifted.bones[0] =
            Skeleton::calculate_bone(&[], -1, 2.0, 0.0);
        let animator = SkeletalAnimator::new(Stance::Idle, base.clone());
        animator.add_pose(Stance::Idle, base);
        animator.add_pose(Stance::Raised, shifted);

        let weights: VertexWeights = [
            BoneWeight::new(0, 1.0),
            BoneWeight::NONE,
            BoneWeight::NONE,
            BoneWeight::NONE,
        ];

        // At rest the offset is the identity.
        let v = animator.skin_vertex(Vec2::new(1.0, 1.0), &weights, 16_000.0);
        assert_relative_eq!(v.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-4);
    }
}
