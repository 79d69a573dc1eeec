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

use crate::error::AnimationError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// The finite-state blend engine.
///
/// Holds named poses of type `S` keyed by `K` and tracks the machine's
/// current state. When idle, the current state's pose composes the frame at
/// full weight. During a transition the composition is the pair
/// `(state, 1 - t)` and `(target, t)` with `t` in `[0, 1]` — never more than
/// two terms, which bounds blend cost per frame regardless of how long an
/// animation sequence is.
///
/// Time units are part of the contract: [`update_state`](Self::update_state)
/// takes the frame delta in **microseconds**, transition durations are in
/// **seconds**.
///
/// The animator carries no internal synchronization. The owning node
/// serializes access (typically behind its own mutex) so that mutators are
/// never interleaved with `update_state`.
#[derive(Debug, Clone)]
pub struct StateAnimator<K, S> {
    /// The registered poses for each state.
    poses: HashMap<K, S>,
    /// The authoritative state.
    state: K,
    /// The state being transitioned to, meaningful only while transitioning.
    transition_state: K,
    /// Whether a transition is in flight.
    transitioning: bool,
    /// Elapsed fraction of the current transition, 0..1.
    transition_time: f32,
    /// Duration of the current transition in seconds.
    transition_duration: f32,
    /// Queued (state, duration) stages for a multi-step animation.
    animation: Vec<(K, f32)>,
    /// Index of the stage currently transitioning.
    animation_index: usize,
    /// Whether the queued animation wraps around forever.
    animation_loop: bool,
}

impl<K, S> StateAnimator<K, S>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates an animator resting in `initial` with no poses registered.
    pub fn new(initial: K) -> Self {
        Self {
            poses: HashMap::new(),
            state: initial,
            transition_state: initial,
            transitioning: false,
            transition_time: 0.0,
            transition_duration: 0.0,
            animation: Vec::new(),
            animation_index: 0,
            animation_loop: false,
        }
    }

    /// Registers (or replaces) the pose for a state.
    pub fn add_pose(&mut self, state: K, pose: S) {
        self.poses.insert(state, pose);
    }

    /// Removes the pose registered for a state, if any.
    pub fn remove_pose(&mut self, state: K) {
        self.poses.remove(&state);
    }

    /// Returns a copy of the pose for a state.
    ///
    /// A copy is returned so callers never hold references into the pose map
    /// across threads. Requesting an unregistered state is a programming
    /// error and reported as [`AnimationError::StateNotFound`].
    pub fn pose(&self, state: K) -> Result<S, AnimationError>
    where
        S: Clone,
    {
        self.poses
            .get(&state)
            .cloned()
            .ok_or_else(|| AnimationError::StateNotFound(format!("{state:?}")))
    }

    /// Borrows the pose for a state. Intended for same-thread blend loops
    /// that already hold the owning node's lock.
    pub fn pose_ref(&self, state: K) -> Option<&S> {
        self.poses.get(&state)
    }

    /// Begins a single transition from the current state to `state` over
    /// `duration` seconds, discarding any queued animation.
    ///
    /// A duration of 0 collapses to an instantaneous change: the next
    /// `update_state` call with any positive delta commits the target.
    pub fn animate_to(&mut self, state: K, duration: f32) {
        self.animation.clear();
        self.transitioning = true;
        self.transition_time = 0.0;
        self.transition_duration = duration;
        self.transition_state = state;
    }

    /// Queues an ordered list of (state, duration) stages and plays it once.
    pub fn animate_once(&mut self, stages: Vec<(K, f32)>) {
        self.start_staged(stages, false);
    }

    /// Queues an ordered list of (state, duration) stages and plays it in an
    /// infinite loop.
    pub fn animate_loop(&mut self, stages: Vec<(K, f32)>) {
        self.start_staged(stages, true);
    }

    fn start_staged(&mut self, stages: Vec<(K, f32)>, looping: bool) {
        if stages.is_empty() {
            log::warn!("Staged animation requested with no stages; ignoring.");
            return;
        }
        let (first_state, first_duration) = stages[0];
        self.animation = stages;
        self.animation_index = 0;
        self.animation_loop = looping;

        self.transitioning = true;
        self.transition_time = 0.0;
        self.transition_duration = first_duration;
        self.transition_state = first_state;
    }

    /// Immediately and unconditionally sets the authoritative state,
    /// clearing any in-flight transition and queued animation.
    pub fn set_state(&mut self, state: K) {
        self.animation.clear();
        self.transitioning = false;
        self.state = state;
    }

    /// Advances the transition by one frame.
    ///
    /// `delta_micros` is the duration of the last frame in microseconds.
    /// No-op while idle. When the transition completes, the target becomes
    /// authoritative and the queued animation (if any) advances to its next
    /// stage — wrapping when looping, terminating and clearing the queue
    /// otherwise.
    pub fn update_state(&mut self, delta_micros: f32) {
        if !self.transitioning {
            return;
        }
        self.transition_time += delta_micros / (1_000_000.0 * self.transition_duration);

        if self.transition_time >= 1.0 {
            self.state = self.transition_state;

            // No further stages queued.
            if self.animation.is_empty() {
                self.transitioning = false;
                return;
            }

            self.animation_index += 1;
            if self.animation_index >= self.animation.len() {
                if !self.animation_loop {
                    self.animation.clear();
                    self.transitioning = false;
                    return;
                }
                self.animation_index = 0;
            }

            // Prepare the next stage.
            self.transition_time = 0.0;
            self.transition_duration = self.animation[self.animation_index].1;
            self.transition_state = self.animation[self.animation_index].0;
        }
    }

    /// The state composition for this frame.
    ///
    /// `[(state, 1)]` while idle, `[(state, 1 - t), (target, t)]` during a
    /// transition. The weights always sum to 1.
    pub fn composition(&self) -> Vec<(K, f32)> {
        if !self.transitioning {
            return vec![(self.state, 1.0)];
        }
        vec![
            (self.state, 1.0 - self.transition_time),
            (self.transition_state, self.transition_time),
        ]
    }

    /// The single discrete state the blend is currently closest to: during a
    /// transition past the halfway point this is the target state.
    pub fn current_state(&self) -> K {
        if !self.transitioning {
            return self.state;
        }
        if self.transition_time > 0.5 {
            self.transition_state
        } else {
            self.state
        }
    }

    /// Whether a transition between two states is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }
}
