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

//! The reusable frame barrier coordinating update threads with the render
//! thread.
//!
//! Every frame moves through three synchronization points:
//!
//! 1. **Release** — the main thread bumps the generation counter and wakes
//!    every worker.
//! 2. **Pre-update barrier** — no worker starts its `update` pass until all
//!    workers have finished `pre_update` for the current generation.
//! 3. **Completion** — the main thread blocks until every worker has
//!    finished its `update` pass, then renders.
//!
//! The explicit generation counter guards every wait against stale wakeups:
//! a thread only proceeds past a barrier once all peers for the *current*
//! generation have arrived. Shutdown flips a flag and wakes every waiter;
//! the flag is checked immediately after every wait so termination can never
//! deadlock.

use std::sync::{Condvar, Mutex};

/// A worker's view of one released frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTicket {
    /// The generation of the released frame.
    pub generation: u64,
    /// The duration of the previous frame in microseconds.
    pub delta_micros: f32,
}

#[derive(Debug)]
struct SyncState {
    /// Monotonic frame counter; bumped once per released frame.
    generation: u64,
    /// The delta handed to workers for the current generation.
    delta_micros: f32,
    /// The fixed number of participating workers.
    workers: usize,
    /// Workers that have finished pre_update for the current generation.
    pre_updated: usize,
    /// Workers that have finished update for the current generation.
    completed: usize,
    /// Set once at application shutdown; never cleared.
    shutdown: bool,
}

/// The condvar barrier shared by the main thread and the update workers.
#[derive(Debug)]
pub struct FrameSync {
    state: Mutex<SyncState>,
    frame_released: Condvar,
    pre_update_done: Condvar,
    frame_complete: Condvar,
}

impl FrameSync {
    /// Creates a barrier for a fixed pool of `workers` update threads.
    pub fn new(workers: usize) -> Self {
        Self {
            state: Mutex::new(SyncState {
                generation: 0,
                delta_micros: 0.0,
                workers,
                pre_updated: 0,
                completed: 0,
                shutdown: false,
            }),
            frame_released: Condvar::new(),
            pre_update_done: Condvar::new(),
            frame_complete: Condvar::new(),
        }
    }

    /// The number of workers the barrier synchronizes.
    pub fn worker_count(&self) -> usize {
        self.state.lock().unwrap().workers
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.state.lock().unwrap().shutdown
    }

    /// Main thread: releases the next frame to the workers and returns its
    /// generation.
    ///
    /// Must not be called while a frame is in flight (i.e. before
    /// [`wait_frame_complete`](Self::wait_frame_complete) returned for the
    /// previous generation).
    pub fn release_frame(&self, delta_micros: f32) -> u64 {
        let generation = {
            let mut state = self.state.lock().unwrap();
            state.generation += 1;
            state.pre_updated = 0;
            state.completed = 0;
            state.delta_micros = delta_micros;
            state.generation
        };
        self.frame_released.notify_all();
        generation
    }

    /// Worker: blocks until a frame newer than `last_generation` is released.
    ///
    /// Returns `None` when the application is shutting down; the worker must
    /// exit its loop.
    pub fn wait_for_frame(&self, last_generation: u64) -> Option<FrameTicket> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.shutdown {
                return None;
            }
            if state.generation != last_generation {
                return Some(FrameTicket {
                    generation: state.generation,
                    delta_micros: state.delta_micros,
                });
            }
            state = self.frame_released.wait(state).unwrap();
        }
    }

    /// Worker: signals that this worker finished its `pre_update` pass for
    /// `generation` and blocks until every worker has.
    ///
    /// Returns `false` when woken by shutdown instead of by the barrier.
    pub fn finish_pre_update(&self, generation: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        state.pre_updated += 1;
        if state.pre_updated >= state.workers {
            self.pre_update_done.notify_all();
        }
        while !state.shutdown && state.generation == generation && state.pre_updated < state.workers
        {
            state = self.pre_update_done.wait(state).unwrap();
        }
        !state.shutdown
    }

    /// Worker: signals that this worker finished its `update` pass for the
    /// current generation. The last arrival wakes the main thread.
    pub fn finish_update(&self, _generation: u64) {
        let mut state = self.state.lock().unwrap();
        state.completed += 1;
        if state.completed >= state.workers {
            self.frame_complete.notify_all();
        }
    }

    /// Main thread: blocks until every worker finished its `update` pass for
    /// `generation` (or shutdown was requested).
    pub fn wait_frame_complete(&self, generation: u64) {
        let mut state = self.state.lock().unwrap();
        while !state.shutdown && state.generation == generation && state.completed < state.workers
        {
            state = self.frame_complete.wait(state).unwrap();
        }
    }

    /// Requests shutdown and wakes every waiter on every condition variable.
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.shutdown = true;
        }
        self.frame_released.notify_all();
        self.pre_update_done.notify_all();
        self.frame_complete.notify_all();
    }
}
