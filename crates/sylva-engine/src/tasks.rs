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

//! The main-thread task queue.
//!
//! Certain operations (anything touching the rendering context) must execute
//! on the thread that owns it. Update threads submit such work through a
//! [`TaskSender`]; the application drains the queue exactly once per frame on
//! the main thread, in FIFO order, before rendering.
//!
//! The queue is its own channel, deliberately separate from the frame
//! barrier's lock, so task submission can never contend with frame pacing.

/// A deferred unit of main-thread work.
pub type MainThreadTask = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// The submitting half of the main-thread task queue. Cheap to clone and
/// safe to use from any update thread.
#[derive(Clone)]
pub struct TaskSender {
    sender: flume::Sender<MainThreadTask>,
}

impl TaskSender {
    /// Queues `task` to run on the main thread before the next render.
    ///
    /// If the application has already shut down the task is dropped with a
    /// warning; there is no main thread left to run it.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        if self.sender.send(Box::new(task)).is_err() {
            log::warn!("Main-thread task dropped: the queue receiver is gone.");
        }
    }
}

/// The draining half of the main-thread task queue, owned by the application
/// loop.
pub struct TaskQueue {
    receiver: flume::Receiver<MainThreadTask>,
}

impl TaskQueue {
    /// Creates a connected sender/queue pair.
    pub fn new() -> (TaskSender, TaskQueue) {
        let (sender, receiver) = flume::unbounded();
        (TaskSender { sender }, TaskQueue { receiver })
    }

    /// Runs every queued task in submission order and returns how many ran.
    ///
    /// A task error is logged and does not abort the drain.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        for task in self.receiver.try_iter() {
            if let Err(e) = task() {
                log::error!("Main-thread task failed: {e:#}");
            }
            ran += 1;
        }
        ran
    }
}
