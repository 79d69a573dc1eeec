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

//! The application: window ownership, the update-thread pool, and the frame
//! loop.
//!
//! One main thread owns the window and the render backend and drives the
//! frame loop; a fixed pool of update threads persists for the application
//! lifetime, blocking on the frame barrier between frames. Per frame, the
//! main thread: paces the clock, pumps and dispatches window events,
//! finalizes any pending scene presentation, releases the update threads,
//! waits for them on the barrier, drains the main-thread task queue, renders
//! the presented scene, and applies the scene's deferred node mutations.

mod frame_sync;

pub use self::frame_sync::{FrameSync, FrameTicket};

use crate::context::EngineContext;
use crate::scene::Scene;
use crate::settings::Settings;
use crate::tasks::{TaskQueue, TaskSender};
use anyhow::Context as _;
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use sylva_core::event::{EventDispatcher, WindowEvent};
use sylva_core::platform::PlatformWindow;
use sylva_core::renderer::RenderBackend;
use sylva_core::FrameClock;

/// A hook run once on the main thread at application start or end.
type LifecycleHook = Box<dyn FnOnce(&Application)>;

/// The scene slots shared between the main thread and the update workers.
struct SceneSlots {
    /// The scene currently presented; read by workers every frame, swapped
    /// only on the main thread between frames.
    presented: RwLock<Option<Arc<Scene>>>,
    /// The scene queued for presentation at the next frame boundary.
    pending: Mutex<Option<Arc<Scene>>>,
}

/// A clone-able handle for queueing scene presentations from any thread.
///
/// The swap itself still happens on the main thread at the next frame
/// boundary; this handle only fills the pending slot.
#[derive(Clone)]
pub struct ScenePresenter {
    scenes: Arc<SceneSlots>,
}

impl ScenePresenter {
    /// Queues `scene` for presentation at the next frame boundary.
    pub fn present(&self, scene: Arc<Scene>) {
        *self.scenes.pending.lock().unwrap() = Some(scene);
    }
}

/// The main application type: owns the window, the settings, the presented
/// scene and the update-thread pool, and drives the render loop.
pub struct Application {
    name: String,
    window: Box<dyn PlatformWindow>,
    backend: Box<dyn RenderBackend>,
    settings: Settings,
    dispatcher: Arc<EventDispatcher>,
    frame_sync: Arc<FrameSync>,
    scenes: Arc<SceneSlots>,
    task_sender: TaskSender,
    task_queue: TaskQueue,
    on_begin: Option<LifecycleHook>,
    on_end: Option<LifecycleHook>,
}

impl Application {
    /// Creates a new application owning `window` and rendering through
    /// `backend`.
    ///
    /// The update-thread count is fixed here for the application lifetime:
    /// the settings override when present, otherwise one less than the host
    /// parallelism, never below one.
    pub fn new(
        name: impl Into<String>,
        window: Box<dyn PlatformWindow>,
        backend: Box<dyn RenderBackend>,
        settings: Settings,
    ) -> Self {
        let name = name.into();
        let workers = resolve_update_threads(&settings);
        log::info!("Application '{name}' configured with {workers} update thread(s).");
        let (task_sender, task_queue) = TaskQueue::new();
        Self {
            name,
            window,
            backend,
            settings,
            dispatcher: Arc::new(EventDispatcher::new()),
            frame_sync: Arc::new(FrameSync::new(workers)),
            scenes: Arc::new(SceneSlots {
                presented: RwLock::new(None),
                pending: Mutex::new(None),
            }),
            task_sender,
            task_queue,
            on_begin: None,
            on_end: None,
        }
    }

    /// The application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The window the application runs in.
    pub fn window(&self) -> &dyn PlatformWindow {
        self.window.as_ref()
    }

    /// The application settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The number of threads used for updating.
    pub fn update_thread_count(&self) -> usize {
        self.frame_sync.worker_count()
    }

    /// The event dispatcher scenes and nodes register with.
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// A handle for submitting main-thread tasks; cheap to clone and valid
    /// from any thread.
    pub fn task_sender(&self) -> TaskSender {
        self.task_sender.clone()
    }

    /// The context scenes are constructed against.
    pub fn context(&self) -> EngineContext {
        EngineContext {
            window_size: self.window.size(),
            update_threads: self.frame_sync.worker_count(),
            tasks: self.task_sender.clone(),
        }
    }

    /// The currently presented scene, if any.
    pub fn presented_scene(&self) -> Option<Arc<Scene>> {
        self.scenes.presented.read().unwrap().clone()
    }

    /// Queues `scene` for presentation. The swap happens on the main thread
    /// at the next frame boundary: the outgoing scene's `on_scene_change`
    /// runs, then the incoming scene's `on_present`.
    pub fn present_scene(&self, scene: Arc<Scene>) {
        *self.scenes.pending.lock().unwrap() = Some(scene);
    }

    /// A handle for queueing scene presentations from any thread.
    pub fn presenter(&self) -> ScenePresenter {
        ScenePresenter {
            scenes: Arc::clone(&self.scenes),
        }
    }

    /// Registers a hook run once on the main thread just before the first
    /// frame.
    pub fn set_on_begin(&mut self, hook: impl FnOnce(&Application) + 'static) {
        self.on_begin = Some(Box::new(hook));
    }

    /// Registers a hook run once on the main thread just before the update
    /// threads are joined.
    pub fn set_on_end(&mut self, hook: impl FnOnce(&Application) + 'static) {
        self.on_end = Some(Box::new(hook));
    }

    /// Runs the application until the window closes.
    ///
    /// Spawns the update-thread pool, runs the frame loop on the calling
    /// (main) thread, and joins the pool on exit. Errors here are fatal
    /// startup failures; per-frame node errors never surface through this
    /// path.
    pub fn run(mut self) -> anyhow::Result<()> {
        let workers = self.spawn_update_threads()?;

        if let Some(hook) = self.on_begin.take() {
            hook(&self);
        }

        let mut clock = FrameClock::new();
        while self.window.is_open() {
            // Limit FPS and measure the previous frame.
            let delta_micros = clock.tick(self.settings.min_frame_time());

            self.pump_events();
            if !self.window.is_open() {
                break;
            }

            self.finalize_presentation();

            // Release the update threads for this frame, then block until
            // every one of them has finished both passes.
            let generation = self.frame_sync.release_frame(delta_micros);
            self.frame_sync.wait_frame_complete(generation);

            // Deferred work that needs the render context's thread runs
            // before the frame is drawn.
            self.task_queue.drain();

            let presented = self.presented_scene();
            if let Some(scene) = &presented {
                scene.render(self.backend.as_mut());
                // Node add/remove requests land between frames, after
                // render, so no mid-frame mutation is ever observable.
                scene.apply_pending();
            }
        }

        if let Some(hook) = self.on_end.take() {
            hook(&self);
        }

        log::info!("Window closed; shutting down update threads.");
        self.frame_sync.shutdown();
        for worker in workers {
            if worker.join().is_err() {
                log::error!("An update thread panicked during shutdown.");
            }
        }
        Ok(())
    }

    /// Spawns the persistent update-thread pool.
    fn spawn_update_threads(&self) -> anyhow::Result<Vec<JoinHandle<()>>> {
        let count = self.frame_sync.worker_count();
        let mut workers = Vec::with_capacity(count);
        for thread_num in 0..count {
            let frame_sync = Arc::clone(&self.frame_sync);
            let scenes = Arc::clone(&self.scenes);
            let handle = std::thread::Builder::new()
                .name(format!("sylva-update-{thread_num}"))
                .spawn(move || update_thread_main(thread_num, frame_sync, scenes))
                .with_context(|| format!("failed to spawn update thread {thread_num}"))?;
            workers.push(handle);
        }
        Ok(workers)
    }

    /// Polls the window and fans events out to registered handlers.
    fn pump_events(&mut self) {
        for event in self.window.pump() {
            if event == WindowEvent::CloseRequested {
                log::info!("Close requested.");
                self.window.close();
                continue;
            }
            self.dispatcher.dispatch(&event);
        }
    }

    /// Completes a pending scene presentation, if one was queued.
    ///
    /// Runs between frames, so workers never observe a half-swapped slot.
    fn finalize_presentation(&self) {
        let incoming = self.scenes.pending.lock().unwrap().take();
        if let Some(incoming) = incoming {
            let mut presented = self.scenes.presented.write().unwrap();
            if let Some(outgoing) = presented.take() {
                Scene::on_scene_change(&outgoing, &self.dispatcher);
            }
            Scene::on_present(&incoming, &self.dispatcher);
            *presented = Some(incoming);
        }
    }
}

/// The body of one update thread.
///
/// Blocks on the frame barrier between frames; per frame, runs its partition
/// through `pre_update`, holds at the pre-update barrier until every peer
/// arrives, runs `update`, and signals completion. Exits when the barrier
/// reports shutdown — checked immediately after every wait, so termination
/// never deadlocks.
fn update_thread_main(thread_num: usize, frame_sync: Arc<FrameSync>, scenes: Arc<SceneSlots>) {
    log::debug!("Update thread {thread_num} started.");
    let mut generation = 0;
    while let Some(ticket) = frame_sync.wait_for_frame(generation) {
        generation = ticket.generation;
        let scene = scenes.presented.read().unwrap().clone();

        if let Some(scene) = &scene {
            scene.pre_update_partition(thread_num, ticket.delta_micros);
        }
        if !frame_sync.finish_pre_update(generation) {
            break;
        }
        if let Some(scene) = &scene {
            scene.update_partition(thread_num, ticket.delta_micros);
        }
        frame_sync.finish_update(generation);
    }
    log::debug!("Update thread {thread_num} exiting.");
}

/// Resolves the fixed update-thread count: settings override, else one less
/// than the host parallelism, never below one.
fn resolve_update_threads(settings: &Settings) -> usize {
    settings
        .update_threads()
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1)
        })
        .max(1)
}
