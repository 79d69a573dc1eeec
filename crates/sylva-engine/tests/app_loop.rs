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

//! Application-loop integration tests: the update/render barrier under
//! randomized load, main-thread task draining, scene presentation
//! transitions and clean shutdown.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;
use sylva_core::event::WindowEvent;
use sylva_core::math::Color;
use sylva_core::platform::PlatformWindow;
use sylva_core::renderer::{DrawCommand, RenderBackend, RenderError};
use sylva_engine::node::{RenderContext, SceneNode, UpdateContext};
use sylva_engine::{Application, Scene, Settings};

/// A window scripted to stay open for a fixed number of pumps, optionally
/// emitting events at chosen pump indices, then request close.
struct ScriptedWindow {
    open: bool,
    pumps: usize,
    max_pumps: usize,
    scripted: Vec<(usize, WindowEvent)>,
}

impl ScriptedWindow {
    fn open_for(frames: usize) -> Self {
        Self {
            open: true,
            pumps: 0,
            max_pumps: frames,
            scripted: Vec::new(),
        }
    }

    fn with_event(mut self, at_pump: usize, event: WindowEvent) -> Self {
        self.scripted.push((at_pump, event));
        self
    }
}

impl PlatformWindow for ScriptedWindow {
    fn title(&self) -> &str {
        "scripted"
    }
    fn size(&self) -> (u32, u32) {
        (1920, 1080)
    }
    fn is_open(&self) -> bool {
        self.open
    }
    fn pump(&mut self) -> Vec<WindowEvent> {
        self.pumps += 1;
        if self.pumps > self.max_pumps {
            return vec![WindowEvent::CloseRequested];
        }
        let current = self.pumps;
        self.scripted
            .iter()
            .filter(|(at, _)| *at == current)
            .map(|(_, e)| e.clone())
            .collect()
    }
    fn close(&mut self) {
        self.open = false;
    }
}

/// A backend that counts frames and shares the counts with the test.
#[derive(Clone, Default)]
struct CountingBackend {
    frames: Arc<AtomicUsize>,
    draws: Arc<AtomicUsize>,
}

impl RenderBackend for CountingBackend {
    fn begin_frame(&mut self, _clear: Color) -> Result<(), RenderError> {
        Ok(())
    }
    fn draw(&mut self, _command: &DrawCommand) -> Result<(), RenderError> {
        self.draws.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    fn present(&mut self) -> Result<(), RenderError> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn test_settings(update_threads: usize) -> Settings {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::load_from_dir(dir.path().to_path_buf()).unwrap();
    settings.set_update_threads(Some(update_threads));
    // Run the loop flat out; these tests measure ordering, not pacing.
    settings.set_max_fps(0);
    settings
}

#[test]
fn lifecycle_hooks_run_once_and_shutdown_joins_cleanly() {
    let window = ScriptedWindow::open_for(3);
    let backend = CountingBackend::default();
    let frames = Arc::clone(&backend.frames);
    let mut app = Application::new("test", Box::new(window), Box::new(backend), test_settings(2));

    let begun = Arc::new(AtomicUsize::new(0));
    let ended = Arc::new(AtomicUsize::new(0));
    let begun_hook = Arc::clone(&begun);
    let ended_hook = Arc::clone(&ended);
    app.set_on_begin(move |_app| {
        begun_hook.fetch_add(1, Ordering::SeqCst);
    });
    app.set_on_end(move |_app| {
        ended_hook.fetch_add(1, Ordering::SeqCst);
    });

    app.run().unwrap();

    assert_eq!(begun.load(Ordering::SeqCst), 1);
    assert_eq!(ended.load(Ordering::SeqCst), 1);
    // No scene was presented; frames still pace and present nothing.
    assert_eq!(frames.load(Ordering::SeqCst), 0);
}

/// A node with a randomized update cost that checks the barrier invariants.
struct StressNode {
    seed: u64,
    total: usize,
    pre_done: Arc<AtomicUsize>,
    upd_done: Arc<AtomicUsize>,
    violations: Arc<AtomicUsize>,
}

impl SceneNode for StressNode {
    fn pre_update(&self, _ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        std::thread::sleep(Duration::from_micros(rng.gen_range(0..800)));
        self.pre_done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn update(&self, _ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        // The pre-update barrier guarantees every node of this frame has
        // pre-updated before any update runs, so the counter is always a
        // whole number of frames here.
        if self.pre_done.load(Ordering::SeqCst) % self.total != 0 {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_mul(31));
        std::thread::sleep(Duration::from_micros(rng.gen_range(0..800)));
        self.upd_done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A node whose render pass asserts that it never observes a frame whose
/// updates have not fully completed.
struct RenderProbe {
    total: usize,
    pre_done: Arc<AtomicUsize>,
    upd_done: Arc<AtomicUsize>,
    violations: Arc<AtomicUsize>,
}

impl SceneNode for RenderProbe {
    fn z_position(&self) -> f32 {
        1_000.0
    }

    fn render(&self, _ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        let pre = self.pre_done.load(Ordering::SeqCst);
        let upd = self.upd_done.load(Ordering::SeqCst);
        if pre != upd || pre % self.total != 0 {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[test]
fn barrier_orders_pre_update_update_and_render_under_load() {
    const NODES: usize = 24;
    const FRAMES: usize = 10;

    let window = ScriptedWindow::open_for(FRAMES);
    let backend = CountingBackend::default();
    let app = Application::new("stress", Box::new(window), Box::new(backend), test_settings(4));

    let pre_done = Arc::new(AtomicUsize::new(0));
    let upd_done = Arc::new(AtomicUsize::new(0));
    let violations = Arc::new(AtomicUsize::new(0));

    let scene = Arc::new(Scene::new(&app.context()));
    for seed in 0..NODES as u64 {
        scene.add_node(Arc::new(StressNode {
            seed,
            total: NODES,
            pre_done: Arc::clone(&pre_done),
            upd_done: Arc::clone(&upd_done),
            violations: Arc::clone(&violations),
        }));
    }
    scene.add_node(Arc::new(RenderProbe {
        total: NODES,
        pre_done: Arc::clone(&pre_done),
        upd_done: Arc::clone(&upd_done),
        violations: Arc::clone(&violations),
    }));
    scene.apply_pending();

    app.present_scene(Arc::clone(&scene));
    app.run().unwrap();

    assert_eq!(violations.load(Ordering::SeqCst), 0, "barrier was violated");
    let frames_seen = pre_done.load(Ordering::SeqCst) / NODES;
    assert!(frames_seen >= FRAMES - 1, "scene barely updated: {frames_seen}");
    assert_eq!(pre_done.load(Ordering::SeqCst), upd_done.load(Ordering::SeqCst));
}

/// A node that submits a main-thread task every update.
struct TaskSubmittingNode {
    main_thread: ThreadId,
    ran_on_main: Arc<AtomicUsize>,
    ran_elsewhere: Arc<AtomicUsize>,
}

impl SceneNode for TaskSubmittingNode {
    fn update(&self, ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        let main_thread = self.main_thread;
        let ran_on_main = Arc::clone(&self.ran_on_main);
        let ran_elsewhere = Arc::clone(&self.ran_elsewhere);
        ctx.tasks.submit(move || {
            if std::thread::current().id() == main_thread {
                ran_on_main.fetch_add(1, Ordering::SeqCst);
            } else {
                ran_elsewhere.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        });
        Ok(())
    }
}

#[test]
fn node_submitted_tasks_run_on_the_main_thread_each_frame() {
    const FRAMES: usize = 5;
    let window = ScriptedWindow::open_for(FRAMES);
    let backend = CountingBackend::default();
    let app = Application::new("tasks", Box::new(window), Box::new(backend), test_settings(2));

    let ran_on_main = Arc::new(AtomicUsize::new(0));
    let ran_elsewhere = Arc::new(AtomicUsize::new(0));

    let scene = Arc::new(Scene::new(&app.context()));
    scene.add_node(Arc::new(TaskSubmittingNode {
        main_thread: std::thread::current().id(),
        ran_on_main: Arc::clone(&ran_on_main),
        ran_elsewhere: Arc::clone(&ran_elsewhere),
    }));
    scene.apply_pending();
    app.present_scene(Arc::clone(&scene));

    app.run().unwrap();

    assert_eq!(ran_elsewhere.load(Ordering::SeqCst), 0);
    // Every frame's submission drains on the main thread before render;
    // the final frame's task may drain only at the next boundary, which
    // never comes.
    let ran = ran_on_main.load(Ordering::SeqCst);
    assert!(
        (FRAMES - 1..=FRAMES).contains(&ran),
        "expected ~{FRAMES} tasks, ran {ran}"
    );
}

/// A node that marks which scene rendered on which frame.
struct TaggedNode {
    tag: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl SceneNode for TaggedNode {
    fn render(&self, _ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(self.tag);
        Ok(())
    }
}

/// A node that queues a scene presentation from an update thread once.
struct SceneSwitcher {
    presenter: sylva_engine::ScenePresenter,
    target: Mutex<Option<Arc<Scene>>>,
}

impl SceneNode for SceneSwitcher {
    fn update(&self, _ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
        if let Some(scene) = self.target.lock().unwrap().take() {
            self.presenter.present(scene);
        }
        Ok(())
    }
}

#[test]
fn scene_presentation_swaps_at_a_frame_boundary() {
    const FRAMES: usize = 6;
    let window = ScriptedWindow::open_for(FRAMES);
    let backend = CountingBackend::default();
    let app = Application::new("switch", Box::new(window), Box::new(backend), test_settings(2));

    let log = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::new(Scene::new(&app.context()));
    first.add_node(Arc::new(TaggedNode {
        tag: "first",
        log: Arc::clone(&log),
    }));
    first.apply_pending();

    let second = Arc::new(Scene::new(&app.context()));
    second.add_node(Arc::new(TaggedNode {
        tag: "second",
        log: Arc::clone(&log),
    }));
    second.apply_pending();

    first.add_node(Arc::new(SceneSwitcher {
        presenter: app.presenter(),
        target: Mutex::new(Some(Arc::clone(&second))),
    }));
    first.apply_pending();

    app.present_scene(Arc::clone(&first));
    app.run().unwrap();

    let log = log.lock().unwrap();
    assert!(!log.is_empty());
    // The first scene renders at least once, then the swap happens at a
    // frame boundary and only the second scene renders from then on.
    let first_second = log.iter().position(|t| *t == "second").unwrap();
    assert!(log[..first_second].iter().all(|t| *t == "first"));
    assert!(log[first_second..].iter().all(|t| *t == "second"));
    assert_eq!(log.first(), Some(&"first"));
    assert_eq!(log.last(), Some(&"second"));
}

#[test]
fn resize_events_reach_the_presented_scene() {
    const FRAMES: usize = 4;
    let window = ScriptedWindow::open_for(FRAMES).with_event(
        2,
        WindowEvent::Resized {
            old_size: (1920, 1080),
            new_size: (3840, 1080),
        },
    );
    let backend = CountingBackend::default();
    let app = Application::new("resize", Box::new(window), Box::new(backend), test_settings(1));

    let scene = Arc::new(Scene::new(&app.context()));
    app.present_scene(Arc::clone(&scene));
    app.run().unwrap();

    // 3840x1080 doubles the aspect ratio: the viewport is 2160 world units
    // wide at the fixed 1080-unit height.
    assert_eq!(scene.viewport().x, 2160.0);
    assert_eq!(scene.viewport().y, 1080.0);
}
