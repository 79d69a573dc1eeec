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

//! The scene: the node collection and its per-frame lifecycle.
//!
//! A scene exposes a stable, race-free view of its nodes to N update threads
//! and one render thread. The committed node list and the per-thread
//! partitions are only ever mutated on the main thread between frames;
//! add/remove requests made at any other time accumulate in queues and are
//! drained exactly once per frame, after all update threads have finished
//! and the frame has rendered. No node is therefore ever added to or removed
//! from a bucket while an update thread is iterating it, and no render pass
//! observes a half-applied mutation.

use crate::context::EngineContext;
use crate::node::{RenderContext, SceneNode, UpdateContext};
use crate::tasks::TaskSender;
use std::sync::{Arc, Mutex, RwLock, Weak};
use sylva_core::event::{EventDispatcher, EventHandler};
use sylva_core::math::{Color, Transform, Vec2};
use sylva_core::renderer::RenderBackend;

/// The fixed logical height of every scene's viewport, in world units.
///
/// The viewport width follows the window's aspect ratio; nodes are authored
/// against the 1080-unit height and the engine scales to the screen.
pub const VIEWPORT_HEIGHT: f32 = 1080.0;

/// Update cost assumed for nodes that report no calibrated `update_time`,
/// in microseconds.
const DEFAULT_UPDATE_COST: f32 = 100.0;

/// Viewport state derived from the window size.
#[derive(Debug, Clone, Copy)]
struct View {
    viewport: Vec2,
    world_to_screen: Transform,
}

impl View {
    fn from_window_size(size: Vec2) -> Self {
        let viewport = Vec2::new(size.x * VIEWPORT_HEIGHT / size.y, VIEWPORT_HEIGHT);
        let world_to_screen = Transform::from_scale(2.0 / viewport)
            * Transform::from_translation(viewport / -2.0);
        Self {
            viewport,
            world_to_screen,
        }
    }
}

/// The main scene type: owns the nodes presented together and drives them
/// through their per-frame lifecycle.
pub struct Scene {
    /// The committed node list, kept in ascending z order (stable among
    /// equal z values). Written only on the main thread between frames.
    nodes: RwLock<Vec<Arc<dyn SceneNode>>>,
    /// Per-update-thread buckets over the committed list. Rebuilt only on
    /// the main thread between frames.
    partitions: RwLock<Vec<Vec<Arc<dyn SceneNode>>>>,
    /// Nodes queued for insertion at the next frame boundary.
    to_add: Mutex<Vec<Arc<dyn SceneNode>>>,
    /// Nodes queued for removal at the next frame boundary.
    to_remove: Mutex<Vec<Arc<dyn SceneNode>>>,
    camera: Mutex<Transform>,
    view: Mutex<View>,
    bg_color: Mutex<Color>,
    tasks: TaskSender,
}

impl Scene {
    /// Creates an empty scene from the application's context.
    pub fn new(ctx: &EngineContext) -> Self {
        let threads = ctx.update_threads.max(1);
        Self {
            nodes: RwLock::new(Vec::new()),
            partitions: RwLock::new(vec![Vec::new(); threads]),
            to_add: Mutex::new(Vec::new()),
            to_remove: Mutex::new(Vec::new()),
            camera: Mutex::new(Transform::IDENTITY),
            view: Mutex::new(View::from_window_size(ctx.window_size_f())),
            bg_color: Mutex::new(Color::MAGENTA),
            tasks: ctx.tasks.clone(),
        }
    }

    // --- Node management ---

    /// Queues a node for insertion. The node joins the live set at the next
    /// frame boundary and first renders the frame after that boundary.
    /// Callable from any thread, at any point in a frame.
    pub fn add_node(&self, node: Arc<dyn SceneNode>) {
        self.to_add.lock().unwrap().push(node);
    }

    /// Queues a node for removal at the next frame boundary. Matching is by
    /// allocation identity. Callable from any thread.
    pub fn remove_node(&self, node: &Arc<dyn SceneNode>) {
        self.to_remove.lock().unwrap().push(Arc::clone(node));
    }

    /// A snapshot of the committed node list, in draw order.
    pub fn nodes(&self) -> Vec<Arc<dyn SceneNode>> {
        self.nodes.read().unwrap().clone()
    }

    /// The number of committed nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.read().unwrap().len()
    }

    /// Drains the add/remove queues into the live set and rebuilds the
    /// per-thread partitions.
    ///
    /// Must only be called on the main thread, between frames — after the
    /// update barrier has released and the frame has rendered, before the
    /// next update pass is released.
    pub fn apply_pending(&self) {
        let removals: Vec<_> = self.to_remove.lock().unwrap().drain(..).collect();
        let additions: Vec<_> = self.to_add.lock().unwrap().drain(..).collect();
        if removals.is_empty() && additions.is_empty() {
            return;
        }

        let mut removed = Vec::new();
        {
            let mut nodes = self.nodes.write().unwrap();
            for target in &removals {
                if let Some(i) = nodes.iter().position(|n| Arc::ptr_eq(n, target)) {
                    removed.push(nodes.remove(i));
                }
            }
            for node in &additions {
                insert_by_z(&mut nodes, Arc::clone(node));
            }
        }

        // Lifecycle hooks run outside the list lock so a hook may queue
        // further mutations or inspect the scene.
        for node in removed {
            if let Err(e) = node.end(self) {
                log::error!("Node end hook failed: {e:#}");
            }
        }
        for node in additions {
            if let Err(e) = node.begin(self) {
                log::error!("Node begin hook failed: {e:#}");
            }
        }

        self.rebuild_partitions();
    }

    /// Reassigns every committed node to an update-thread bucket, greedily
    /// placing each node on the least-loaded bucket by its reported update
    /// cost.
    fn rebuild_partitions(&self) {
        let nodes = self.nodes.read().unwrap();
        let mut partitions = self.partitions.write().unwrap();
        let thread_count = partitions.len();
        for bucket in partitions.iter_mut() {
            bucket.clear();
        }
        let mut loads = vec![0.0f32; thread_count];
        for node in nodes.iter() {
            let cost = node.update_time().unwrap_or(DEFAULT_UPDATE_COST);
            let lightest = loads
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap_or(0);
            loads[lightest] += cost;
            partitions[lightest].push(Arc::clone(node));
        }
    }

    // --- Frame execution ---

    /// Runs `pre_update` on every node in this thread's bucket. Called by
    /// update thread `thread_num` once per frame, before the pre-update
    /// barrier.
    pub fn pre_update_partition(&self, thread_num: usize, delta_micros: f32) {
        let ctx = UpdateContext {
            thread_num,
            delta_micros,
            scene: self,
            tasks: &self.tasks,
        };
        let partitions = self.partitions.read().unwrap();
        let Some(bucket) = partitions.get(thread_num) else {
            return;
        };
        for node in bucket {
            if let Err(e) = node.pre_update(&ctx) {
                log::error!("Node pre_update failed on thread {thread_num}: {e:#}");
            }
        }
    }

    /// Runs `update` on every node in this thread's bucket. Called by update
    /// thread `thread_num` once per frame, after the pre-update barrier.
    pub fn update_partition(&self, thread_num: usize, delta_micros: f32) {
        let ctx = UpdateContext {
            thread_num,
            delta_micros,
            scene: self,
            tasks: &self.tasks,
        };
        let partitions = self.partitions.read().unwrap();
        let Some(bucket) = partitions.get(thread_num) else {
            return;
        };
        for node in bucket {
            if let Err(e) = node.update(&ctx) {
                log::error!("Node update failed on thread {thread_num}: {e:#}");
            }
        }
    }

    /// Renders the committed node list in ascending z order.
    ///
    /// Main thread only, and only after the frame's update barrier has
    /// released. A node render error is logged and the frame continues with
    /// the remaining nodes; a backend `begin_frame` failure abandons the
    /// frame.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        let (viewport, world_to_screen) = {
            let view = self.view.lock().unwrap();
            (view.viewport, view.world_to_screen)
        };
        let camera_to_screen = world_to_screen * *self.camera.lock().unwrap();

        if let Err(e) = backend.begin_frame(*self.bg_color.lock().unwrap()) {
            log::error!("Failed to begin frame: {e}");
            return;
        }

        let nodes = self.nodes.read().unwrap();
        let mut ctx = RenderContext {
            backend,
            camera_to_screen,
            viewport,
        };
        for node in nodes.iter() {
            if let Err(e) = node.render(&mut ctx) {
                log::error!("Node render failed: {e:#}");
            }
        }

        if let Err(e) = backend.present() {
            log::error!("Failed to present frame: {e}");
        }
    }

    // --- Presentation ---

    /// Called when this scene becomes the presented scene: registers it for
    /// window events.
    pub fn on_present(scene: &Arc<Scene>, dispatcher: &EventDispatcher) {
        dispatcher.register(Arc::downgrade(scene) as Weak<dyn EventHandler>);
        log::info!("Scene presented ({} nodes).", scene.node_count());
    }

    /// Called when this scene is about to be replaced: unregisters it from
    /// window events.
    pub fn on_scene_change(scene: &Arc<Scene>, dispatcher: &EventDispatcher) {
        let weak = Arc::downgrade(scene) as Weak<dyn EventHandler>;
        dispatcher.remove(&weak);
        log::info!("Scene changed away.");
    }

    // --- Camera and view ---

    /// The scene's camera transform.
    pub fn camera(&self) -> Transform {
        *self.camera.lock().unwrap()
    }

    /// Replaces the scene's camera transform.
    pub fn set_camera(&self, camera: Transform) {
        *self.camera.lock().unwrap() = camera;
    }

    /// The world-space size of the visible area. Always `VIEWPORT_HEIGHT`
    /// units tall; the width follows the window's aspect ratio.
    pub fn viewport(&self) -> Vec2 {
        self.view.lock().unwrap().viewport
    }

    /// The world-to-screen matrix for the current window size.
    pub fn world_to_screen(&self) -> Transform {
        self.view.lock().unwrap().world_to_screen
    }

    /// The background color the frame is cleared to.
    pub fn bg_color(&self) -> Color {
        *self.bg_color.lock().unwrap()
    }

    /// Sets the background color the frame is cleared to.
    pub fn set_bg_color(&self, color: Color) {
        *self.bg_color.lock().unwrap() = color;
    }
}

impl EventHandler for Scene {
    fn on_window_resize(&self, _old_size: (u32, u32), new_size: (u32, u32)) {
        let size = Vec2::new(new_size.0 as f32, new_size.1 as f32);
        *self.view.lock().unwrap() = View::from_window_size(size);
        log::debug!(
            "Scene viewport resized to {}x{} world units.",
            self.viewport().x,
            self.viewport().y
        );
    }
}

/// Inserts a node into a z-ordered list, scanning from the back for the
/// first position whose z does not exceed the new node's. Equal-z nodes keep
/// insertion order.
fn insert_by_z(nodes: &mut Vec<Arc<dyn SceneNode>>, node: Arc<dyn SceneNode>) {
    let z = node.z_position();
    let index = nodes
        .iter()
        .rposition(|existing| existing.z_position() <= z)
        .map_or(0, |i| i + 1);
    nodes.insert(index, node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskQueue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubNode {
        z: f32,
        cost: Option<f32>,
        begun: AtomicUsize,
        ended: AtomicUsize,
    }

    impl StubNode {
        fn at(z: f32) -> Arc<Self> {
            Arc::new(Self {
                z,
                cost: None,
                begun: AtomicUsize::new(0),
                ended: AtomicUsize::new(0),
            })
        }

        fn with_cost(z: f32, cost: f32) -> Arc<Self> {
            Arc::new(Self {
                z,
                cost: Some(cost),
                begun: AtomicUsize::new(0),
                ended: AtomicUsize::new(0),
            })
        }
    }

    impl SceneNode for StubNode {
        fn z_position(&self) -> f32 {
            self.z
        }
        fn update_time(&self) -> Option<f32> {
            self.cost
        }
        fn begin(&self, _scene: &Scene) -> anyhow::Result<()> {
            self.begun.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn end(&self, _scene: &Scene) -> anyhow::Result<()> {
            self.ended.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_scene(threads: usize) -> Scene {
        let (tasks, _queue) = TaskQueue::new();
        let ctx = EngineContext {
            window_size: (1920, 1080),
            update_threads: threads,
            tasks,
        };
        Scene::new(&ctx)
    }

    fn committed_zs(scene: &Scene) -> Vec<f32> {
        scene.nodes().iter().map(|n| n.z_position()).collect()
    }

    #[test]
    fn nodes_commit_in_ascending_z_order() {
        let scene = test_scene(2);
        for z in [5.0, 1.0, 3.0] {
            scene.add_node(StubNode::at(z));
        }
        scene.apply_pending();
        assert_eq!(committed_zs(&scene), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn equal_z_nodes_keep_insertion_order() {
        let scene = test_scene(2);
        let first = StubNode::at(1.0);
        for z in [5.0, 1.0, 3.0] {
            if z == 1.0 {
                scene.add_node(first.clone());
            } else {
                scene.add_node(StubNode::at(z));
            }
        }
        scene.apply_pending();

        let second = StubNode::at(1.0);
        scene.add_node(second.clone());
        scene.apply_pending();

        let nodes = scene.nodes();
        assert_eq!(committed_zs(&scene), vec![1.0, 1.0, 3.0, 5.0]);
        // The pre-existing z=1 node must still draw before the new one.
        assert!(Arc::ptr_eq(&nodes[0], &(first as Arc<dyn SceneNode>)));
        assert!(Arc::ptr_eq(&nodes[1], &(second as Arc<dyn SceneNode>)));
    }

    #[test]
    fn mutations_are_deferred_until_applied() {
        let scene = test_scene(2);
        let node = StubNode::at(0.0);
        scene.add_node(node.clone());
        assert_eq!(scene.node_count(), 0, "additions are invisible mid-frame");
        scene.apply_pending();
        assert_eq!(scene.node_count(), 1);
        assert_eq!(node.begun.load(Ordering::SeqCst), 1);

        scene.remove_node(&(node.clone() as Arc<dyn SceneNode>));
        assert_eq!(scene.node_count(), 1, "removals are invisible mid-frame");
        scene.apply_pending();
        assert_eq!(scene.node_count(), 0);
        assert_eq!(node.ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn partitions_balance_by_update_cost() {
        let scene = test_scene(2);
        // One heavy node and three light ones: the heavy node should end up
        // alone in its bucket.
        scene.add_node(StubNode::with_cost(0.0, 300.0));
        for _ in 0..3 {
            scene.add_node(StubNode::with_cost(0.0, 100.0));
        }
        scene.apply_pending();

        let partitions = scene.partitions.read().unwrap();
        let sizes: Vec<usize> = partitions.iter().map(|p| p.len()).collect();
        let mut sorted = sizes.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 3]);
    }

    #[test]
    fn every_committed_node_lands_in_exactly_one_partition() {
        let scene = test_scene(3);
        for z in 0..10 {
            scene.add_node(StubNode::at(z as f32));
        }
        scene.apply_pending();
        let partitions = scene.partitions.read().unwrap();
        let total: usize = partitions.iter().map(|p| p.len()).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn resize_recomputes_the_viewport() {
        let scene = test_scene(1);
        assert_eq!(scene.viewport(), Vec2::new(1920.0, 1080.0));
        scene.on_window_resize((1920, 1080), (2160, 1080));
        assert_eq!(scene.viewport(), Vec2::new(2160.0, 1080.0));
        // The logical height never changes.
        assert_eq!(scene.viewport().y, VIEWPORT_HEIGHT);
    }

    #[test]
    fn world_to_screen_maps_viewport_corners_to_ndc() {
        let scene = test_scene(1);
        let viewport = scene.viewport();
        let m = scene.world_to_screen();
        let low = m.transform_point(Vec2::ZERO);
        let high = m.transform_point(viewport);
        assert!((low.x - -1.0).abs() < 1e-5 && (low.y - -1.0).abs() < 1e-5);
        assert!((high.x - 1.0).abs() < 1e-5 && (high.y - 1.0).abs() < 1e-5);
    }
}
