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

//! End-to-end scene tests: z-ordered rendering, stable ordering among equal
//! z values, and frame-boundary deferral of node mutations.

use std::sync::{Arc, Mutex};
use sylva_core::math::{Color, Rect, Transform, Vec2};
use sylva_core::renderer::{DrawCommand, RenderBackend, RenderError};
use sylva_engine::node::{RenderContext, SceneNode, UpdateContext};
use sylva_engine::tasks::TaskQueue;
use sylva_engine::{EngineContext, Scene};

/// A backend that records every submitted command for inspection.
#[derive(Default)]
struct RecordingBackend {
    frames_begun: usize,
    frames_presented: usize,
    commands: Vec<DrawCommand>,
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, _clear: Color) -> Result<(), RenderError> {
        self.frames_begun += 1;
        self.commands.clear();
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<(), RenderError> {
        self.commands.push(command.clone());
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.frames_presented += 1;
        Ok(())
    }
}

/// A node that draws a single marker vertex so the render order can be
/// reconstructed from the backend's command log.
struct MarkerNode {
    z: f32,
    marker: f32,
    rendered: Mutex<usize>,
}

impl MarkerNode {
    fn new(z: f32, marker: f32) -> Arc<Self> {
        Arc::new(Self {
            z,
            marker,
            rendered: Mutex::new(0),
        })
    }
}

impl SceneNode for MarkerNode {
    fn z_position(&self) -> f32 {
        self.z
    }

    fn bounding_box(&self) -> Rect {
        Rect::from_min_max(Vec2::ZERO, Vec2::ONE)
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        *self.rendered.lock().unwrap() += 1;
        ctx.backend.draw(&DrawCommand {
            vertices: vec![Vec2::new(self.marker, 0.0)],
            color: Color::WHITE,
            transform: Transform::IDENTITY,
            z_position: self.z,
        })?;
        Ok(())
    }
}

fn test_scene() -> Scene {
    let (tasks, _queue) = TaskQueue::new();
    Scene::new(&EngineContext {
        window_size: (1920, 1080),
        update_threads: 2,
        tasks,
    })
}

fn rendered_markers(backend: &RecordingBackend) -> Vec<f32> {
    backend.commands.iter().map(|c| c.vertices[0].x).collect()
}

#[test]
fn nodes_render_in_ascending_z_order() {
    let scene = test_scene();
    let mut backend = RecordingBackend::default();

    // Insertion order 5, 1, 3 — render order must be 1, 3, 5.
    scene.add_node(MarkerNode::new(5.0, 50.0));
    scene.add_node(MarkerNode::new(1.0, 10.0));
    scene.add_node(MarkerNode::new(3.0, 30.0));
    scene.apply_pending();

    scene.render(&mut backend);
    assert_eq!(rendered_markers(&backend), vec![10.0, 30.0, 50.0]);
    assert_eq!(backend.frames_begun, 1);
    assert_eq!(backend.frames_presented, 1);
}

#[test]
fn equal_z_nodes_render_in_insertion_order() {
    let scene = test_scene();
    let mut backend = RecordingBackend::default();

    scene.add_node(MarkerNode::new(5.0, 50.0));
    scene.add_node(MarkerNode::new(1.0, 10.0));
    scene.add_node(MarkerNode::new(3.0, 30.0));
    scene.apply_pending();

    // A later node at z=1 must render after the existing z=1 node.
    scene.add_node(MarkerNode::new(1.0, 11.0));
    scene.apply_pending();

    scene.render(&mut backend);
    assert_eq!(rendered_markers(&backend), vec![10.0, 11.0, 30.0, 50.0]);
}

#[test]
fn a_node_added_mid_frame_renders_starting_next_frame() {
    let scene = test_scene();
    let mut backend = RecordingBackend::default();
    let late = MarkerNode::new(0.0, 99.0);

    scene.add_node(MarkerNode::new(0.0, 1.0));
    scene.apply_pending();

    // Queue the addition "mid-frame": before render, after the partitions
    // were built. It must not appear this frame.
    scene.add_node(late.clone());
    scene.render(&mut backend);
    assert_eq!(rendered_markers(&backend), vec![1.0]);
    assert_eq!(*late.rendered.lock().unwrap(), 0);

    // After the frame-boundary drain it appears exactly once per frame.
    scene.apply_pending();
    scene.render(&mut backend);
    assert_eq!(rendered_markers(&backend), vec![1.0, 99.0]);
    assert_eq!(*late.rendered.lock().unwrap(), 1);
}

#[test]
fn a_removed_node_disappears_only_at_the_frame_boundary() {
    let scene = test_scene();
    let mut backend = RecordingBackend::default();

    let doomed = MarkerNode::new(2.0, 20.0);
    scene.add_node(MarkerNode::new(1.0, 10.0));
    scene.add_node(doomed.clone());
    scene.apply_pending();

    scene.remove_node(&(doomed as Arc<dyn SceneNode>));
    scene.render(&mut backend);
    assert_eq!(rendered_markers(&backend), vec![10.0, 20.0]);

    scene.apply_pending();
    scene.render(&mut backend);
    assert_eq!(rendered_markers(&backend), vec![10.0]);
}

#[test]
fn a_failing_node_does_not_stall_the_frame() {
    struct FaultyNode;
    impl SceneNode for FaultyNode {
        fn z_position(&self) -> f32 {
            0.0
        }
        fn pre_update(&self, _ctx: &UpdateContext<'_>) -> anyhow::Result<()> {
            anyhow::bail!("node logic exploded")
        }
        fn render(&self, _ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
            anyhow::bail!("render exploded")
        }
    }

    let scene = test_scene();
    let mut backend = RecordingBackend::default();
    scene.add_node(Arc::new(FaultyNode));
    scene.add_node(MarkerNode::new(1.0, 10.0));
    scene.apply_pending();

    // The faulty node's errors are logged and skipped; the healthy node
    // still updates and renders.
    scene.pre_update_partition(0, 16_000.0);
    scene.pre_update_partition(1, 16_000.0);
    scene.render(&mut backend);
    assert_eq!(rendered_markers(&backend), vec![10.0]);
    assert_eq!(backend.frames_presented, 1);
}
