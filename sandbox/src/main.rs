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

//! Sandbox demo: two scenes (a morphing blob and a skeletally rigged arm),
//! switched with the space bar.

use std::sync::{Arc, Mutex, Weak};
use sylva_core::event::EventHandler;
use sylva_core::math::{Color, Vec2};
use sylva_core::renderer::{DrawCommand, RenderBackend, RenderError};
use sylva_engine::animation::{BoneWeight, SkeletalAnimator, Skeleton, VertexWeights};
use sylva_engine::node::{CubicBezier, Path, PathNode, PathRig, SceneNode};
use sylva_engine::{Application, EngineContext, Scene, ScenePresenter, Settings};
use sylva_infra::WinitWindowBuilder;

/// Blob animation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BlobState {
    Round,
    Squashed,
}

/// Arm animation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ArmState {
    Rest,
    Raised,
}

/// A backend that counts submissions; stands in for a real GPU backend.
#[derive(Default)]
struct FrameLogBackend {
    draws: usize,
    frames: u64,
}

impl RenderBackend for FrameLogBackend {
    fn begin_frame(&mut self, _clear: Color) -> Result<(), RenderError> {
        self.draws = 0;
        Ok(())
    }

    fn draw(&mut self, _command: &DrawCommand) -> Result<(), RenderError> {
        self.draws += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.frames += 1;
        if self.frames % 120 == 0 {
            log::debug!("Frame {}: {} draw(s).", self.frames, self.draws);
        }
        Ok(())
    }
}

/// Announces itself once from an update thread via the main-thread task
/// queue, the path a node would use for context-bound work like GPU buffer
/// uploads.
struct GreeterNode {
    greeted: Mutex<bool>,
}

impl SceneNode for GreeterNode {
    fn update(&self, ctx: &sylva_engine::node::UpdateContext<'_>) -> anyhow::Result<()> {
        let mut greeted = self.greeted.lock().unwrap();
        if !*greeted {
            *greeted = true;
            ctx.tasks.submit(|| {
                log::info!("Hello from the render thread; press Space to cycle scenes.");
                Ok(())
            });
        }
        Ok(())
    }
}

/// Cycles through the registered scenes on each space-bar press.
struct SceneCycler {
    presenter: ScenePresenter,
    scenes: Mutex<Vec<Arc<Scene>>>,
}

impl SceneNode for SceneCycler {}

impl EventHandler for SceneCycler {
    fn on_key_press(&self, key_code: &str) {
        if key_code != "Space" {
            return;
        }
        let mut scenes = self.scenes.lock().unwrap();
        scenes.rotate_left(1);
        let next = Arc::clone(&scenes[0]);
        log::info!("Cycling to the next scene.");
        self.presenter.present(next);
    }
}

/// A closed 4-segment bezier approximation of a circle.
fn circle_path(center: Vec2, radius: f32) -> Path {
    // Magic kappa for circular arcs with cubic beziers.
    let k = 0.552_284_8 * radius;
    let (cx, cy, r) = (center.x, center.y, radius);
    let beziers = vec![
        CubicBezier::new(
            Vec2::new(cx + r, cy),
            Vec2::new(cx + r, cy + k),
            Vec2::new(cx + k, cy + r),
            Vec2::new(cx, cy + r),
        ),
        CubicBezier::new(
            Vec2::new(cx, cy + r),
            Vec2::new(cx - k, cy + r),
            Vec2::new(cx - r, cy + k),
            Vec2::new(cx - r, cy),
        ),
        CubicBezier::new(
            Vec2::new(cx - r, cy),
            Vec2::new(cx - r, cy - k),
            Vec2::new(cx - k, cy - r),
            Vec2::new(cx, cy - r),
        ),
        CubicBezier::new(
            Vec2::new(cx, cy - r),
            Vec2::new(cx + k, cy - r),
            Vec2::new(cx + r, cy - k),
            Vec2::new(cx + r, cy),
        ),
    ];
    Path { beziers }
}

/// Squashes a path vertically and widens it, as if resting on the ground.
fn squash(path: &Path) -> Path {
    let mut squashed = path.clone();
    squashed.for_each_point_mut(|p| {
        p.x *= 1.3;
        p.y *= 0.6;
    });
    squashed
}

/// Scene 1: a blob endlessly morphing between round and squashed.
fn build_blob_scene(ctx: &EngineContext) -> Arc<Scene> {
    let scene = Arc::new(Scene::new(ctx));
    scene.set_bg_color(Color::rgb(0.06, 0.08, 0.12));

    let round = circle_path(Vec2::new(960.0, 540.0), 200.0);
    let mut blob = PathNode::new(BlobState::Round, round.clone(), Color::rgb(0.3, 0.8, 0.5));
    blob.add_pose(BlobState::Squashed, squash(&round));
    blob.set_z_position(1.0);
    blob.animate_loop(vec![(BlobState::Squashed, 0.6), (BlobState::Round, 0.6)]);

    scene.add_node(Arc::new(blob));
    scene.add_node(Arc::new(GreeterNode {
        greeted: Mutex::new(false),
    }));
    scene.apply_pending();
    scene
}

/// Scene 2: a two-bone arm waving, with a path skinned to the bones.
fn build_rig_scene(ctx: &EngineContext) -> Arc<Scene> {
    let scene = Arc::new(Scene::new(ctx));
    scene.set_bg_color(Color::rgb(0.1, 0.07, 0.1));

    let base = Skeleton::from_parts(&[(-1, 200.0, 0.0), (0, 150.0, 0.3)]);
    let raised = Skeleton::from_parts(&[(-1, 200.0, 0.9), (0, 150.0, 1.2)]);

    let arm = Arc::new(SkeletalAnimator::new(ArmState::Rest, base.clone()));
    arm.add_pose(ArmState::Rest, base);
    arm.add_pose(ArmState::Raised, raised);
    arm.animate_loop(vec![(ArmState::Raised, 0.8), (ArmState::Rest, 0.8)]);

    // A slim quad following the arm; the outer points follow bone 1, the
    // inner points bone 0.
    let sleeve = Path {
        beziers: vec![CubicBezier::new(
            Vec2::new(0.0, -20.0),
            Vec2::new(120.0, -20.0),
            Vec2::new(240.0, -20.0),
            Vec2::new(350.0, 0.0),
        )],
    };
    let inner: VertexWeights = [
        BoneWeight::new(0, 1.0),
        BoneWeight::NONE,
        BoneWeight::NONE,
        BoneWeight::NONE,
    ];
    let outer: VertexWeights = [
        BoneWeight::new(0, 0.5),
        BoneWeight::new(1, 0.5),
        BoneWeight::NONE,
        BoneWeight::NONE,
    ];
    let mut sleeve_node = PathNode::new(ArmState::Rest, sleeve, Color::rgb(0.85, 0.7, 0.4));
    sleeve_node.set_z_position(2.0);
    sleeve_node.set_rig(PathRig {
        skinner: arm.clone(),
        weights: vec![inner, inner, outer, outer],
    });

    scene.add_node(arm);
    scene.add_node(Arc::new(sleeve_node));
    scene.apply_pending();
    scene
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting the Sylva sandbox.");

    let settings = Settings::load("Sylva Sandbox")?;
    let window = WinitWindowBuilder::new()
        .with_title("Sylva Sandbox")
        .with_dimensions(1280, 720)
        .build()?;

    let app = Application::new(
        "Sylva Sandbox",
        Box::new(window),
        Box::new(FrameLogBackend::default()),
        settings,
    );

    let ctx = app.context();
    let blob_scene = build_blob_scene(&ctx);
    let rig_scene = build_rig_scene(&ctx);

    // Space cycles scenes. The cycler lives as a node in both scenes so it
    // stays alive for the application lifetime.
    let cycler = Arc::new(SceneCycler {
        presenter: app.presenter(),
        scenes: Mutex::new(vec![Arc::clone(&rig_scene), Arc::clone(&blob_scene)]),
    });
    app.dispatcher()
        .register(Arc::downgrade(&cycler) as Weak<dyn EventHandler>);
    blob_scene.add_node(Arc::clone(&cycler) as Arc<dyn SceneNode>);
    rig_scene.add_node(cycler as Arc<dyn SceneNode>);
    blob_scene.apply_pending();
    rig_scene.apply_pending();

    app.present_scene(blob_scene);
    app.run()
}
