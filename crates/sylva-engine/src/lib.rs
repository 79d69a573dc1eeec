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

//! # Sylva Engine
//!
//! The engine runtime: the scene graph with its threaded update/render
//! split, the state-machine animation blending system, and the application
//! loop that paces frames and owns the update-thread pool.

pub mod animation;
pub mod app;
pub mod context;
pub mod error;
pub mod node;
pub mod scene;
pub mod settings;
pub mod tasks;

pub use app::{Application, ScenePresenter};
pub use context::EngineContext;
pub use scene::Scene;
pub use settings::Settings;
pub use tasks::TaskSender;
