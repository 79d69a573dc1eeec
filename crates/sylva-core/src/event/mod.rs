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

//! Provides the input event model and its dispatch machinery.
//!
//! Windowing backends translate their raw events into the backend-agnostic
//! [`WindowEvent`] type; the [`EventDispatcher`] fans each event out to every
//! registered [`EventHandler`]. Dispatch is synchronous and happens on the
//! main thread during the per-frame event pump.

mod dispatcher;
mod handler;

pub use self::dispatcher::EventDispatcher;
pub use self::handler::{ControllerAxis, ControllerButton, EventHandler, MouseButton, WindowEvent};
