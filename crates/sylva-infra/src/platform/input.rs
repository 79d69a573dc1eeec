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

//! Provides translation from `winit` input events to the engine's abstract
//! event type.
//!
//! This module acts as an adapter layer, decoupling the rest of the engine
//! from the specific event format of the `winit` crate. Window lifecycle
//! events (close, resize, focus) carry backend state and are handled by the
//! window itself; this translation covers the pure input events.

use sylva_core::event::{MouseButton, WindowEvent as EngineEvent};
use sylva_core::math::Vec2;
use winit::event::{
    ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, TouchPhase, WindowEvent,
};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Translates a `winit::event::WindowEvent` into the engine's event format.
///
/// Returns `Some` for recognized input actions and `None` for everything
/// else (window lifecycle events, IME events, and so on).
pub fn translate_winit_input(event: &WindowEvent) -> Option<EngineEvent> {
    match event {
        WindowEvent::KeyboardInput {
            event: key_event, ..
        } => {
            if let PhysicalKey::Code(keycode) = key_event.physical_key {
                let key_code = map_keycode_to_string(keycode);
                match key_event.state {
                    ElementState::Pressed if !key_event.repeat => {
                        Some(EngineEvent::KeyPressed { key_code })
                    }
                    ElementState::Released => Some(EngineEvent::KeyReleased { key_code }),
                    _ => None,
                }
            } else {
                None
            }
        }
        WindowEvent::CursorMoved { position, .. } => Some(EngineEvent::MouseMoved {
            position: Vec2::new(position.x as f32, position.y as f32),
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            match state {
                ElementState::Pressed => Some(EngineEvent::MouseButtonPressed { button }),
                ElementState::Released => Some(EngineEvent::MouseButtonReleased { button }),
            }
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let dy = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
            };
            if dy != 0.0 {
                Some(EngineEvent::MouseScrolled { delta: dy })
            } else {
                None
            }
        }
        WindowEvent::Touch(touch) => {
            let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
            let id = touch.id;
            match touch.phase {
                TouchPhase::Started => Some(EngineEvent::TouchBegan { id, position }),
                TouchPhase::Moved => Some(EngineEvent::TouchMoved { id, position }),
                TouchPhase::Ended | TouchPhase::Cancelled => Some(EngineEvent::TouchEnded { id }),
            }
        }
        _ => None,
    }
}

// --- Private Helper Functions ---

/// (Internal) Maps a `winit::keyboard::KeyCode` to a string representation.
fn map_keycode_to_string(keycode: KeyCode) -> String {
    format!("{keycode:?}")
}

/// (Internal) Maps a `winit` mouse button to the engine's enum.
fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(8),
        WinitMouseButton::Forward => MouseButton::Other(9),
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}
