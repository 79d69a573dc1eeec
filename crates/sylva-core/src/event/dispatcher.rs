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

use super::handler::{EventHandler, MouseButton, WindowEvent};
use std::sync::{Mutex, Weak};

/// Fans window events out to a set of registered [`EventHandler`]s.
///
/// Handlers are held as `Weak` references: a scene (or node) registers itself
/// when presented and is dropped from the registry automatically once its
/// owner releases it, so an unregister call that never happens cannot leave a
/// dangling entry behind.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Mutex<Vec<Weak<dyn EventHandler>>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no registered handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. The dispatcher holds only a weak reference.
    pub fn register(&self, handler: Weak<dyn EventHandler>) {
        let mut handlers = self.handlers.lock().unwrap();
        handlers.push(handler);
        log::debug!("Event handler registered ({} total).", handlers.len());
    }

    /// Removes a handler by allocation identity.
    ///
    /// Dead weak references encountered along the way are pruned as well.
    pub fn remove(&self, handler: &Weak<dyn EventHandler>) {
        let mut handlers = self.handlers.lock().unwrap();
        handlers.retain(|h| {
            if h.strong_count() == 0 {
                return false;
            }
            !h.ptr_eq(handler)
        });
    }

    /// The number of live registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.strong_count() > 0)
            .count()
    }

    /// Dispatches one event to every live handler, pruning dead ones.
    ///
    /// Must be called on the main thread; handlers run synchronously.
    pub fn dispatch(&self, event: &WindowEvent) {
        // Collect strong references under the lock, invoke outside it so a
        // handler may register/remove handlers from within a hook.
        let live: Vec<_> = {
            let mut handlers = self.handlers.lock().unwrap();
            handlers.retain(|h| h.strong_count() > 0);
            handlers.iter().filter_map(|h| h.upgrade()).collect()
        };

        for handler in live {
            deliver(&*handler, event);
        }
    }
}

/// Invokes the hook matching `event` on a single handler.
fn deliver(handler: &dyn EventHandler, event: &WindowEvent) {
    match event {
        // Close requests are consumed by the application loop, not handlers.
        WindowEvent::CloseRequested => {}
        WindowEvent::Resized { old_size, new_size } => {
            handler.on_window_resize(*old_size, *new_size)
        }
        WindowEvent::FocusLost => handler.on_window_lost_focus(),
        WindowEvent::FocusGained => handler.on_window_gained_focus(),
        WindowEvent::KeyPressed { key_code } => handler.on_key_press(key_code),
        WindowEvent::KeyReleased { key_code } => handler.on_key_release(key_code),
        WindowEvent::MouseMoved { position } => handler.on_mouse_move(*position),
        WindowEvent::MouseScrolled { delta } => handler.on_mouse_scroll(*delta),
        WindowEvent::MouseButtonPressed { button } => match button {
            MouseButton::Left => handler.on_left_click(),
            MouseButton::Middle => handler.on_middle_click(),
            MouseButton::Right => handler.on_right_click(),
            MouseButton::Other(_) => {}
        },
        WindowEvent::MouseButtonReleased { button } => match button {
            MouseButton::Left => handler.on_left_click_release(),
            MouseButton::Middle => handler.on_middle_click_release(),
            MouseButton::Right => handler.on_right_click_release(),
            MouseButton::Other(_) => {}
        },
        WindowEvent::TouchBegan { id, position } => handler.on_touch_begin(*id, *position),
        WindowEvent::TouchMoved { id, position } => handler.on_touch_move(*id, *position),
        WindowEvent::TouchEnded { id } => handler.on_touch_end(*id),
        WindowEvent::ControllerConnected { id } => handler.on_controller_connect(*id),
        WindowEvent::ControllerDisconnected { id } => handler.on_controller_disconnect(*id),
        WindowEvent::ControllerButtonPressed { id, button } => {
            handler.on_controller_button_press(*id, *button)
        }
        WindowEvent::ControllerButtonReleased { id, button } => {
            handler.on_controller_button_release(*id, *button)
        }
        WindowEvent::ControllerAxisMoved { id, axis, value } => {
            handler.on_controller_handle(*id, *axis, *value)
        }
    }
}
