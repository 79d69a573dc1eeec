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

use crate::math::Vec2;

/// An engine-internal, backend-agnostic representation of a window event.
///
/// Windowing backends (winit, or a scripted test window) translate their raw
/// events into this enum. Key codes are carried as strings in the backend's
/// physical-key naming (e.g. `"KeyA"`, `"Space"`).
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The user requested the window to close.
    CloseRequested,
    /// The window's inner size changed.
    Resized {
        /// The previous size in pixels.
        old_size: (u32, u32),
        /// The new size in pixels.
        new_size: (u32, u32),
    },
    /// The window lost input focus.
    FocusLost,
    /// The window gained input focus.
    FocusGained,
    /// A keyboard key was pressed.
    KeyPressed {
        /// A string representation of the physical key code.
        key_code: String,
    },
    /// A keyboard key was released.
    KeyReleased {
        /// A string representation of the physical key code.
        key_code: String,
    },
    /// The mouse cursor moved.
    MouseMoved {
        /// The new cursor position in window coordinates.
        position: Vec2,
    },
    /// The mouse wheel was scrolled vertically.
    MouseScrolled {
        /// The scroll delta; positive is away from the user.
        delta: f32,
    },
    /// A mouse button was pressed.
    MouseButtonPressed {
        /// The button that was pressed.
        button: MouseButton,
    },
    /// A mouse button was released.
    MouseButtonReleased {
        /// The button that was released.
        button: MouseButton,
    },
    /// A touch began.
    TouchBegan {
        /// The backend-assigned identifier of the touch.
        id: u64,
        /// The touch position in window coordinates.
        position: Vec2,
    },
    /// A touch moved.
    TouchMoved {
        /// The backend-assigned identifier of the touch.
        id: u64,
        /// The touch position in window coordinates.
        position: Vec2,
    },
    /// A touch ended.
    TouchEnded {
        /// The backend-assigned identifier of the touch.
        id: u64,
    },
    /// A game controller was connected.
    ControllerConnected {
        /// The backend-assigned identifier of the controller.
        id: u32,
    },
    /// A game controller was disconnected.
    ControllerDisconnected {
        /// The backend-assigned identifier of the controller.
        id: u32,
    },
    /// A controller button was pressed.
    ControllerButtonPressed {
        /// The controller the button belongs to.
        id: u32,
        /// The button that was pressed.
        button: ControllerButton,
    },
    /// A controller button was released.
    ControllerButtonReleased {
        /// The controller the button belongs to.
        id: u32,
        /// The button that was released.
        button: ControllerButton,
    },
    /// A controller analog axis moved.
    ControllerAxisMoved {
        /// The controller the axis belongs to.
        id: u32,
        /// The axis that moved.
        axis: ControllerAxis,
        /// The new axis value, normalized to `[-1, 1]` (triggers `[0, 1]`).
        value: f32,
    },
}

/// An engine-internal representation of a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}

/// An engine-internal representation of a controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerButton {
    /// The south face button (A / Cross).
    South,
    /// The east face button (B / Circle).
    East,
    /// The west face button (X / Square).
    West,
    /// The north face button (Y / Triangle).
    North,
    /// The left shoulder bumper.
    LeftShoulder,
    /// The right shoulder bumper.
    RightShoulder,
    /// The start/menu button.
    Start,
    /// The select/back button.
    Select,
    /// Another button, identified by a numeric code.
    Other(u16),
}

/// An engine-internal representation of a controller analog axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerAxis {
    /// Horizontal axis of the left stick.
    LeftStickX,
    /// Vertical axis of the left stick.
    LeftStickY,
    /// Horizontal axis of the right stick.
    RightStickX,
    /// Vertical axis of the right stick.
    RightStickY,
    /// The left analog trigger.
    LeftTrigger,
    /// The right analog trigger.
    RightTrigger,
}

/// The capability interface for receiving window and input events.
///
/// Every hook has a default empty body, so implementors opt into exactly the
/// events they care about. Handlers are registered with an
/// [`EventDispatcher`](super::EventDispatcher) and invoked synchronously on
/// the main thread while the window pumps its event queue.
#[allow(unused_variables)]
pub trait EventHandler: Send + Sync {
    /// Called when the window's inner size changes.
    fn on_window_resize(&self, old_size: (u32, u32), new_size: (u32, u32)) {}
    /// Called when the window loses input focus.
    fn on_window_lost_focus(&self) {}
    /// Called when the window gains input focus.
    fn on_window_gained_focus(&self) {}
    /// Called when a keyboard key is pressed.
    fn on_key_press(&self, key_code: &str) {}
    /// Called when a keyboard key is released.
    fn on_key_release(&self, key_code: &str) {}
    /// Called when the mouse cursor moves.
    fn on_mouse_move(&self, position: Vec2) {}
    /// Called when the mouse wheel scrolls.
    fn on_mouse_scroll(&self, delta: f32) {}
    /// Called when the left mouse button is pressed.
    fn on_left_click(&self) {}
    /// Called when the left mouse button is released.
    fn on_left_click_release(&self) {}
    /// Called when the middle mouse button is pressed.
    fn on_middle_click(&self) {}
    /// Called when the middle mouse button is released.
    fn on_middle_click_release(&self) {}
    /// Called when the right mouse button is pressed.
    fn on_right_click(&self) {}
    /// Called when the right mouse button is released.
    fn on_right_click_release(&self) {}
    /// Called when a touch begins.
    fn on_touch_begin(&self, id: u64, position: Vec2) {}
    /// Called when a touch moves.
    fn on_touch_move(&self, id: u64, position: Vec2) {}
    /// Called when a touch ends.
    fn on_touch_end(&self, id: u64) {}
    /// Called when a controller is connected.
    fn on_controller_connect(&self, id: u32) {}
    /// Called when a controller is disconnected.
    fn on_controller_disconnect(&self, id: u32) {}
    /// Called when a controller button is pressed.
    fn on_controller_button_press(&self, id: u32, button: ControllerButton) {}
    /// Called when a controller button is released.
    fn on_controller_button_release(&self, id: u32, button: ControllerButton) {}
    /// Called when a controller analog axis moves.
    fn on_controller_handle(&self, id: u32, axis: ControllerAxis, value: f32) {}
}
