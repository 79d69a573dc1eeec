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

//! A `winit`-based implementation of the `PlatformWindow` trait.
//!
//! The engine keeps its own render loop, so instead of handing control to
//! `winit::EventLoop::run` this window pumps the event loop once per frame
//! (`EventLoopExtPumpEvents`) and hands the translated events back to the
//! application.

use super::input::translate_winit_input;
use std::time::Duration;
use sylva_core::event::WindowEvent as EngineEvent;
use sylva_core::platform::PlatformWindow;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

/// The pump-side state: owns the OS window once it exists and accumulates
/// translated events between pumps.
struct PumpState {
    title: String,
    initial_size: (u32, u32),
    window: Option<Window>,
    events: Vec<EngineEvent>,
    last_size: (u32, u32),
    open: bool,
}

impl ApplicationHandler for PumpState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.initial_size.0, self.initial_size.1))
            .with_visible(true);
        match event_loop.create_window(attributes) {
            Ok(window) => {
                let size = window.inner_size();
                self.last_size = (size.width, size.height);
                log::info!("Winit window created (id: {:?}).", window.id());
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("Winit window creation failed: {e}");
                self.open = false;
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                self.events.push(EngineEvent::CloseRequested);
            }
            WindowEvent::Resized(size) => {
                let new_size = (size.width, size.height);
                if new_size != self.last_size {
                    self.events.push(EngineEvent::Resized {
                        old_size: self.last_size,
                        new_size,
                    });
                    self.last_size = new_size;
                }
            }
            WindowEvent::Focused(gained) => {
                self.events.push(if *gained {
                    EngineEvent::FocusGained
                } else {
                    EngineEvent::FocusLost
                });
            }
            _ => {
                if let Some(translated) = translate_winit_input(&event) {
                    self.events.push(translated);
                }
            }
        }
    }
}

/// A `PlatformWindow` backed by a winit window and a pumped event loop.
///
/// Must be created and used on the main thread — winit requires its event
/// loop there on every platform. The OS window itself is created lazily on
/// the first pump, inside the event loop's `resumed` callback, as required
/// on mobile platforms.
pub struct WinitWindow {
    event_loop: EventLoop<()>,
    state: PumpState,
}

/// A builder for creating `WinitWindow` instances.
pub struct WinitWindowBuilder {
    title: String,
    width: u32,
    height: u32,
}

impl WinitWindowBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            title: "Sylva Engine".to_string(),
            width: 1280,
            height: 720,
        }
    }

    /// Sets the title of the window to be built.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial inner dimensions of the window to be built.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builds the window, creating the winit event loop.
    ///
    /// # Errors
    /// Returns an `EventLoopError` if the event loop cannot be created
    /// (e.g. no display server). This is a fatal startup condition.
    pub fn build(self) -> Result<WinitWindow, EventLoopError> {
        log::info!(
            "Building window '{}' at {}x{}.",
            self.title,
            self.width,
            self.height
        );
        let event_loop = EventLoop::new()?;
        Ok(WinitWindow {
            event_loop,
            state: PumpState {
                title: self.title,
                initial_size: (self.width, self.height),
                window: None,
                events: Vec::new(),
                last_size: (self.width, self.height),
                open: true,
            },
        })
    }
}

impl Default for WinitWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformWindow for WinitWindow {
    fn title(&self) -> &str {
        &self.state.title
    }

    fn size(&self) -> (u32, u32) {
        match &self.state.window {
            Some(window) => {
                let size = window.inner_size();
                (size.width, size.height)
            }
            None => self.state.initial_size,
        }
    }

    fn is_open(&self) -> bool {
        self.state.open
    }

    fn pump(&mut self) -> Vec<EngineEvent> {
        if !self.state.open {
            return Vec::new();
        }
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(code) = status {
            log::info!("Winit event loop exited with code {code}.");
            self.state.open = false;
        }
        std::mem::take(&mut self.state.events)
    }

    fn close(&mut self) {
        self.state.open = false;
        self.state.window = None;
    }
}
