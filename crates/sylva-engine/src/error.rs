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

//! Error types for the engine runtime.

use thiserror::Error;

/// Errors produced by the animation system.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnimationError {
    /// A pose was requested for a state key that was never added.
    ///
    /// This is a programming error: callers are expected to only query
    /// states they registered, so it is not normally caught.
    #[error("animation state not found: {0}")]
    StateNotFound(String),
}

/// Errors produced while loading or persisting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings directory could not be determined or created.
    #[error("settings directory unavailable: {0}")]
    Directory(String),
    /// Reading or writing the settings file failed.
    #[error("settings i/o error")]
    Io(#[from] std::io::Error),
    /// The settings file exists but could not be parsed.
    #[error("settings file is malformed")]
    Malformed(#[from] serde_json::Error),
}
