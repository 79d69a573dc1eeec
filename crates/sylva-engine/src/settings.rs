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

//! Persistent application settings.
//!
//! A small JSON key-value store living in an application-named hidden
//! directory under the user's home. Loaded once at startup — a missing file
//! is created with defaults, a malformed one is a fatal startup error — and
//! written back on every setter. Persistence failures on set are logged and
//! otherwise ignored; settings are not on any hot path.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The serialized settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SettingsData {
    /// Frame-rate cap; 0 disables pacing.
    max_fps: u32,
    /// Update-thread override; `None` derives the count from the host CPU.
    update_threads: Option<usize>,
    /// Preferred GPU index for backends that enumerate adapters.
    gpu_id: Option<u32>,
    /// Maps physical key codes (e.g. `"KeyW"`) to game-defined action names.
    key_bindings: HashMap<String, String>,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            max_fps: 60,
            update_threads: None,
            gpu_id: None,
            key_bindings: HashMap::new(),
        }
    }
}

/// The application settings store.
#[derive(Debug)]
pub struct Settings {
    data: SettingsData,
    path: PathBuf,
}

impl Settings {
    /// Loads the settings for `app_name` from the user's home directory,
    /// creating the file with defaults when missing.
    ///
    /// The file lives at `$HOME/.<app-name>/settings.json` with the
    /// application name lower-cased and space-separated words dashed.
    pub fn load(app_name: &str) -> Result<Self, SettingsError> {
        let home = std::env::var_os("HOME")
            .ok_or_else(|| SettingsError::Directory("HOME is not set".to_string()))?;
        let dir_name = format!(".{}", app_name.to_lowercase().replace(' ', "-"));
        Self::load_from_dir(Path::new(&home).join(dir_name))
    }

    /// Loads the settings from an explicit directory. The directory is
    /// created when missing.
    pub fn load_from_dir(dir: PathBuf) -> Result<Self, SettingsError> {
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("settings.json");

        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            SettingsData::default()
        };

        let settings = Self { data, path };
        if !settings.path.exists() {
            settings.persist()?;
        }
        log::info!("Settings loaded from {}.", settings.path.display());
        Ok(settings)
    }

    /// The frame-rate cap; 0 means uncapped.
    pub fn max_fps(&self) -> u32 {
        self.data.max_fps
    }

    /// Sets the frame-rate cap and persists.
    pub fn set_max_fps(&mut self, max_fps: u32) {
        self.data.max_fps = max_fps;
        self.save();
    }

    /// The minimum frame duration implied by the frame-rate cap.
    pub fn min_frame_time(&self) -> Duration {
        if self.data.max_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_micros(1_000_000 / self.data.max_fps as u64)
        }
    }

    /// The configured update-thread count, if overridden.
    pub fn update_threads(&self) -> Option<usize> {
        self.data.update_threads
    }

    /// Overrides the update-thread count and persists.
    pub fn set_update_threads(&mut self, threads: Option<usize>) {
        self.data.update_threads = threads;
        self.save();
    }

    /// The preferred GPU index, if set.
    pub fn gpu_id(&self) -> Option<u32> {
        self.data.gpu_id
    }

    /// Sets the preferred GPU index and persists.
    pub fn set_gpu_id(&mut self, gpu_id: Option<u32>) {
        self.data.gpu_id = gpu_id;
        self.save();
    }

    /// The action bound to a physical key code, if any.
    pub fn key_action(&self, key_code: &str) -> Option<&str> {
        self.data.key_bindings.get(key_code).map(String::as_str)
    }

    /// Binds (or rebinds) a physical key code to an action and persists.
    pub fn update_key_action(&mut self, key_code: impl Into<String>, action: impl Into<String>) {
        self.data
            .key_bindings
            .insert(key_code.into(), action.into());
        self.save();
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn save(&self) {
        if let Err(e) = self.persist() {
            log::error!("Failed to persist settings to {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults_and_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(settings.max_fps(), 60);
        assert_eq!(settings.update_threads(), None);
        assert!(dir.path().join("settings.json").exists());
    }

    #[test]
    fn setters_persist_across_reloads() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut settings = Settings::load_from_dir(dir.path().to_path_buf()).unwrap();
            settings.set_max_fps(144);
            settings.set_update_threads(Some(3));
            settings.set_gpu_id(Some(1));
            settings.update_key_action("KeyW", "move_up");
        }
        let settings = Settings::load_from_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(settings.max_fps(), 144);
        assert_eq!(settings.update_threads(), Some(3));
        assert_eq!(settings.gpu_id(), Some(1));
        assert_eq!(settings.key_action("KeyW"), Some("move_up"));
        assert_eq!(settings.key_action("KeyQ"), None);
    }

    #[test]
    fn min_frame_time_follows_the_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::load_from_dir(dir.path().to_path_buf()).unwrap();
        settings.set_max_fps(100);
        assert_eq!(settings.min_frame_time(), Duration::from_millis(10));
        settings.set_max_fps(0);
        assert_eq!(settings.min_frame_time(), Duration::ZERO);
    }

    #[test]
    fn malformed_file_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        let result = Settings::load_from_dir(dir.path().to_path_buf());
        assert!(matches!(result, Err(SettingsError::Malformed(_))));
    }
}
