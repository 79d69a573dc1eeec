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

use std::sync::Mutex;
use sylva_core::math::{Rect, Transform};

/// The transform capability: a node-owned transformation matrix with
/// synchronized access.
///
/// Getters return a copy so no caller ever holds a reference into the
/// component across threads.
#[derive(Debug, Default)]
pub struct Transformable {
    transform: Mutex<Transform>,
}

impl Transformable {
    /// Creates the component with an initial transform.
    pub fn new(transform: Transform) -> Self {
        Self {
            transform: Mutex::new(transform),
        }
    }

    /// Thread-safe read of the transformation matrix.
    pub fn transform(&self) -> Transform {
        *self.transform.lock().unwrap()
    }

    /// Thread-safe write of the transformation matrix.
    pub fn set_transform(&self, transform: Transform) {
        *self.transform.lock().unwrap() = transform;
    }
}

/// The collision capability: a node-owned world-space bounding box with
/// synchronized access.
///
/// The owning node refreshes the box in `pre_update` so other nodes can read
/// it during `update`.
#[derive(Debug, Default)]
pub struct Collidable {
    bounding_box: Mutex<Rect>,
}

impl Collidable {
    /// Creates the component with an initial bounding box.
    pub fn new(bounding_box: Rect) -> Self {
        Self {
            bounding_box: Mutex::new(bounding_box),
        }
    }

    /// Thread-safe read of the bounding box.
    pub fn bounding_box(&self) -> Rect {
        *self.bounding_box.lock().unwrap()
    }

    /// Thread-safe write of the bounding box.
    pub fn set_bounding_box(&self, bounding_box: Rect) {
        *self.bounding_box.lock().unwrap() = bounding_box;
    }
}
