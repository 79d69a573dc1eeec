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

//! Provides the mathematical primitives of the engine.
//!
//! Everything here is a plain `f32` value type with standard arithmetic
//! semantics. All angular functions operate in **radians** unless a name
//! says otherwise (e.g. `from_rotation_degrees`).

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// The factor to convert degrees to radians (PI / 180.0).
pub const DEG_TO_RAD: f32 = PI / 180.0;
/// The factor to convert radians to degrees (180.0 / PI).
pub const RAD_TO_DEG: f32 = 180.0 / PI;

pub mod color;
pub mod rect;
pub mod transform;
pub mod vector;

pub use self::color::Color;
pub use self::rect::Rect;
pub use self::transform::Transform;
pub use self::vector::Vec2;
