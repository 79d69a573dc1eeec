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

//! Provides the axis-aligned bounding rectangle used for node bounds.

use super::Vec2;

/// An axis-aligned rectangle defined by its minimum and maximum corners.
///
/// Used as the world-space bounding box of scene nodes, for broad-phase
/// collision and culling decisions. Only rect/rect and rect/point tests are
/// provided; narrower collision pairs are out of the engine's scope.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Rect {
    /// The corner with the smallest coordinates on both axes.
    pub min: Vec2,
    /// The corner with the largest coordinates on both axes.
    pub max: Vec2,
}

impl Rect {
    /// A degenerate rectangle at the origin.
    pub const ZERO: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    /// An invalid `Rect` where `min` is positive infinity and `max` negative
    /// infinity. Merging any valid rect into `INVALID` yields that rect, so
    /// it is the neutral starting point for accumulation.
    pub const INVALID: Self = Self {
        min: Vec2::new(f32::INFINITY, f32::INFINITY),
        max: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates a new `Rect` from two corner points, in either order.
    #[inline]
    pub fn from_min_max(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a `Rect` that tightly encloses a set of points.
    ///
    /// Returns `None` if the input is empty.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut rect = Self::INVALID;
        for p in points {
            rect = rect.expanded_to(*p);
        }
        Some(rect)
    }

    /// Returns this rectangle grown to contain `point`.
    #[inline]
    pub fn expanded_to(&self, point: Vec2) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns the union of two rectangles.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// The width and height of the rectangle.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Whether the point lies inside the rectangle (inclusive).
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether two rectangles overlap (inclusive of touching edges).
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::ZERO
    }
}
