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

//! Provides the 2D vector type and its associated operations.

use super::EPSILON;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2-dimensional vector with `f32` components.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Vec2 {
    /// The x component of the vector.
    pub x: f32,
    /// The y component of the vector.
    pub y: f32,
}

impl Vec2 {
    /// A vector with all components set to `0.0`.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    /// A vector with all components set to `1.0`.
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };
    /// The unit vector pointing along the positive X-axis.
    pub const X: Self = Self { x: 1.0, y: 0.0 };
    /// The unit vector pointing along the positive Y-axis.
    pub const Y: Self = Self { x: 0.0, y: 1.0 };

    /// Creates a new `Vec2` with the specified components.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a new `Vec2` with both components set to `v`.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Calculates the squared length (magnitude) of the vector.
    /// This is faster than `length()` as it avoids a square root.
    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.dot(*self)
    }

    /// Calculates the length (magnitude) of the vector.
    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns a normalized version of the vector with a length of 1.
    /// If the vector's length is near zero, it returns `Vec2::ZERO`.
    #[inline]
    pub fn normalize(&self) -> Self {
        let len_sq = self.length_squared();
        if len_sq > EPSILON * EPSILON {
            *self * (1.0 / len_sq.sqrt())
        } else {
            Self::ZERO
        }
    }

    /// Calculates the dot product of this vector and another.
    #[inline]
    pub fn dot(&self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Performs a linear interpolation between two vectors.
    /// The interpolation factor `t` is clamped to the `[0.0, 1.0]` range.
    #[inline]
    pub fn lerp(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t.clamp(0.0, 1.0)
    }

    /// Returns the component-wise minimum of two vectors.
    #[inline]
    pub fn min(self, rhs: Self) -> Self {
        Self {
            x: self.x.min(rhs.x),
            y: self.y.min(rhs.y),
        }
    }

    /// Returns the component-wise maximum of two vectors.
    #[inline]
    pub fn max(self, rhs: Self) -> Self {
        Self {
            x: self.x.max(rhs.x),
            y: self.y.max(rhs.y),
        }
    }
}

// --- Operator Overloads ---

impl Add for Vec2 {
    type Output = Self;
    /// Adds two vectors component-wise.
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    /// Subtracts two vectors component-wise.
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    /// Multiplies the vector by a scalar.
    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    /// Multiplies a scalar by a vector.
    #[inline]
    fn mul(self, rhs: Vec2) -> Self::Output {
        rhs * self
    }
}

impl Mul<Vec2> for Vec2 {
    type Output = Self;
    /// Multiplies two vectors component-wise.
    #[inline]
    fn mul(self, rhs: Vec2) -> Self::Output {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
        }
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    /// Divides the vector by a scalar.
    #[inline]
    fn div(self, rhs: f32) -> Self::Output {
        let inv_rhs = 1.0 / rhs;
        Self {
            x: self.x * inv_rhs,
            y: self.y * inv_rhs,
        }
    }
}

impl Div<Vec2> for f32 {
    type Output = Vec2;
    /// Divides a scalar by a vector component-wise (`s / v`).
    ///
    /// Used for viewport math such as `2.0 / viewport`.
    #[inline]
    fn div(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self / rhs.x,
            y: self / rhs.y,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    /// Negates the vector.
    #[inline]
    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -4.0);
        assert_eq!(a + b, Vec2::new(4.0, -2.0));
        assert_eq!(a - b, Vec2::new(-2.0, 6.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(a * b, Vec2::new(3.0, -8.0));
        assert_eq!(b / 2.0, Vec2::new(1.5, -2.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
    }

    #[test]
    fn scalar_over_vector() {
        let v = Vec2::new(2.0, 4.0);
        assert_eq!(2.0 / v, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn length_and_normalize() {
        let v = Vec2::new(3.0, 4.0);
        assert_relative_eq!(v.length(), 5.0);
        assert_relative_eq!(v.normalize().length(), 1.0, epsilon = EPSILON);
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn lerp_endpoints_and_clamp() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, -10.0);
        assert_eq!(Vec2::lerp(a, b, 0.0), a);
        assert_eq!(Vec2::lerp(a, b, 1.0), b);
        assert_eq!(Vec2::lerp(a, b, 2.0), b);
        assert_eq!(Vec2::lerp(a, b, 0.5), Vec2::new(5.0, -5.0));
    }
}
