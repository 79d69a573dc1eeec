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

//! Defines the `Transform` type: a 2D affine transformation matrix.

use super::{Vec2, DEG_TO_RAD, EPSILON};
use std::ops::{Add, Mul};

/// A 2D affine transformation, column-major with a column-vector convention.
///
/// `cols[0]` and `cols[1]` are the linear basis columns, `cols[2]` is the
/// translation. Composing with `*` applies the right-hand side first:
/// `(a * b).transform_point(p) == a.transform_point(b.transform_point(p))`.
///
/// Besides composition, `Transform` supports component-wise `Add` and scalar
/// `Mul<f32>`. Those exist for pose blending, which linearly combines whole
/// matrices (weighted sums of the rotation sub-matrix, not spherical
/// interpolation).
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Transform {
    /// The columns of the matrix: two basis columns, then the translation.
    pub cols: [Vec2; 3],
}

impl Transform {
    /// The identity transform, which results in no change.
    pub const IDENTITY: Self = Self {
        cols: [Vec2::X, Vec2::Y, Vec2::ZERO],
    };

    /// A transform with all elements set to 0.
    pub const ZERO: Self = Self {
        cols: [Vec2::ZERO; 3],
    };

    /// Creates a transform from explicit columns.
    #[inline]
    pub const fn from_cols(x_axis: Vec2, y_axis: Vec2, translation: Vec2) -> Self {
        Self {
            cols: [x_axis, y_axis, translation],
        }
    }

    /// Creates a pure translation.
    #[inline]
    pub const fn from_translation(v: Vec2) -> Self {
        Self {
            cols: [Vec2::X, Vec2::Y, v],
        }
    }

    /// Creates a non-uniform scale about the origin.
    #[inline]
    pub const fn from_scale(scale: Vec2) -> Self {
        Self {
            cols: [
                Vec2::new(scale.x, 0.0),
                Vec2::new(0.0, scale.y),
                Vec2::ZERO,
            ],
        }
    }

    /// Creates a counter-clockwise rotation about the origin.
    ///
    /// # Arguments
    ///
    /// * `angle_radians`: The angle of rotation in radians.
    #[inline]
    pub fn from_rotation(angle_radians: f32) -> Self {
        let (s, c) = angle_radians.sin_cos();
        Self {
            cols: [Vec2::new(c, s), Vec2::new(-s, c), Vec2::ZERO],
        }
    }

    /// Creates a counter-clockwise rotation about the origin, in degrees.
    #[inline]
    pub fn from_rotation_degrees(angle_degrees: f32) -> Self {
        Self::from_rotation(angle_degrees * DEG_TO_RAD)
    }

    /// Creates a transform that scales, then rotates, then translates.
    #[inline]
    pub fn from_trs(translation: Vec2, angle_radians: f32, scale: Vec2) -> Self {
        let (s, c) = angle_radians.sin_cos();
        Self {
            cols: [
                Vec2::new(c * scale.x, s * scale.x),
                Vec2::new(-s * scale.y, c * scale.y),
                translation,
            ],
        }
    }

    /// The translation column of the transform.
    #[inline]
    pub fn translation(&self) -> Vec2 {
        self.cols[2]
    }

    /// Applies the full transform (linear part + translation) to a point.
    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        self.cols[0] * p.x + self.cols[1] * p.y + self.cols[2]
    }

    /// Applies only the linear part (no translation) to a direction vector.
    #[inline]
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        self.cols[0] * v.x + self.cols[1] * v.y
    }

    /// The determinant of the linear part.
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.cols[0].x * self.cols[1].y - self.cols[0].y * self.cols[1].x
    }

    /// Computes the inverse transform via the 2x2 closed form.
    ///
    /// Returns `None` when the linear part is singular (determinant near
    /// zero). Only the 2x2 closed form is provided; the engine has no use
    /// for higher-order elimination.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() <= EPSILON * EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = self.cols[0].x;
        let b = self.cols[0].y;
        let c = self.cols[1].x;
        let d = self.cols[1].y;
        let x_axis = Vec2::new(d * inv_det, -b * inv_det);
        let y_axis = Vec2::new(-c * inv_det, a * inv_det);
        let t = self.cols[2];
        let translation = -(x_axis * t.x + y_axis * t.y);
        Some(Self {
            cols: [x_axis, y_axis, translation],
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Self;
    /// Composes two transforms. The right-hand side is applied first.
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            cols: [
                self.transform_vector(rhs.cols[0]),
                self.transform_vector(rhs.cols[1]),
                self.transform_point(rhs.cols[2]),
            ],
        }
    }
}

impl Mul<Vec2> for Transform {
    type Output = Vec2;
    /// Transforms a point.
    #[inline]
    fn mul(self, rhs: Vec2) -> Self::Output {
        self.transform_point(rhs)
    }
}

impl Mul<f32> for Transform {
    type Output = Self;
    /// Scales every matrix element. This is the blend algebra, not a
    /// geometric scale.
    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            cols: [self.cols[0] * rhs, self.cols[1] * rhs, self.cols[2] * rhs],
        }
    }
}

impl Add for Transform {
    type Output = Self;
    /// Adds two transforms element-wise. This is the blend algebra, not a
    /// geometric composition.
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            cols: [
                self.cols[0] + rhs.cols[0],
                self.cols[1] + rhs.cols[1],
                self.cols[2] + rhs.cols[2],
            ],
        }
    }
}
