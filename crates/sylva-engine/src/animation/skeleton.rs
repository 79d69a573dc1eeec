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

use sylva_core::math::{Transform, Vec2};

/// A single bone in a skeleton: a rigid transform chained off its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Transforms from world space into this bone's space.
    ///
    /// Invariant: `world_to_bone = previous_to_bone * parent.world_to_bone`
    /// (for the root, `previous_to_bone` alone).
    pub world_to_bone: Transform,
    /// Transforms from the parent bone's space into this bone's space.
    pub previous_to_bone: Transform,
    /// The exact inverse of `world_to_bone`, recomputed whenever the bone is
    /// (re)built.
    pub inverse_world_to_bone: Transform,
    /// Index of the parent bone, `-1` for the root.
    pub parent: i32,
    /// The length of this bone.
    pub length: f32,
    /// The rotation of this bone in radians, relative to its parent.
    pub rotation: f32,
}

/// One (bone index, weight) influence on a skinned vertex.
///
/// A bone index of `-1` marks the influence — and every influence after it —
/// as unassigned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneWeight {
    /// Index of the influencing bone, `-1` if unassigned.
    pub bone: i32,
    /// The significance of the bone for this vertex.
    pub weight: f32,
}

impl BoneWeight {
    /// The sentinel bone index for an unassigned influence.
    pub const UNASSIGNED: i32 = -1;

    /// An unassigned influence.
    pub const NONE: Self = Self {
        bone: Self::UNASSIGNED,
        weight: 0.0,
    };

    /// Creates an influence of `bone` with the given weight.
    pub const fn new(bone: i32, weight: f32) -> Self {
        Self { bone, weight }
    }
}

/// The up-to-four bone influences of a single vertex.
///
/// Weights of the assigned influences must sum to 1; this is the caller's
/// responsibility and is not validated at runtime.
pub type VertexWeights = [BoneWeight; 4];

/// An ordered sequence of bones forming a rig.
///
/// Bones are topologically ordered by construction: a bone's parent index
/// always references an earlier bone, so the chain is acyclic and a single
/// forward pass can (re)build every `world_to_bone`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    /// The bones of the skeleton, parents before children.
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Creates an empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a skeleton from (parent index, length, rotation-in-radians)
    /// triples, parents listed before their children.
    pub fn from_parts(parts: &[(i32, f32, f32)]) -> Self {
        let mut bones: Vec<Bone> = Vec::with_capacity(parts.len());
        for &(parent, length, rotation) in parts {
            let bone = Self::calculate_bone(&bones, parent, length, rotation);
            bones.push(bone);
        }
        Self { bones }
    }

    /// Calculates a single bone against the already-built prefix of the
    /// skeleton. `bones` must contain the parent when `parent != -1`.
    pub fn calculate_bone(bones: &[Bone], parent: i32, length: f32, rotation: f32) -> Bone {
        let previous_to_bone = Transform::from_trs(Vec2::new(length, 0.0), rotation, Vec2::ONE);
        let world_to_bone = if parent == -1 {
            previous_to_bone
        } else {
            previous_to_bone * bones[parent as usize].world_to_bone
        };
        // An affine transform built from TRS with unit scale is always
        // invertible.
        let inverse_world_to_bone = world_to_bone
            .inverse()
            .expect("bone transform must be invertible");
        Bone {
            world_to_bone,
            previous_to_bone,
            inverse_world_to_bone,
            parent,
            length,
            rotation,
        }
    }

    /// The number of bones in the skeleton.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Whether the skeleton has no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Transforms a single vertex by a set of per-bone offset matrices.
    ///
    /// Iteration stops at the first unassigned influence. The assigned
    /// weights must sum to 1 for the result to be meaningful.
    pub fn skin(offsets: &[Transform], vert: Vec2, weights: &VertexWeights) -> Vec2 {
        let mut transformed = Vec2::ZERO;
        for influence in weights {
            if influence.bone == BoneWeight::UNASSIGNED {
                break;
            }
            transformed += offsets[influence.bone as usize].transform_point(vert) * influence.weight;
        }
        transformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sylva_core::math::FRAC_PI_2;

    fn assert_transform_eq(a: Transform, b: Transform) {
        for i in 0..3 {
            assert_relative_eq!(a.cols[i].x, b.cols[i].x, epsilon = 1e-4);
            assert_relative_eq!(a.cols[i].y, b.cols[i].y, epsilon = 1e-4);
        }
    }

    #[test]
    fn root_bone_world_transform_is_its_local_transform() {
        let skeleton = Skeleton::from_parts(&[(-1, 2.0, FRAC_PI_2)]);
        let root = &skeleton.bones[0];
        assert_transform_eq(root.world_to_bone, root.previous_to_bone);
    }

    #[test]
    fn child_bone_chains_through_its_parent() {
        let skeleton = Skeleton::from_parts(&[(-1, 1.0, 0.3), (0, 2.0, -0.1)]);
        let expected =
            skeleton.bones[1].previous_to_bone * skeleton.bones[0].world_to_bone;
        assert_transform_eq(skeleton.bones[1].world_to_bone, expected);
    }

    #[test]
    fn inverse_is_exact_for_every_bone() {
        let skeleton = Skeleton::from_parts(&[(-1, 1.5, 0.4), (0, 1.0, 1.0), (1, 0.5, -0.7)]);
        for bone in &skeleton.bones {
            let id = bone.inverse_world_to_bone * bone.world_to_bone;
            assert_transform_eq(id, Transform::IDENTITY);
        }
    }

    #[test]
    fn skinning_stops_at_the_unassigned_sentinel() {
        let offsets = [
            Transform::from_translation(Vec2::new(1.0, 0.0)),
            Transform::from_translation(Vec2::new(0.0, 1.0)),
        ];
        let vert = Vec2::new(2.0, 3.0);
        // Only the first influence is assigned; the garbage weight after the
        // sentinel must be ignored.
        let weights: VertexWeights = [
            BoneWeight::new(0, 1.0),
            BoneWeight::NONE,
            BoneWeight::new(1, 99.0),
            BoneWeight::NONE,
        ];
        let skinned = Skeleton::skin(&offsets, vert, &weights);
        assert_eq!(skinned, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn skinning_blends_weighted_influences() {
        let offsets = [
            Transform::from_translation(Vec2::new(2.0, 0.0)),
            Transform::from_translation(Vec2::new(0.0, 4.0)),
        ];
        let vert = Vec2::ZERO;
        let weights: VertexWeights = [
            BoneWeight::new(0, 0.5),
            BoneWeight::new(1, 0.5),
            BoneWeight::NONE,
            BoneWeight::NONE,
        ];
        let skinned = Skeleton::skin(&offsets, vert, &weights);
        assert_eq!(skinned, Vec2::new(1.0, 2.0));
    }
}
