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

//! The animation blending system.
//!
//! [`StateAnimator`] is the finite-state blend engine: it holds named poses
//! and produces, each frame, a weighted composition of at most two of them.
//! [`SkeletalAnimator`] applies that composition to skeleton poses to yield
//! per-bone skinning offsets; path nodes apply it to bezier paths.

mod skeletal;
mod skeleton;
mod state;

pub use self::skeletal::{SkeletalAnimator, VertexSkinner};
pub use self::skeleton::{Bone, BoneWeight, Skeleton, VertexWeights};
pub use self::state::StateAnimator;
