//! Joint records stored in a skeleton's pre-order arena

use crate::transform::{Space, Transform};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Palette slot of a joint. Negative values mark dummy joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SkinningId(i32);

impl SkinningId {
    /// Structural joint without a palette slot
    pub const DUMMY: Self = Self(-1);

    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub const fn is_dummy(self) -> bool {
        self.0 < 0
    }

    /// Palette slot, or `None` for dummy joints
    pub fn slot(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl Default for SkinningId {
    fn default() -> Self {
        Self::DUMMY
    }
}

impl From<i32> for SkinningId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// A node of the joint hierarchy
///
/// Joints are plain values. Once inserted into a [`Skeleton`](super::Skeleton)
/// they are addressed by their pre-order index and all mutation goes through
/// the skeleton, which keeps the local/global transforms consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub(crate) name: String,
    pub(crate) skinning_id: SkinningId,
    pub(crate) local: Transform,
    pub(crate) global: Transform,
    pub(crate) inverse_binding: Transform,
    /// Pre-order index of the parent joint
    pub(crate) parent: Option<usize>,
    /// Number of joints in this joint's subtree, excluding itself
    pub(crate) descendant_count: usize,
}

impl Joint {
    /// Create a detached dummy joint with identity transforms
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_skinning_id(name, SkinningId::DUMMY)
    }

    /// Create a detached joint with identity transforms
    pub fn with_skinning_id(name: impl Into<String>, skinning_id: impl Into<SkinningId>) -> Self {
        Self {
            name: name.into(),
            skinning_id: skinning_id.into(),
            local: Transform::IDENTITY,
            global: Transform::IDENTITY,
            inverse_binding: Transform::IDENTITY,
            parent: None,
            descendant_count: 0,
        }
    }

    /// Create a detached joint from its transform and its global binding transform
    ///
    /// The joint has no parent yet, so its global transform equals `transform`.
    /// The inverse of `binding` is stored for skinning.
    pub fn with_transforms(
        transform: Transform,
        binding: Transform,
        name: impl Into<String>,
        skinning_id: impl Into<SkinningId>,
    ) -> Self {
        Self {
            local: transform,
            global: transform,
            inverse_binding: binding.inverse(),
            ..Self::with_skinning_id(name, skinning_id)
        }
    }

    /// Replace the transform of a detached joint
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.local = transform;
        if self.parent.is_none() {
            self.global = transform;
        }
        self
    }

    /// Name, unique within the owning skeleton
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot in the skinning palette, or the dummy sentinel
    pub fn skinning_id(&self) -> SkinningId {
        self.skinning_id
    }

    /// Whether this joint has no skinning palette slot
    pub fn is_dummy(&self) -> bool {
        self.skinning_id.is_dummy()
    }

    /// Transform relative to the parent joint
    pub fn local_transform(&self) -> &Transform {
        &self.local
    }

    /// Transform relative to the skeleton's root space
    pub fn global_transform(&self) -> &Transform {
        &self.global
    }

    /// Inverse of the global transform at bind time
    pub fn inverse_binding_transform(&self) -> &Transform {
        &self.inverse_binding
    }

    /// Local or global transform depending on `space`
    pub fn transform(&self, space: Space) -> &Transform {
        match space {
            Space::Local => &self.local,
            Space::Global => &self.global,
        }
    }

    /// Pre-order index of the parent joint, `None` for a root
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Number of joints in this joint's subtree, excluding itself
    pub fn descendant_count(&self) -> usize {
        self.descendant_count
    }

    /// Skinning matrix transform: inverse binding followed by the current pose
    pub(crate) fn skinning_transform(&self) -> Transform {
        Transform::combine(&self.inverse_binding, &self.global)
    }

    /// Recompute the local transform so the global transform is preserved
    pub(crate) fn relocalize(&mut self, parent_global: Option<&Transform>) {
        self.local = match parent_global {
            Some(parent) => Transform::combine(&self.global, &parent.inverse()),
            None => self.global,
        };
    }

    /// Recompute the global transform from the local one
    pub(crate) fn reglobalize(&mut self, parent_global: Option<&Transform>) {
        self.global = match parent_global {
            Some(parent) => Transform::combine(&self.local, parent),
            None => self.local,
        };
    }
}
