//! Per-frame joint transform sets

use std::ops::{Index, IndexMut};

use crate::error::{Result, SkanimError};
use crate::transform::Transform;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// One local transform per joint, in skeleton pre-order / clip track order
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Pose {
    transforms: Vec<Transform>,
}

impl Pose {
    /// Create a pose of `joint_count` identity transforms
    pub fn new(joint_count: usize) -> Self {
        Self {
            transforms: vec![Transform::IDENTITY; joint_count],
        }
    }

    pub fn from_transforms(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Transform> {
        self.transforms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Transform> {
        self.transforms.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transform> {
        self.transforms.iter()
    }

    pub fn as_slice(&self) -> &[Transform] {
        &self.transforms
    }

    /// Resize to `joint_count`, filling new slots with identity
    pub fn resize(&mut self, joint_count: usize) {
        self.transforms.resize(joint_count, Transform::IDENTITY);
    }

    /// Interpolate every joint of `a` towards `b` into `out`
    ///
    /// All three poses must have the same length.
    pub fn lerp_into(t: f32, a: &Self, b: &Self, out: &mut Self) -> Result<()> {
        for other in [b.len(), out.len()] {
            if other != a.len() {
                return Err(SkanimError::PoseSizeMismatch {
                    expected: a.len(),
                    actual: other,
                });
            }
        }

        for ((out, a), b) in out.transforms.iter_mut().zip(&a.transforms).zip(&b.transforms) {
            *out = Transform::lerp(t, a, b);
        }
        Ok(())
    }

    /// Interpolated copy of `a` and `b`
    pub fn lerp(t: f32, a: &Self, b: &Self) -> Result<Self> {
        let mut out = Self::new(a.len());
        Self::lerp_into(t, a, b, &mut out)?;
        Ok(out)
    }
}

impl Index<usize> for Pose {
    type Output = Transform;

    fn index(&self, index: usize) -> &Transform {
        &self.transforms[index]
    }
}

impl IndexMut<usize> for Pose {
    fn index_mut(&mut self, index: usize) -> &mut Transform {
        &mut self.transforms[index]
    }
}

impl<'a> IntoIterator for &'a Pose {
    type Item = &'a Transform;
    type IntoIter = std::slice::Iter<'a, Transform>;

    fn into_iter(self) -> Self::IntoIter {
        self.transforms.iter()
    }
}

impl From<Vec<Transform>> for Pose {
    fn from(transforms: Vec<Transform>) -> Self {
        Self::from_transforms(transforms)
    }
}
