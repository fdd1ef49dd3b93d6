//! SQT transform algebra
//!
//! A [`Transform`] stores a uniform scale, a rotation quaternion and a
//! translation. Composition follows the "a followed by b" convention used
//! throughout the crate: `Transform::combine(local, parent_global)` yields the
//! child's global transform.

use glam::{Mat4, Quat, Vec3};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Selects which of a joint's transforms an accessor reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum Space {
    /// Relative to the parent joint
    #[default]
    Local,
    /// Relative to the skeleton's root space
    Global,
}

/// Scale / rotation / translation transform with uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Transform {
    /// Uniform scale factor
    pub scale: f32,
    /// Unit quaternion applied after scaling
    pub rotation: Quat,
    /// Offset applied last
    pub translation: Vec3,
}

impl Transform {
    /// No scale, no rotation, zero translation
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub const fn new(scale: f32, rotation: Quat, translation: Vec3) -> Self {
        Self {
            scale,
            rotation,
            translation,
        }
    }

    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            scale: 1.0,
            rotation: Quat::IDENTITY,
            translation,
        }
    }

    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            scale: 1.0,
            rotation,
            translation: Vec3::ZERO,
        }
    }

    pub const fn from_scale(scale: f32) -> Self {
        Self {
            scale,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }

    /// Combine two transforms: the result applies `a` first, then `b`.
    ///
    /// In matrix form `combine(a, b).to_matrix() == b.to_matrix() * a.to_matrix()`.
    pub fn combine(a: &Self, b: &Self) -> Self {
        Self {
            scale: a.scale * b.scale,
            rotation: b.rotation * a.rotation,
            translation: b.rotation * (a.translation * b.scale) + b.translation,
        }
    }

    /// The transform undoing `self`, so that `combine(self, inverse) == IDENTITY`
    pub fn inverse(&self) -> Self {
        let scale = if self.scale != 0.0 {
            1.0 / self.scale
        } else {
            0.0
        };
        let rotation = self.rotation.inverse();
        Self {
            scale,
            rotation,
            translation: rotation * (-self.translation * scale),
        }
    }

    /// Interpolate between `a` and `b`.
    ///
    /// Scale and translation are interpolated linearly, rotation spherically.
    /// `t <= 0` returns `a` and `t >= 1` returns `b` verbatim.
    pub fn lerp(t: f32, a: &Self, b: &Self) -> Self {
        if t <= 0.0 {
            return *a;
        }
        if t >= 1.0 {
            return *b;
        }
        Self {
            scale: a.scale + (b.scale - a.scale) * t,
            rotation: normalized(a.rotation).slerp(normalized(b.rotation), t),
            translation: a.translation.lerp(b.translation, t),
        }
    }

    /// Column-major matrix equivalent of this transform
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.translation)
    }

    /// Decompose an affine matrix. Non-uniform scale is averaged across axes.
    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            scale: (scale.x + scale.y + scale.z) / 3.0,
            rotation,
            translation,
        }
    }

    /// Transform a point from this transform's space into its parent space
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.translation
    }

    /// Component-wise comparison within `max_abs_diff`
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        (self.scale - other.scale).abs() <= max_abs_diff
            && self.translation.abs_diff_eq(other.translation, max_abs_diff)
            // q and -q encode the same rotation
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn normalized(q: Quat) -> Quat {
    let len = q.length();
    if len > f32::EPSILON {
        q / len
    } else {
        Quat::IDENTITY
    }
}

/// Trait for values that can be interpolated between two samples
pub trait Lerp: Clone {
    /// Interpolate from `self` towards `other` by `t`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        normalized(*self).slerp(normalized(*other), t)
    }
}

impl Lerp for Transform {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::lerp(t, self, other)
    }
}
