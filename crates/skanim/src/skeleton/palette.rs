//! Skinning matrix palette
//!
//! The palette holds one matrix per skinned (non-dummy) joint, indexed by the
//! joint's skinning id. It is rebuilt lazily the first time it is requested
//! after the skeleton's pose changed. Skinning ids must be dense: the `n`
//! skinned joints use exactly the ids `0..n`.

use glam::Mat4;

use super::joint::Joint;
use crate::error::{Result, SkanimError};

/// Lazily rebuilt matrix cache owned by a skeleton
#[derive(Debug, Clone)]
pub(crate) struct SkinningPalette {
    matrices: Vec<Mat4>,
    dirty: bool,
}

impl SkinningPalette {
    pub(crate) fn new() -> Self {
        Self {
            matrices: Vec::new(),
            dirty: true,
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return the cached matrices, rebuilding them from `joints` if needed
    ///
    /// Fails without allocating when the skinning ids are not dense.
    pub(crate) fn get(&mut self, joints: &[Joint]) -> Result<&[Mat4]> {
        if self.dirty {
            validate_skinning_ids(joints)?;
            self.rebuild(joints);
        }
        Ok(&self.matrices)
    }

    fn rebuild(&mut self, joints: &[Joint]) {
        let len = joints.iter().filter(|joint| !joint.is_dummy()).count();

        self.matrices.clear();
        self.matrices.resize(len, Mat4::IDENTITY);

        for joint in joints {
            if let Some(slot) = joint.skinning_id.slot() {
                self.matrices[slot] = joint.skinning_transform().to_matrix();
            }
        }

        self.dirty = false;
    }
}

/// Check that the skinning ids of `joints` are exactly `0..n` for the `n`
/// non-dummy joints, each used once
pub(crate) fn validate_skinning_ids(joints: &[Joint]) -> Result<()> {
    let mut ids: Vec<usize> = joints
        .iter()
        .filter_map(|joint| joint.skinning_id.slot())
        .collect();
    ids.sort_unstable();

    for (expected, &id) in ids.iter().enumerate() {
        if id != expected {
            let reason = if id < expected {
                format!("skinning id {id} is used more than once")
            } else {
                format!("skinning id {expected} is missing")
            };
            return Err(SkanimError::InvalidSkinningIds(reason));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use glam::Vec3;

    fn joint(name: &str, id: i32) -> Joint {
        Joint::with_skinning_id(name, id)
    }

    #[test]
    fn test_palette_skips_dummies() {
        let mut joints = vec![joint("root", -1), joint("a", 1), joint("b", 0)];
        joints[1].global = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));

        let mut palette = SkinningPalette::new();
        let matrices = palette.get(&joints).unwrap();
        assert_eq!(matrices.len(), 2);
        assert_eq!(matrices[0], Mat4::IDENTITY);
        assert!(
            matrices[1].abs_diff_eq(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)), 0.0001)
        );
        assert!(!palette.is_dirty());
    }

    #[test]
    fn test_palette_is_cached_until_invalidated() {
        let mut joints = vec![joint("a", 0)];
        let mut palette = SkinningPalette::new();
        assert_eq!(palette.get(&joints).unwrap()[0], Mat4::IDENTITY);

        joints[0].global = Transform::from_scale(2.0);
        // Still cached
        assert_eq!(palette.get(&joints).unwrap()[0], Mat4::IDENTITY);

        palette.invalidate();
        assert_eq!(palette.get(&joints).unwrap()[0], Mat4::from_scale(Vec3::splat(2.0)));
    }

    #[test]
    fn test_sparse_ids_are_not_allocated() {
        let joints = vec![joint("root", -1), joint("a", 5)];
        let mut palette = SkinningPalette::new();
        assert!(matches!(
            palette.get(&joints),
            Err(SkanimError::InvalidSkinningIds(_))
        ));
        assert!(palette.is_dirty());

        let joints = vec![joint("root", -1), joint("a", i32::MAX)];
        assert!(palette.get(&joints).is_err());
        assert!(palette.matrices.is_empty());
    }

    #[test]
    fn test_validate_dense_ids() {
        let joints = vec![joint("r", -1), joint("a", 1), joint("b", 0)];
        assert!(validate_skinning_ids(&joints).is_ok());
    }

    #[test]
    fn test_validate_rejects_gap() {
        let joints = vec![joint("a", 0), joint("b", 2)];
        assert!(matches!(
            validate_skinning_ids(&joints),
            Err(SkanimError::InvalidSkinningIds(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate() {
        let joints = vec![joint("a", 0), joint("b", 0)];
        assert!(matches!(
            validate_skinning_ids(&joints),
            Err(SkanimError::InvalidSkinningIds(_))
        ));
    }
}
