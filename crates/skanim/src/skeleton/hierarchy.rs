//! Skeleton joint arena
//!
//! Joints live in a single `Vec` in pre-order: the root sits at index 0 and
//! every joint is immediately followed by its whole subtree. Parent links are
//! plain indices, and each joint records the size of its subtree so that a
//! subtree is always the contiguous range `index..=index + descendant_count`.
//!
//! Structural changes (attach, detach, rename) are methods on the skeleton.
//! They shift indices behind the edit point, so joint indices are only stable
//! between structural changes.

use std::collections::HashMap;

use glam::Mat4;
use log::debug;

use super::joint::{Joint, SkinningId};
use super::palette::{self, SkinningPalette};
use crate::animation::Pose;
use crate::error::{Result, SkanimError};
use crate::transform::{Space, Transform};

/// A hierarchy of joints that accepts poses and produces skinning matrices
#[derive(Debug, Clone)]
pub struct Skeleton {
    name: String,
    /// Joints in pre-order, root first
    joints: Vec<Joint>,
    /// Joint name to pre-order index
    names: HashMap<String, usize>,
    root_motion: bool,
    palette: SkinningPalette,
}

impl Skeleton {
    /// Create a skeleton around a root joint
    ///
    /// The root's parent link and any subtree bookkeeping carried by the value
    /// are rejected or reset: the root must be detached.
    pub fn new(name: impl Into<String>, mut root: Joint) -> Result<Self> {
        if root.parent.is_some() {
            return Err(SkanimError::AlreadyParented(root.name));
        }
        root.descendant_count = 0;
        root.global = root.local;

        let mut names = HashMap::new();
        names.insert(root.name.clone(), 0);

        Ok(Self {
            name: name.into(),
            joints: vec![root],
            names,
            root_motion: true,
            palette: SkinningPalette::new(),
        })
    }

    /// Create a skeleton whose root is a dummy joint called `root_name`
    pub fn with_root_name(name: impl Into<String>, root_name: impl Into<String>) -> Self {
        let root_name = root_name.into();
        let mut names = HashMap::new();
        names.insert(root_name.clone(), 0);

        Self {
            name: name.into(),
            joints: vec![Joint::new(root_name)],
            names,
            root_motion: true,
            palette: SkinningPalette::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of joints including the root
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// The root joint, always at index 0
    pub fn root(&self) -> &Joint {
        &self.joints[0]
    }

    /// Joint at pre-order `index`
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// All joints in pre-order
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Pre-order index of the joint called `name`
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// The joint called `name`
    pub fn find_joint_ref(&self, name: &str) -> Option<&Joint> {
        self.find_joint(name).map(|index| &self.joints[index])
    }

    /// Whether [`set_pose`](Self::set_pose) applies root deltas
    pub fn is_root_motion_enabled(&self) -> bool {
        self.root_motion
    }

    /// When enabled, [`set_pose`](Self::set_pose) treats the pose's root slot
    /// as a delta accumulated onto the root transform
    pub fn set_root_motion_enabled(&mut self, enabled: bool) {
        self.root_motion = enabled;
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index < self.joints.len() {
            Ok(())
        } else {
            Err(SkanimError::JointIndexOutOfRange {
                index,
                count: self.joints.len(),
            })
        }
    }

    /// Attach a detached joint as the last child of `parent`
    ///
    /// The joint keeps its global transform: its local transform is
    /// recomputed against the parent. Returns the joint's pre-order index.
    pub fn add_child(&mut self, parent: usize, mut child: Joint) -> Result<usize> {
        if child.parent.is_some() {
            return Err(SkanimError::AlreadyParented(child.name));
        }
        // A standalone joint carries no subtree
        child.descendant_count = 0;
        child.global = child.local;
        self.insert_subtree(parent, vec![child])
    }

    /// Attach every joint of `subtree` below `parent`, the subtree's root
    /// becoming the last child of `parent`
    ///
    /// Returns the pre-order index of the grafted root.
    pub fn graft(&mut self, parent: usize, subtree: Self) -> Result<usize> {
        self.insert_subtree(parent, subtree.joints)
    }

    fn insert_subtree(&mut self, parent: usize, mut subtree: Vec<Joint>) -> Result<usize> {
        self.check_index(parent)?;
        if let Some(taken) = subtree.iter().find(|joint| self.names.contains_key(&joint.name)) {
            return Err(SkanimError::DuplicateJointName(taken.name.clone()));
        }

        let count = subtree.len();
        // Right after the parent's current subtree, i.e. after the right-most
        // descendant of the new joint's left sibling, or the parent itself
        let position = parent + 1 + self.joints[parent].descendant_count;

        for p in self.joints[position..].iter_mut().filter_map(|joint| joint.parent.as_mut()) {
            if *p >= position {
                *p += count;
            }
        }

        let mut ancestor = Some(parent);
        while let Some(index) = ancestor {
            self.joints[index].descendant_count += count;
            ancestor = self.joints[index].parent;
        }

        let parent_global = self.joints[parent].global;
        for (offset, joint) in subtree.iter_mut().enumerate() {
            if offset == 0 {
                joint.parent = Some(parent);
                joint.relocalize(Some(&parent_global));
            } else if let Some(p) = joint.parent.as_mut() {
                *p += position;
            }
        }

        debug!(
            "Skeleton '{}': attached '{}' ({} joints) under '{}' at index {}",
            self.name, subtree[0].name, count, self.joints[parent].name, position
        );

        let tail = self.joints.split_off(position);
        self.joints.extend(subtree);
        self.joints.extend(tail);
        self.reindex_names(position);
        self.palette.invalidate();

        Ok(position)
    }

    /// Detach the joint at `index` and its whole subtree
    ///
    /// The detached joints are returned as a new skeleton named after the
    /// detached joint, whose root keeps its global transform. Removing the
    /// root is a no-op and returns `Ok(None)`.
    pub fn remove(&mut self, index: usize) -> Result<Option<Self>> {
        self.check_index(index)?;
        let Some(parent) = self.joints[index].parent else {
            return Ok(None);
        };

        let count = 1 + self.joints[index].descendant_count;
        let mut detached: Vec<Joint> = self.joints.drain(index..index + count).collect();

        let mut ancestor = Some(parent);
        while let Some(i) = ancestor {
            self.joints[i].descendant_count -= count;
            ancestor = self.joints[i].parent;
        }

        for p in self.joints[index..].iter_mut().filter_map(|joint| joint.parent.as_mut()) {
            if *p > index {
                *p -= count;
            }
        }

        for joint in &detached {
            self.names.remove(&joint.name);
        }
        self.reindex_names(index);
        self.palette.invalidate();

        let mut names = HashMap::with_capacity(count);
        for (offset, joint) in detached.iter_mut().enumerate() {
            joint.parent = if offset == 0 {
                None
            } else {
                joint.parent.map(|p| p - index)
            };
            names.insert(joint.name.clone(), offset);
        }
        detached[0].relocalize(None);

        debug!(
            "Skeleton '{}': detached '{}' ({} joints) from index {}",
            self.name, detached[0].name, count, index
        );

        Ok(Some(Self {
            name: detached[0].name.clone(),
            joints: detached,
            names,
            root_motion: true,
            palette: SkinningPalette::new(),
        }))
    }

    /// Rename a joint, keeping the name index consistent
    pub fn rename_joint(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.check_index(index)?;
        let name = name.into();
        if self.joints[index].name == name {
            return Ok(());
        }
        if self.names.contains_key(&name) {
            return Err(SkanimError::DuplicateJointName(name));
        }

        let old = std::mem::replace(&mut self.joints[index].name, name.clone());
        self.names.remove(&old);
        self.names.insert(name, index);
        debug!("Skeleton '{}': renamed joint '{}' to '{}'", self.name, old, self.joints[index].name);
        Ok(())
    }

    fn reindex_names(&mut self, from: usize) {
        for (index, joint) in self.joints.iter().enumerate().skip(from) {
            self.names.insert(joint.name.clone(), index);
        }
    }

    pub fn set_skinning_id(&mut self, index: usize, id: impl Into<SkinningId>) -> Result<()> {
        self.check_index(index)?;
        self.joints[index].skinning_id = id.into();
        self.palette.invalidate();
        Ok(())
    }

    pub fn set_inverse_binding_transform(&mut self, index: usize, transform: Transform) -> Result<()> {
        self.check_index(index)?;
        self.joints[index].inverse_binding = transform;
        self.palette.invalidate();
        Ok(())
    }

    /// Record the current pose as the binding pose of every joint
    pub fn bind_current_pose(&mut self) {
        for joint in &mut self.joints {
            joint.inverse_binding = joint.global.inverse();
        }
        self.palette.invalidate();
    }

    pub fn transform(&self, index: usize, space: Space) -> Option<&Transform> {
        self.joints.get(index).map(|joint| joint.transform(space))
    }

    pub fn set_transform(&mut self, index: usize, space: Space, transform: Transform) -> Result<()> {
        match space {
            Space::Local => self.set_local_transform(index, transform),
            Space::Global => self.set_global_transform(index, transform),
        }
    }

    /// Set a joint's local transform and refresh the global transforms of the
    /// joint and its whole subtree
    pub fn set_local_transform(&mut self, index: usize, transform: Transform) -> Result<()> {
        self.check_index(index)?;
        let parent_global = self.parent_global(index);
        let joint = &mut self.joints[index];
        joint.local = transform;
        joint.reglobalize(parent_global.as_ref());
        self.propagate(index);
        Ok(())
    }

    /// Set a joint's global transform, deriving its local transform from the
    /// parent, and refresh its subtree
    pub fn set_global_transform(&mut self, index: usize, transform: Transform) -> Result<()> {
        self.check_index(index)?;
        let parent_global = self.parent_global(index);
        let joint = &mut self.joints[index];
        joint.global = transform;
        joint.relocalize(parent_global.as_ref());
        self.propagate(index);
        Ok(())
    }

    /// Shorthand for the root's local transform, which is also its global one
    pub fn set_root_transform(&mut self, transform: Transform) {
        // Every constructor creates the root and `remove(0)` never detaches it
        debug_assert!(!self.joints.is_empty());
        self.joints[0].local = transform;
        self.joints[0].global = transform;
        self.propagate(0);
    }

    fn parent_global(&self, index: usize) -> Option<Transform> {
        self.joints[index].parent.map(|p| self.joints[p].global)
    }

    /// Recompute the global transforms of every descendant of `index`.
    /// Pre-order storage puts each parent before its children, so a single
    /// forward pass over the subtree range is enough.
    fn propagate(&mut self, index: usize) {
        let end = index + self.joints[index].descendant_count;
        self.refresh_globals(index + 1..=end);
        self.palette.invalidate();
    }

    fn refresh_globals(&mut self, range: std::ops::RangeInclusive<usize>) {
        for i in range {
            let parent_global = self.parent_global(i);
            self.joints[i].reglobalize(parent_global.as_ref());
        }
    }

    /// Apply a pose whose slots follow this skeleton's pre-order
    ///
    /// With root motion enabled, slot 0 is a delta composed onto the root's
    /// previous transform; otherwise the root is left untouched. Slots past
    /// the last joint are ignored, and joints past the last slot keep their
    /// local transform but get their global transform refreshed.
    pub fn set_pose(&mut self, pose: &Pose) {
        if pose.is_empty() {
            return;
        }

        if self.root_motion {
            let root = &mut self.joints[0];
            root.local = Transform::combine(&pose[0], &root.local);
            root.global = root.local;
        }

        for (joint, transform) in self.joints.iter_mut().zip(pose).skip(1) {
            joint.local = *transform;
        }
        if self.joints.len() > 1 {
            self.refresh_globals(1..=self.joints.len() - 1);
        }

        self.palette.invalidate();
    }

    /// Current local transforms of all joints as a pose
    pub fn current_pose(&self) -> Pose {
        Pose::from_transforms(self.joints.iter().map(|joint| joint.local).collect())
    }

    /// Skinning matrices indexed by skinning id, rebuilt if the pose changed
    /// since the last call
    ///
    /// Slot `id` holds `inverse binding` followed by the joint's current
    /// global transform. Dummy joints have no slot, so the palette has one
    /// matrix per skinned joint. Fails with
    /// [`InvalidSkinningIds`](SkanimError::InvalidSkinningIds) when the ids
    /// are not exactly `0..n`.
    pub fn skinning_palette(&mut self) -> Result<&[Mat4]> {
        self.palette.get(&self.joints)
    }

    /// Whether the next [`skinning_palette`](Self::skinning_palette) call rebuilds
    pub fn is_palette_dirty(&self) -> bool {
        self.palette.is_dirty()
    }

    /// Check that skinning ids form a dense palette without duplicates
    pub fn validate_skinning_ids(&self) -> Result<()> {
        palette::validate_skinning_ids(&self.joints)
    }
}
