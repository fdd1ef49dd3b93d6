//! Building skeletons and clips from external asset data
//!
//! File formats are out of scope: an importer is anything that can answer the
//! queries of [`SkeletonImporter`] / [`AnimationImporter`] about data it has
//! already opened. Importer joint indices are arbitrary; the loaders map them
//! to skeleton pre-order.

use log::{debug, warn};

use crate::animation::{AnimationClip, Track};
use crate::error::{Result, SkanimError};
use crate::skeleton::{Joint, Skeleton, SkinningId};
use crate::transform::Transform;

/// Source of a joint hierarchy
pub trait SkeletonImporter {
    fn skeleton_name(&self) -> String;

    fn joint_count(&self) -> usize;

    fn root_joint(&self) -> usize;

    fn child_count(&self, joint: usize) -> usize;

    /// Importer index of the `nth` child of `joint`
    fn child_joint(&self, joint: usize, nth: usize) -> usize;

    fn joint_name(&self, joint: usize) -> String;

    /// Palette slot of the joint, negative for dummy joints
    fn skinning_id(&self, joint: usize) -> SkinningId;

    /// Global transform of the joint in the binding pose
    fn global_binding_transform(&self, joint: usize) -> Transform;
}

/// Source of animation clips over an imported skeleton's joints
pub trait AnimationImporter {
    fn clip_count(&self) -> usize;

    fn clip_name(&self, clip: usize) -> String;

    /// Time between the first and the last key
    fn clip_length(&self, clip: usize) -> i64;

    fn key_count(&self, clip: usize) -> usize;

    /// Local transform keys of one joint, addressed by importer joint index
    fn joint_keys(&self, clip: usize, joint: usize) -> Vec<Transform>;
}

/// Build a skeleton in its binding pose
///
/// Returns the skeleton together with the importer index of every joint, in
/// skeleton pre-order. Pass that order to [`load_animation_clip`] so track
/// `i` drives joint `i`.
pub fn load_skeleton<I: SkeletonImporter + ?Sized>(importer: &I) -> Result<(Skeleton, Vec<usize>)> {
    let joint_count = importer.joint_count();
    let root = importer.root_joint();
    if root >= joint_count {
        return Err(SkanimError::Import(format!(
            "root joint {root} out of range ({joint_count} joints)"
        )));
    }

    let mut visited = vec![false; joint_count];
    let mut order = Vec::with_capacity(joint_count);
    let mut skeleton = Skeleton::new(importer.skeleton_name(), import_joint(importer, root))?;
    visited[root] = true;
    order.push(root);

    // (importer index, parent's skeleton index), popped in pre-order
    let mut stack: Vec<(usize, usize)> = children_of(importer, root, 0, joint_count)?;
    while let Some((joint, parent)) = stack.pop() {
        if std::mem::replace(&mut visited[joint], true) {
            return Err(SkanimError::Import(format!(
                "joint {joint} is reachable more than once"
            )));
        }

        let index = skeleton.add_child(parent, import_joint(importer, joint))?;
        debug_assert_eq!(index, order.len());
        order.push(joint);
        stack.extend(children_of(importer, joint, index, joint_count)?);
    }

    if order.len() != joint_count {
        warn!(
            "Skeleton '{}': {} of {} joints are not reachable from the root",
            skeleton.name(),
            joint_count - order.len(),
            joint_count
        );
    }

    skeleton.validate_skinning_ids()?;
    debug!("Loaded skeleton '{}' with {} joints", skeleton.name(), skeleton.joint_count());

    Ok((skeleton, order))
}

fn import_joint<I: SkeletonImporter + ?Sized>(importer: &I, joint: usize) -> Joint {
    let binding = importer.global_binding_transform(joint);
    Joint::with_transforms(binding, binding, importer.joint_name(joint), importer.skinning_id(joint))
}

/// Children of `joint`, reversed so the first child is popped first
fn children_of<I: SkeletonImporter + ?Sized>(
    importer: &I,
    joint: usize,
    index: usize,
    joint_count: usize,
) -> Result<Vec<(usize, usize)>> {
    let mut children = Vec::with_capacity(importer.child_count(joint));
    for nth in (0..importer.child_count(joint)).rev() {
        let child = importer.child_joint(joint, nth);
        if child >= joint_count {
            return Err(SkanimError::Import(format!(
                "child {child} of joint {joint} out of range ({joint_count} joints)"
            )));
        }
        children.push((child, index));
    }
    Ok(children)
}

/// Build clip `clip` with one track per entry of `joint_order`
///
/// The key interval is the clip length divided by the number of key
/// intervals. Lengths that do not divide evenly are truncated.
pub fn load_animation_clip<I: AnimationImporter + ?Sized>(
    importer: &I,
    clip: usize,
    joint_order: &[usize],
) -> Result<AnimationClip> {
    let clip_count = importer.clip_count();
    if clip >= clip_count {
        return Err(SkanimError::Import(format!(
            "clip {clip} out of range ({clip_count} clips)"
        )));
    }

    let name = importer.clip_name(clip);
    let key_count = importer.key_count(clip);
    let length = importer.clip_length(clip);

    let key_interval = match key_count {
        0 => return Err(SkanimError::InvalidKeyCount(0)),
        1 => 1,
        _ => {
            let intervals = (key_count - 1) as i64;
            if length % intervals != 0 {
                warn!(
                    "Clip '{}': length {} is not a multiple of {} key intervals, truncating",
                    name, length, intervals
                );
            }
            length / intervals
        }
    };

    let tracks = joint_order
        .iter()
        .map(|&joint| Track::from_keys(importer.joint_keys(clip, joint)))
        .collect();

    AnimationClip::from_tracks(name, key_interval, tracks)
}

/// Build every clip of the importer
pub fn load_animation_clips<I: AnimationImporter + ?Sized>(
    importer: &I,
    joint_order: &[usize],
) -> Result<Vec<AnimationClip>> {
    (0..importer.clip_count())
        .map(|clip| load_animation_clip(importer, clip, joint_order))
        .collect()
}
