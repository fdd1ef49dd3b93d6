//! Shared fixtures for integration tests

#![allow(dead_code)]

use glam::Vec3;
use skanim::{AnimationClip, Joint, Skeleton, Track, Transform};

pub const EPSILON: f32 = 0.001;

/// root
/// ├── pelvis (0)
/// │   ├── thigh_l (1)
/// │   │   └── foot_l (2)
/// │   └── thigh_r (3)
/// │       └── foot_r (4)
/// └── spine (5)
///     └── head (6)
pub fn biped() -> Skeleton {
    let mut skeleton = Skeleton::with_root_name("biped", "root");
    let pelvis = skeleton.add_child(0, Joint::with_skinning_id("pelvis", 0)).unwrap();
    let thigh_l = skeleton.add_child(pelvis, Joint::with_skinning_id("thigh_l", 1)).unwrap();
    skeleton.add_child(thigh_l, Joint::with_skinning_id("foot_l", 2)).unwrap();
    let thigh_r = skeleton.add_child(pelvis, Joint::with_skinning_id("thigh_r", 3)).unwrap();
    skeleton.add_child(thigh_r, Joint::with_skinning_id("foot_r", 4)).unwrap();
    let spine = skeleton.add_child(0, Joint::with_skinning_id("spine", 5)).unwrap();
    skeleton.add_child(spine, Joint::with_skinning_id("head", 6)).unwrap();
    skeleton
}

/// Walk clip for [`biped`]: the root moves `stride` along +Z over `length`
/// time units, every other track is identity
pub fn walk_clip(stride: f32, length: i64) -> AnimationClip {
    let root = Track::from_keys(vec![
        Transform::IDENTITY,
        Transform::from_translation(Vec3::new(0.0, 0.0, stride)),
    ]);
    let mut tracks = vec![root];
    tracks.extend((0..7).map(|_| Track::new(2)));
    AnimationClip::from_tracks("walk", length, tracks).unwrap()
}

/// Check the arena invariants: pre-order layout, subtree sizes, name index
/// and global transforms
pub fn assert_consistent(skeleton: &Skeleton) {
    let joints = skeleton.joints();
    assert!(!joints.is_empty());
    assert_eq!(joints[0].parent(), None, "root must be first");

    let mut subtree_sizes = vec![0usize; joints.len()];
    for (i, joint) in joints.iter().enumerate().skip(1) {
        let parent = joint.parent().expect("non-root joint without parent");
        assert!(parent < i, "parent {parent} of joint {i} comes after it");
        assert!(
            i <= parent + joints[parent].descendant_count(),
            "joint {i} outside its parent's subtree range"
        );
        for ancestor in skeleton.ancestors(i) {
            subtree_sizes[ancestor] += 1;
        }
    }

    for (i, joint) in joints.iter().enumerate() {
        assert_eq!(joint.descendant_count(), subtree_sizes[i], "descendant count of joint {i}");
        assert_eq!(skeleton.find_joint(joint.name()), Some(i), "name index of '{}'", joint.name());

        let expected = match joint.parent() {
            Some(parent) => Transform::combine(joint.local_transform(), joints[parent].global_transform()),
            None => *joint.local_transform(),
        };
        // Deep chains of scaled joints reach large magnitudes
        let tolerance = EPSILON * (1.0 + expected.translation.abs().max_element());
        assert!(
            joint.global_transform().abs_diff_eq(&expected, tolerance),
            "global transform of '{}' out of date",
            joint.name()
        );
    }
}
