//! Example: drive a small skeleton with a looping walk cycle
//!
//! Builds a skeleton through the importer traits, plays a clip with root
//! motion for a few seconds and prints where the character ends up.
//!
//! Usage: cargo run --example walk_cycle -- [speed]

use glam::{Quat, Vec3};
use log::info;
use skanim::{
    AnimationImporter, AnimationState, PlaybackOptions, SkeletonImporter, SkinningId, Transform, load_animation_clip,
    load_skeleton,
};

/// Hard-coded biped: pelvis with two legs
struct Biped;

const NAMES: [&str; 5] = ["root", "pelvis", "leg_l", "leg_r", "head"];
const PARENTS: [Option<usize>; 5] = [None, Some(0), Some(1), Some(1), Some(1)];
const CLIP_LENGTH: i64 = 1200;

impl SkeletonImporter for Biped {
    fn skeleton_name(&self) -> String {
        "biped".to_string()
    }

    fn joint_count(&self) -> usize {
        NAMES.len()
    }

    fn root_joint(&self) -> usize {
        0
    }

    fn child_count(&self, joint: usize) -> usize {
        PARENTS.iter().filter(|parent| **parent == Some(joint)).count()
    }

    fn child_joint(&self, joint: usize, nth: usize) -> usize {
        PARENTS
            .iter()
            .enumerate()
            .filter(|(_, parent)| **parent == Some(joint))
            .nth(nth)
            .map_or(0, |(index, _)| index)
    }

    fn joint_name(&self, joint: usize) -> String {
        NAMES[joint].to_string()
    }

    fn skinning_id(&self, joint: usize) -> SkinningId {
        // The root is a dummy placement joint
        SkinningId::new(joint as i32 - 1)
    }

    fn global_binding_transform(&self, joint: usize) -> Transform {
        match joint {
            1 => Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            2 => Transform::from_translation(Vec3::new(-0.2, 0.5, 0.0)),
            3 => Transform::from_translation(Vec3::new(0.2, 0.5, 0.0)),
            4 => Transform::from_translation(Vec3::new(0.0, 1.7, 0.0)),
            _ => Transform::IDENTITY,
        }
    }
}

impl AnimationImporter for Biped {
    fn clip_count(&self) -> usize {
        1
    }

    fn clip_name(&self, _clip: usize) -> String {
        "walk".to_string()
    }

    fn clip_length(&self, _clip: usize) -> i64 {
        CLIP_LENGTH
    }

    fn key_count(&self, _clip: usize) -> usize {
        5
    }

    fn joint_keys(&self, _clip: usize, joint: usize) -> Vec<Transform> {
        (0..5)
            .map(|key| {
                let phase = key as f32 / 4.0 * std::f32::consts::TAU;
                match joint {
                    // 1.5 units forward per cycle
                    0 => Transform::from_translation(Vec3::new(0.0, 0.0, key as f32 * 0.375)),
                    1 => Transform::from_translation(Vec3::new(0.0, 1.0 + phase.cos().abs() * 0.05, 0.0)),
                    2 => Transform::new(
                        1.0,
                        Quat::from_rotation_x(phase.sin() * 0.4),
                        Vec3::new(-0.2, -0.5, 0.0),
                    ),
                    3 => Transform::new(
                        1.0,
                        Quat::from_rotation_x(-phase.sin() * 0.4),
                        Vec3::new(0.2, -0.5, 0.0),
                    ),
                    _ => Transform::from_translation(Vec3::new(0.0, 0.7, 0.0)),
                }
            })
            .collect()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let speed = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<f32>())
        .transpose()?
        .unwrap_or(1.0);

    let (mut skeleton, order) = load_skeleton(&Biped)?;
    let clip = load_animation_clip(&Biped, 0, &order)?;
    info!(
        "Loaded '{}' ({} joints) and clip '{}' ({} ms)",
        skeleton.name(),
        skeleton.joint_count(),
        clip.name(),
        clip.length()
    );

    let options = PlaybackOptions::looping().with_speed(speed);
    let mut state = AnimationState::new("walk", &clip, options);

    // Four seconds at 60 frames per second
    for frame in 0..240 {
        state.advance_time(16);
        skeleton.set_pose(state.pose());

        if frame % 60 == 59 {
            let root = skeleton.root().global_transform().translation;
            info!(
                "t={:>4} ms  local={:>4}  root=({:.2}, {:.2}, {:.2})  jump={:?}",
                (frame + 1) * 16,
                state.local_time(),
                root.x,
                root.y,
                root.z,
                state.last_jump()
            );
        }
    }

    let palette = skeleton.skinning_palette()?;
    info!("Skinning palette holds {} matrices", palette.len());
    if let Some(leg) = palette.get(1) {
        info!("leg_l skinning matrix: {leg:?}");
    }

    Ok(())
}
