//! Skeletal animation runtime
//!
//! `skanim` keeps a joint hierarchy, samples animation clips into poses,
//! plays clips back with looping and root motion, and produces the skinning
//! matrix palette a vertex skinning pass consumes.
//!
//! ```
//! use skanim::{AnimationClip, AnimationState, Joint, PlaybackOptions, Skeleton, Track, Transform};
//! use glam::Vec3;
//!
//! let mut skeleton = Skeleton::with_root_name("character", "root");
//! skeleton.add_child(0, Joint::with_skinning_id("hip", 0))?;
//!
//! let root = Track::from_keys(vec![
//!     Transform::IDENTITY,
//!     Transform::from_translation(Vec3::new(0.0, 0.0, 2.0)),
//! ]);
//! let clip = AnimationClip::from_tracks("walk", 1000, vec![root, Track::new(2)])?;
//!
//! let mut state = AnimationState::new("walk", &clip, PlaybackOptions::looping());
//! state.advance_time(500);
//! skeleton.set_pose(state.pose());
//!
//! assert_eq!(skeleton.skinning_palette()?.len(), 1);
//! # Ok::<(), skanim::SkanimError>(())
//! ```

pub mod animation;
pub mod error;
pub mod import;
pub mod skeleton;
pub mod transform;

// Re-export common types
pub use animation::{AnimationClip, AnimationState, ClipRef, KeyPoseClip, LoopJump, PlaybackOptions, Pose, Track};
pub use error::{Result, SkanimError};
pub use import::{AnimationImporter, SkeletonImporter, load_animation_clip, load_animation_clips, load_skeleton};
pub use skeleton::{Joint, Skeleton, SkinningId};
pub use transform::{Lerp, Space, Transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
