//! Animation clips, poses and playback
//!
//! Data flows from a clip to a pose and then onto a skeleton:
//!
//! ```text
//! AnimationClip::extract_pose(t) -> Pose -> AnimationState (root delta) -> Skeleton::set_pose
//! ```

mod clip;
mod pose;
mod state;
mod track;

pub use clip::{AnimationClip, ClipRef, KeyPoseClip};
pub use pose::Pose;
pub use state::{AnimationState, LoopJump, PlaybackOptions};
pub use track::Track;
