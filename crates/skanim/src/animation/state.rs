//! Clip playback with looping and root motion extraction
//!
//! An [`AnimationState`] plays one clip. Each [`advance_time`] call moves the
//! local time, samples the clip and replaces the root joint's slot of the
//! resulting pose with the root *delta* since the previous call, ready to be
//! applied with [`Skeleton::set_pose`](crate::skeleton::Skeleton::set_pose).
//!
//! When a looping clip wraps, the delta is assembled piecewise: from the last
//! root to the boundary the playhead crossed, one full clip of motion for
//! every additional cycle, then from the opposite boundary to the current
//! root. Root motion over many short steps therefore adds up to the same
//! motion as one long step.
//!
//! [`advance_time`]: AnimationState::advance_time

use log::trace;

use super::clip::ClipRef;
use super::pose::Pose;
use crate::transform::Transform;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Playback parameters of an [`AnimationState`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct PlaybackOptions {
    /// Time scale; negative values play backwards
    pub speed: f32,
    /// Wrap around at the clip boundaries instead of stopping
    pub looping: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            looping: false,
        }
    }
}

impl PlaybackOptions {
    pub fn looping() -> Self {
        Self {
            looping: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// Boundary crossed by the last [`AnimationState::advance_time`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoopJump {
    /// Local time stayed within the clip
    #[default]
    None,
    /// Playback ran past the end this many times and restarted from the beginning
    PastEnd(u32),
    /// Playback ran before the start this many times and restarted from the end
    BeforeStart(u32),
}

/// Playback cursor over a borrowed clip
#[derive(Debug, Clone)]
pub struct AnimationState<'a> {
    name: String,
    clip: ClipRef<'a>,
    speed: f32,
    looping: bool,
    local_time: i64,
    pose: Pose,
    last_root: Transform,
    begin_root: Transform,
    end_root: Transform,
    last_jump: LoopJump,
}

impl<'a> AnimationState<'a> {
    /// Start playing `clip` from time 0
    pub fn new(name: impl Into<String>, clip: impl Into<ClipRef<'a>>, options: PlaybackOptions) -> Self {
        let clip = clip.into();
        let mut state = Self {
            name: name.into(),
            clip,
            speed: options.speed,
            looping: options.looping,
            local_time: 0,
            pose: Pose::new(clip.track_count()),
            last_root: Transform::IDENTITY,
            begin_root: Transform::IDENTITY,
            end_root: Transform::IDENTITY,
            last_jump: LoopJump::None,
        };
        state.reset();
        state.update_boundary_roots();
        state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The clip being played
    pub fn clip(&self) -> ClipRef<'a> {
        self.clip
    }

    /// Switch to another clip and restart from time 0
    pub fn set_animation_clip(&mut self, clip: impl Into<ClipRef<'a>>) {
        self.clip = clip.into();
        self.reset();
        self.update_boundary_roots();
    }

    /// Time scale applied to every [`advance_time`](Self::advance_time) step
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Playhead position within `[0, length]`
    pub fn local_time(&self) -> i64 {
        self.local_time
    }

    /// Length of the bound clip
    pub fn length(&self) -> i64 {
        self.clip.length()
    }

    /// Loop boundary crossed by the last step, if any
    pub fn last_jump(&self) -> LoopJump {
        self.last_jump
    }

    /// Pose of the last update, with the root delta in slot 0
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Whether a non-looping state has reached the boundary it is heading to
    pub fn is_finished(&self) -> bool {
        if self.looping {
            return false;
        }
        if self.speed < 0.0 {
            self.local_time == 0
        } else {
            self.local_time == self.clip.length()
        }
    }

    /// Go back to time 0. The root delta of the resulting pose is identity.
    pub fn reset(&mut self) {
        self.local_time = 0;
        self.last_jump = LoopJump::None;
        self.update_pose();
        if let Some(root) = self.pose.get_mut(0) {
            *root = Transform::IDENTITY;
        }
    }

    /// Move the playhead by `elapsed` time units scaled by the speed and
    /// resample the clip
    pub fn advance_time(&mut self, elapsed: i64) {
        let step = (elapsed as f32 * self.speed).round() as i64;
        let raw = self.local_time.saturating_add(step);
        let (time, jump) = wrap_time(raw, self.clip.length(), self.looping);

        if jump != LoopJump::None {
            trace!(
                "Animation state '{}': time {} wrapped to {} ({:?})",
                self.name, raw, time, jump
            );
        }

        self.local_time = time;
        self.last_jump = jump;
        self.update_pose();
    }

    fn update_pose(&mut self) {
        self.clip.sample_into(self.local_time, &mut self.pose);
        let Some(&current) = self.pose.get(0) else {
            return;
        };

        let delta = self.root_delta(&current);
        self.pose[0] = delta;
        self.last_root = current;
    }

    /// Motion from the last root transform to `current`, following the
    /// playhead across loop boundaries
    fn root_delta(&self, current: &Transform) -> Transform {
        let (crossed, cycles, reentered) = match self.last_jump {
            LoopJump::None => return Transform::combine(current, &self.last_root.inverse()),
            LoopJump::PastEnd(cycles) => (&self.end_root, cycles, &self.begin_root),
            LoopJump::BeforeStart(cycles) => (&self.begin_root, cycles, &self.end_root),
        };

        let to_boundary = Transform::combine(crossed, &self.last_root.inverse());
        let full_cycle = Transform::combine(crossed, &reentered.inverse());
        let from_boundary = Transform::combine(current, &reentered.inverse());

        let extra = repeat(&full_cycle, cycles.saturating_sub(1));
        Transform::combine(&Transform::combine(&from_boundary, &extra), &to_boundary)
    }

    fn update_boundary_roots(&mut self) {
        self.begin_root = self.clip.sample_root(0);
        self.end_root = self.clip.sample_root(self.clip.length());
    }
}

/// Bring `raw` back into `[0, length]`
fn wrap_time(raw: i64, length: i64, looping: bool) -> (i64, LoopJump) {
    if length <= 0 {
        return (0, LoopJump::None);
    }
    if (0..=length).contains(&raw) {
        return (raw, LoopJump::None);
    }
    if !looping {
        return (raw.clamp(0, length), LoopJump::None);
    }

    let cycles = raw.div_euclid(length);
    let time = raw.rem_euclid(length);
    let jump = if raw < 0 {
        LoopJump::BeforeStart(u32::try_from(-cycles).unwrap_or(u32::MAX))
    } else {
        LoopJump::PastEnd(u32::try_from(cycles).unwrap_or(u32::MAX))
    };
    (time, jump)
}

/// `transform` applied `count` times in a row
fn repeat(transform: &Transform, mut count: u32) -> Transform {
    let mut result = Transform::IDENTITY;
    let mut power = *transform;
    while count > 0 {
        if count & 1 == 1 {
            result = Transform::combine(&result, &power);
        }
        power = Transform::combine(&power, &power);
        count >>= 1;
    }
    result
}
