//! Animation clips
//!
//! Two representations are supported: [`AnimationClip`] stores one
//! [`Track`] per joint, [`KeyPoseClip`] stores whole key poses. Both use a
//! constant interval between keys and are sampled at integer local times in
//! `[0, length]`. [`ClipRef`] is the read-only handle playback works with.

use log::debug;

use super::pose::Pose;
use super::track::Track;
use crate::error::{Result, SkanimError};
use crate::transform::Transform;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Length of `key_count` keys spaced `interval` apart. The interval must be
/// positive and the length must fit in an `i64`.
fn checked_length(key_count: usize, interval: i64) -> Result<i64> {
    if interval <= 0 {
        return Err(SkanimError::InvalidKeyInterval(interval));
    }
    i64::try_from(key_count.saturating_sub(1))
        .ok()
        .and_then(|spans| spans.checked_mul(interval))
        .ok_or(SkanimError::InvalidKeyInterval(interval))
}

/// Split a local time into a key index and the fraction towards the next key
fn key_position(time: i64, interval: i64) -> (usize, f32) {
    let key = time / interval;
    let t = (time % interval) as f32 / interval as f32;
    (key as usize, t)
}

/// Track-based clip with a fixed track count and key count
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(try_from = "RawAnimationClip"))]
pub struct AnimationClip {
    name: String,
    key_count: usize,
    key_interval: i64,
    tracks: Vec<Track>,
}

/// Unchecked field set, validated through [`AnimationClip::build`]
#[cfg(feature = "serde-support")]
#[derive(Deserialize)]
struct RawAnimationClip {
    name: String,
    key_count: usize,
    key_interval: i64,
    tracks: Vec<Track>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<RawAnimationClip> for AnimationClip {
    type Error = SkanimError;

    fn try_from(raw: RawAnimationClip) -> Result<Self> {
        Self::build(raw.name, raw.key_count, raw.key_interval, raw.tracks)
    }
}

impl AnimationClip {
    /// Create a clip of `track_count` tracks, each holding `key_count`
    /// identity keys spaced `key_interval` apart
    pub fn new(
        name: impl Into<String>,
        track_count: usize,
        key_count: usize,
        key_interval: i64,
    ) -> Result<Self> {
        checked_length(key_count, key_interval)?;
        if key_count == 0 {
            return Err(SkanimError::InvalidKeyCount(key_count));
        }

        Ok(Self {
            name: name.into(),
            key_count,
            key_interval,
            tracks: vec![Track::new(key_count); track_count],
        })
    }

    /// Create a clip from filled tracks, which must all have the same,
    /// non-zero key count
    pub fn from_tracks(name: impl Into<String>, key_interval: i64, tracks: Vec<Track>) -> Result<Self> {
        let key_count = tracks.first().map_or(0, Track::key_count);
        Self::build(name.into(), key_count, key_interval, tracks)
    }

    fn build(name: String, key_count: usize, key_interval: i64, tracks: Vec<Track>) -> Result<Self> {
        checked_length(key_count, key_interval)?;
        if key_count == 0 {
            return Err(SkanimError::InvalidKeyCount(key_count));
        }
        if let Some(track) = tracks.iter().find(|track| track.key_count() != key_count) {
            return Err(SkanimError::TrackKeyCountMismatch {
                expected: key_count,
                actual: track.key_count(),
            });
        }

        debug!(
            "Clip '{}': {} tracks, {} keys every {} time units",
            name,
            tracks.len(),
            key_count,
            key_interval
        );

        Ok(Self {
            name,
            key_count,
            key_interval,
            tracks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn key_count(&self) -> usize {
        self.key_count
    }

    pub fn key_interval(&self) -> i64 {
        self.key_interval
    }

    /// Time of the last key
    pub fn length(&self) -> i64 {
        (self.key_count as i64 - 1).saturating_mul(self.key_interval)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Overwrite key `key` of track `track`
    pub fn set_key(&mut self, track: usize, key: usize, transform: Transform) -> Result<()> {
        let count = self.tracks.len();
        self.tracks
            .get_mut(track)
            .ok_or(SkanimError::KeyIndexOutOfRange {
                index: track,
                count,
            })?
            .set_key(key, transform)
    }

    /// Sample every track at `time` into `pose`, resizing it to the track count
    pub fn sample_into(&self, time: i64, pose: &mut Pose) -> Result<()> {
        let length = self.length();
        if !(0..=length).contains(&time) {
            return Err(SkanimError::TimeOutOfRange { time, length });
        }
        self.sample_unchecked(time, pose);
        Ok(())
    }

    /// Pose at local time `time`, which must lie in `[0, length]`
    pub fn extract_pose(&self, time: i64) -> Result<Pose> {
        let mut pose = Pose::new(self.tracks.len());
        self.sample_into(time, &mut pose)?;
        Ok(pose)
    }

    fn sample_unchecked(&self, time: i64, pose: &mut Pose) {
        pose.resize(self.tracks.len());
        let (key, t) = key_position(time, self.key_interval);
        for (i, track) in self.tracks.iter().enumerate() {
            pose[i] = track.sample(key, t);
        }
    }
}

/// Clip storing whole poses at a constant interval
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(try_from = "RawKeyPoseClip"))]
pub struct KeyPoseClip {
    name: String,
    track_count: usize,
    key_interval: i64,
    key_poses: Vec<Pose>,
}

#[cfg(feature = "serde-support")]
#[derive(Deserialize)]
struct RawKeyPoseClip {
    name: String,
    track_count: usize,
    key_interval: i64,
    key_poses: Vec<Pose>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<RawKeyPoseClip> for KeyPoseClip {
    type Error = SkanimError;

    fn try_from(raw: RawKeyPoseClip) -> Result<Self> {
        let mut clip = Self::new(raw.name, raw.track_count, raw.key_interval)?;
        for pose in raw.key_poses {
            clip.add_key_pose(pose)?;
        }
        Ok(clip)
    }
}

impl KeyPoseClip {
    /// Create an empty clip whose key poses will have `track_count` joints
    pub fn new(name: impl Into<String>, track_count: usize, key_interval: i64) -> Result<Self> {
        checked_length(0, key_interval)?;
        Ok(Self {
            name: name.into(),
            track_count,
            key_interval,
            key_poses: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn track_count(&self) -> usize {
        self.track_count
    }

    pub fn key_interval(&self) -> i64 {
        self.key_interval
    }

    pub fn set_key_interval(&mut self, key_interval: i64) -> Result<()> {
        checked_length(self.key_poses.len(), key_interval)?;
        self.key_interval = key_interval;
        Ok(())
    }

    pub fn key_pose_count(&self) -> usize {
        self.key_poses.len()
    }

    /// Time of the last key pose, zero while the clip has at most one
    pub fn length(&self) -> i64 {
        (self.key_poses.len().saturating_sub(1) as i64).saturating_mul(self.key_interval)
    }

    pub fn key_pose(&self, index: usize) -> Option<&Pose> {
        self.key_poses.get(index)
    }

    fn check_pose(&self, pose: &Pose) -> Result<()> {
        if pose.len() == self.track_count {
            Ok(())
        } else {
            Err(SkanimError::PoseSizeMismatch {
                expected: self.track_count,
                actual: pose.len(),
            })
        }
    }

    fn check_key(&self, index: usize) -> Result<()> {
        if index < self.key_poses.len() {
            Ok(())
        } else {
            Err(SkanimError::KeyIndexOutOfRange {
                index,
                count: self.key_poses.len(),
            })
        }
    }

    /// Append a key pose after the current last one
    pub fn add_key_pose(&mut self, pose: Pose) -> Result<()> {
        self.check_pose(&pose)?;
        checked_length(self.key_poses.len() + 1, self.key_interval)?;
        self.key_poses.push(pose);
        Ok(())
    }

    pub fn set_key_pose(&mut self, index: usize, pose: Pose) -> Result<()> {
        self.check_key(index)?;
        self.check_pose(&pose)?;
        self.key_poses[index] = pose;
        Ok(())
    }

    /// Remove a key pose, shifting later ones one interval earlier
    pub fn remove_key_pose(&mut self, index: usize) -> Result<Pose> {
        self.check_key(index)?;
        Ok(self.key_poses.remove(index))
    }

    pub fn clear_key_poses(&mut self) {
        self.key_poses.clear();
    }

    /// Sample at `time` into `pose`. A clip without key poses yields the
    /// identity pose.
    pub fn sample_into(&self, time: i64, pose: &mut Pose) -> Result<()> {
        let length = self.length();
        if !(0..=length).contains(&time) {
            return Err(SkanimError::TimeOutOfRange { time, length });
        }
        self.sample_unchecked(time, pose);
        Ok(())
    }

    pub fn extract_pose(&self, time: i64) -> Result<Pose> {
        let mut pose = Pose::new(self.track_count);
        self.sample_into(time, &mut pose)?;
        Ok(pose)
    }

    fn sample_unchecked(&self, time: i64, pose: &mut Pose) {
        let Some(last) = self.key_poses.len().checked_sub(1) else {
            *pose = Pose::new(self.track_count);
            return;
        };
        pose.resize(self.track_count);

        let (key, t) = key_position(time, self.key_interval);
        if key >= last || t <= 0.0 {
            pose.clone_from(&self.key_poses[key.min(last)]);
            return;
        }
        // Lengths were checked when the key poses were stored
        let lerped = Pose::lerp_into(t, &self.key_poses[key], &self.key_poses[key + 1], pose);
        debug_assert!(lerped.is_ok());
    }
}

/// Borrowed handle to either clip representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipRef<'a> {
    Tracks(&'a AnimationClip),
    KeyPoses(&'a KeyPoseClip),
}

impl ClipRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Tracks(clip) => clip.name(),
            Self::KeyPoses(clip) => clip.name(),
        }
    }

    pub fn track_count(&self) -> usize {
        match self {
            Self::Tracks(clip) => clip.track_count(),
            Self::KeyPoses(clip) => clip.track_count(),
        }
    }

    pub fn length(&self) -> i64 {
        match self {
            Self::Tracks(clip) => clip.length(),
            Self::KeyPoses(clip) => clip.length(),
        }
    }

    /// Sample at `time` clamped into `[0, length]`
    pub fn sample_into(&self, time: i64, pose: &mut Pose) {
        let time = time.clamp(0, self.length());
        match self {
            Self::Tracks(clip) => clip.sample_unchecked(time, pose),
            Self::KeyPoses(clip) => clip.sample_unchecked(time, pose),
        }
    }

    /// Root joint transform at `time`, identity for a clip without tracks
    pub fn sample_root(&self, time: i64) -> Transform {
        let mut pose = Pose::default();
        self.sample_into(time, &mut pose);
        pose.get(0).copied().unwrap_or(Transform::IDENTITY)
    }
}

impl<'a> From<&'a AnimationClip> for ClipRef<'a> {
    fn from(clip: &'a AnimationClip) -> Self {
        Self::Tracks(clip)
    }
}

impl<'a> From<&'a KeyPoseClip> for ClipRef<'a> {
    fn from(clip: &'a KeyPoseClip) -> Self {
        Self::KeyPoses(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pretty_assertions::assert_eq;

    fn up(y: f32) -> Transform {
        Transform::from_translation(Vec3::new(0.0, y, 0.0))
    }

    /// Two tracks, three keys, 100 time units apart. Track 1 rises one unit
    /// per key.
    fn rising() -> AnimationClip {
        let tracks = vec![Track::new(3), Track::from_keys(vec![up(0.0), up(1.0), up(2.0)])];
        AnimationClip::from_tracks("rise", 100, tracks).unwrap()
    }

    #[test]
    fn test_clip_length() {
        let clip = rising();
        assert_eq!(clip.length(), 200);
        assert_eq!(clip.track_count(), 2);
        assert_eq!(clip.key_count(), 3);
    }

    #[test]
    fn test_extract_pose_between_keys() {
        let pose = rising().extract_pose(150).unwrap();
        assert_eq!(pose.len(), 2);
        assert_eq!(pose[0], Transform::IDENTITY);
        assert!(pose[1].translation.abs_diff_eq(Vec3::new(0.0, 1.5, 0.0), 0.0001));
    }

    #[test]
    fn test_extract_pose_at_end() {
        let pose = rising().extract_pose(200).unwrap();
        assert_eq!(pose[1], up(2.0));
    }

    #[test]
    fn test_extract_pose_out_of_range() {
        let clip = rising();
        assert_eq!(
            clip.extract_pose(201),
            Err(SkanimError::TimeOutOfRange {
                time: 201,
                length: 200
            })
        );
        assert!(clip.extract_pose(-1).is_err());
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            AnimationClip::new("bad", 1, 2, 0),
            Err(SkanimError::InvalidKeyInterval(0))
        );
        assert_eq!(
            AnimationClip::new("bad", 1, 0, 10),
            Err(SkanimError::InvalidKeyCount(0))
        );
        assert_eq!(
            AnimationClip::from_tracks("bad", 10, vec![Track::new(2), Track::new(3)]),
            Err(SkanimError::TrackKeyCountMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_length_overflow_is_rejected() {
        let interval = i64::MAX / 2 + 1;
        assert_eq!(
            AnimationClip::new("long", 1, 3, interval),
            Err(SkanimError::InvalidKeyInterval(interval))
        );
        assert_eq!(
            AnimationClip::from_tracks("long", interval, vec![Track::new(3)]),
            Err(SkanimError::InvalidKeyInterval(interval))
        );
        // Two keys still fit
        assert_eq!(AnimationClip::new("long", 1, 2, interval).unwrap().length(), interval);

        let mut clip = KeyPoseClip::new("long", 1, interval).unwrap();
        clip.add_key_pose(Pose::new(1)).unwrap();
        clip.add_key_pose(Pose::new(1)).unwrap();
        assert_eq!(
            clip.add_key_pose(Pose::new(1)),
            Err(SkanimError::InvalidKeyInterval(interval))
        );
        assert_eq!(clip.key_pose_count(), 2);

        let mut short = KeyPoseClip::new("short", 1, 10).unwrap();
        for _ in 0..3 {
            short.add_key_pose(Pose::new(1)).unwrap();
        }
        assert!(short.set_key_interval(interval).is_err());
        assert_eq!(short.key_interval(), 10);
    }

    #[test]
    fn test_key_position_large_times() {
        let (key, t) = key_position(300_000_001, 3);
        assert_eq!(key, 100_000_000);
        assert!((t - 1.0 / 3.0).abs() < 0.0001);

        for time in [(1 << 40) + 7, i64::MAX - 1, 50_000_000_000] {
            let (_, t) = key_position(time, 1000);
            assert!((0.0..1.0).contains(&t));
        }
        assert_eq!(key_position(6_000_000_000, 2_000_000_000), (3, 0.0));
    }

    #[test]
    fn test_single_key_clip() {
        let mut clip = AnimationClip::new("still", 1, 1, 33).unwrap();
        clip.set_key(0, 0, up(4.0)).unwrap();
        assert_eq!(clip.length(), 0);
        assert_eq!(clip.extract_pose(0).unwrap()[0], up(4.0));
    }

    #[test]
    fn test_set_key_out_of_range() {
        let mut clip = rising();
        assert_eq!(
            clip.set_key(2, 0, Transform::IDENTITY),
            Err(SkanimError::KeyIndexOutOfRange { index: 2, count: 2 })
        );
        assert_eq!(
            clip.set_key(0, 3, Transform::IDENTITY),
            Err(SkanimError::KeyIndexOutOfRange { index: 3, count: 3 })
        );
    }

    #[test]
    fn test_key_pose_clip() {
        let mut clip = KeyPoseClip::new("kp", 1, 50).unwrap();
        assert_eq!(clip.length(), 0);
        assert_eq!(clip.extract_pose(0).unwrap()[0], Transform::IDENTITY);

        clip.add_key_pose(Pose::from_transforms(vec![up(0.0)])).unwrap();
        clip.add_key_pose(Pose::from_transforms(vec![up(2.0)])).unwrap();
        assert_eq!(clip.length(), 50);

        let pose = clip.extract_pose(25).unwrap();
        assert!(pose[0].translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 0.0001));
        assert_eq!(clip.extract_pose(50).unwrap()[0], up(2.0));
    }

    #[test]
    fn test_key_pose_editing() {
        let mut clip = KeyPoseClip::new("kp", 1, 10).unwrap();
        assert!(matches!(
            clip.add_key_pose(Pose::new(2)),
            Err(SkanimError::PoseSizeMismatch {
                expected: 1,
                actual: 2
            })
        ));

        for y in [0.0, 1.0, 2.0] {
            clip.add_key_pose(Pose::from_transforms(vec![up(y)])).unwrap();
        }
        clip.set_key_pose(0, Pose::from_transforms(vec![up(9.0)])).unwrap();
        let removed = clip.remove_key_pose(1).unwrap();
        assert_eq!(removed[0], up(1.0));
        assert_eq!(clip.key_pose_count(), 2);
        assert_eq!(clip.key_pose(1).unwrap()[0], up(2.0));
        assert_eq!(clip.key_pose(0).unwrap()[0], up(9.0));

        clip.clear_key_poses();
        assert_eq!(clip.key_pose_count(), 0);
        assert!(clip.remove_key_pose(0).is_err());
    }

    #[test]
    fn test_clip_ref_clamps() {
        let clip = rising();
        let clip_ref = ClipRef::from(&clip);
        let mut pose = Pose::default();
        clip_ref.sample_into(10_000, &mut pose);
        assert_eq!(pose[1], up(2.0));
        clip_ref.sample_into(-5, &mut pose);
        assert_eq!(pose[1], up(0.0));
        assert_eq!(clip_ref.name(), "rise");
    }
}
