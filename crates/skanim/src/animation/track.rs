//! Per-joint key sequences

use crate::error::{Result, SkanimError};
use crate::transform::Transform;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Evenly spaced transform keys for one joint
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Track {
    keys: Vec<Transform>,
}

impl Track {
    /// Create a track of `key_count` identity keys
    pub fn new(key_count: usize) -> Self {
        Self {
            keys: vec![Transform::IDENTITY; key_count],
        }
    }

    pub fn from_keys(keys: Vec<Transform>) -> Self {
        Self { keys }
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[Transform] {
        &self.keys
    }

    pub fn key(&self, index: usize) -> Option<&Transform> {
        self.keys.get(index)
    }

    /// Overwrite one key. The key count never changes.
    pub fn set_key(&mut self, index: usize, transform: Transform) -> Result<()> {
        let count = self.keys.len();
        let key = self
            .keys
            .get_mut(index)
            .ok_or(SkanimError::KeyIndexOutOfRange { index, count })?;
        *key = transform;
        Ok(())
    }

    /// Sample between `key` and `key + 1` at `t` in `[0, 1)`
    ///
    /// The last key is returned verbatim, there is no extrapolation. Keys past
    /// the end clamp to the last key and an empty track samples as identity.
    pub fn sample(&self, key: usize, t: f32) -> Transform {
        let Some(last) = self.keys.len().checked_sub(1) else {
            return Transform::IDENTITY;
        };
        debug_assert!(key <= last, "key {key} past the last key {last}");
        if key >= last {
            return self.keys[last];
        }
        if t <= 0.0 {
            return self.keys[key];
        }
        Transform::lerp(t, &self.keys[key], &self.keys[key + 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn ramp() -> Track {
        Track::from_keys(vec![
            Transform::from_translation(Vec3::ZERO),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)),
        ])
    }

    #[test]
    fn test_new_track_is_identity() {
        let track = Track::new(4);
        assert_eq!(track.key_count(), 4);
        assert!(track.keys().iter().all(|key| *key == Transform::IDENTITY));
    }

    #[test]
    fn test_sample_interpolates() {
        let sample = ramp().sample(1, 0.5);
        assert!(sample.translation.abs_diff_eq(Vec3::new(0.0, 1.5, 0.0), 0.0001));
    }

    #[test]
    fn test_sample_on_key() {
        let track = ramp();
        assert_eq!(track.sample(1, 0.0), track.keys()[1]);
    }

    #[test]
    fn test_sample_last_key_verbatim() {
        let track = ramp();
        assert_eq!(track.sample(2, 0.75), track.keys()[2]);
    }

    #[test]
    fn test_sample_empty_track() {
        assert_eq!(Track::default().sample(0, 0.5), Transform::IDENTITY);
    }

    #[test]
    fn test_set_key() {
        let mut track = Track::new(2);
        let key = Transform::from_scale(3.0);
        track.set_key(1, key).unwrap();
        assert_eq!(track.key(1), Some(&key));
        assert_eq!(
            track.set_key(2, key),
            Err(SkanimError::KeyIndexOutOfRange { index: 2, count: 2 })
        );
    }
}
