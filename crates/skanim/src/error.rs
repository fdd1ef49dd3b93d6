use thiserror::Error;

/// Error types for skeleton mutation, clip construction and sampling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkanimError {
    /// A joint index does not address a joint of the skeleton
    #[error("Joint index {index} out of range (skeleton has {count} joints)")]
    JointIndexOutOfRange { index: usize, count: usize },

    /// The joint being attached still carries a parent link
    #[error("Joint '{0}' already has a parent")]
    AlreadyParented(String),

    /// A joint with this name already exists in the skeleton
    #[error("Duplicate joint name: '{0}'")]
    DuplicateJointName(String),

    /// Two poses, or a pose and a clip, disagree on joint count
    #[error("Pose size mismatch: expected {expected} joints, got {actual}")]
    PoseSizeMismatch { expected: usize, actual: usize },

    /// Key interval must be strictly positive
    #[error("Invalid key interval: {0} (must be > 0 and keep the clip length within i64)")]
    InvalidKeyInterval(i64),

    /// Clips need at least one key
    #[error("Invalid key count: {0} (must be >= 1)")]
    InvalidKeyCount(usize),

    /// A track's key count differs from its clip's key count
    #[error("Track key count mismatch: clip has {expected} keys, track has {actual}")]
    TrackKeyCountMismatch { expected: usize, actual: usize },

    /// A key or track index is outside the clip
    #[error("Key index {index} out of range (count {count})")]
    KeyIndexOutOfRange { index: usize, count: usize },

    /// Sampling time is outside `[0, length]`
    #[error("Local time {time} out of range [0, {length}]")]
    TimeOutOfRange { time: i64, length: i64 },

    /// Skinning ids do not form a dense palette
    #[error("Invalid skinning ids: {0}")]
    InvalidSkinningIds(String),

    /// The importer produced inconsistent data
    #[error("Import error: {0}")]
    Import(String),
}

/// Result type using SkanimError
pub type Result<T> = std::result::Result<T, SkanimError>;
