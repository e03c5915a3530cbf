//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`ArmatureError`] covers every failure that can surface
//! while building animation data:
//! - Malformed import data (missing root, empty or unsorted keyframe tracks)
//! - Bone registry exhaustion
//! - Skinning palette capacity violations
//! - glTF / JSON decoding errors (behind their features)
//!
//! Per-frame evaluation never returns these errors; see
//! [`Animator::update_animation`](crate::animation::Animator::update_animation).
//!
//! # Usage
//!
//! ```rust,ignore
//! use armature::errors::{ArmatureError, Result};
//!
//! fn load_clip() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::animation::tracks::ChannelKind;

/// The main error type for the animation subsystem.
#[derive(Error, Debug)]
pub enum ArmatureError {
    // ========================================================================
    // Import / Structural Errors
    // ========================================================================
    /// The imported joint hierarchy has no root node.
    #[error("Imported model has no hierarchy root")]
    MissingRoot,

    /// The animation is missing or has a non-positive duration.
    #[error("Animation '{name}' is missing or has a non-positive duration")]
    EmptyAnimation {
        /// Clip name
        name: String,
    },

    /// Ticks-per-second must be a finite positive number.
    #[error("Animation '{name}' has invalid ticks-per-second: {value}")]
    InvalidTicksPerSecond {
        /// Clip name
        name: String,
        /// The rejected value
        value: f32,
    },

    /// A channel track holds no keyframes.
    #[error("Bone '{bone}' has an empty {channel} track")]
    EmptyTrack {
        /// Joint name
        bone: String,
        /// Which channel
        channel: ChannelKind,
    },

    /// Keyframe timestamps are not strictly ascending.
    #[error("Bone '{bone}' {channel} track is not sorted at key {index}")]
    UnsortedKeyframes {
        /// Joint name
        bone: String,
        /// Which channel
        channel: ChannelKind,
        /// Index of the first offending key
        index: usize,
    },

    /// A keyframe carries a NaN or infinite component.
    #[error("Bone '{bone}' {channel} track has a non-finite key at {index}")]
    NonFiniteKeyframe {
        /// Joint name
        bone: String,
        /// Which channel
        channel: ChannelKind,
        /// Index of the offending key
        index: usize,
    },

    /// Two channels in one clip animate the same joint.
    #[error("Joint '{bone}' is animated by more than one channel in the same clip")]
    DuplicateChannel {
        /// Joint name
        bone: String,
    },

    // ========================================================================
    // Capacity Errors
    // ========================================================================
    /// The registry cannot hand out another bone id.
    #[error("Bone '{name}' would exceed the bone registry capacity of {capacity}")]
    BoneIdOverflow {
        /// Joint name that failed to register
        name: String,
        /// Registry capacity
        capacity: usize,
    },

    /// A clip references bone ids beyond the animator's palette.
    #[error("Skinning palette needs {required} matrices but capacity is {capacity}")]
    CapacityExceeded {
        /// Number of slots required
        required: usize,
        /// Available slots
        capacity: usize,
    },

    // ========================================================================
    // I/O & Format Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    Gltf(String),

    /// JSON parsing error.
    #[cfg(feature = "serialize")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

#[cfg(feature = "gltf")]
impl From<gltf::Error> for ArmatureError {
    fn from(err: gltf::Error) -> Self {
        ArmatureError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, ArmatureError>`.
pub type Result<T> = std::result::Result<T, ArmatureError>;
