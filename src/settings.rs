//! Animation Settings
//!
//! This module defines the runtime configuration shared by the bone registry
//! and every [`Animator`](crate::animation::Animator).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use armature::settings::AnimationSettings;
//!
//! // Default: 100-matrix palette, cursor-accelerated sampling
//! let settings = AnimationSettings::default();
//!
//! // A larger palette for high-detail rigs
//! let settings = AnimationSettings {
//!     max_bones: 256,
//!     ..Default::default()
//! };
//! ```

/// Default upper bound on the number of skinning matrices per model.
///
/// Matches the size of the joint array commonly declared in skinning shaders.
pub const MAX_BONES: usize = 100;

/// Configuration for bone registration and per-frame evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSettings {
    /// Hard upper bound on bone ids and on the skinning palette length.
    ///
    /// The registry refuses to assign an id `>= max_bones`, and an animator
    /// refuses a joint count above it.
    pub max_bones: usize,

    /// Keep a [`KeyframeCursor`](crate::animation::tracks::KeyframeCursor) per
    /// channel so forward playback finds its segment in amortised O(1).
    ///
    /// When disabled every sample scans forward from the first key. Both
    /// paths return identical values.
    pub use_keyframe_cursors: bool,
}

impl Default for AnimationSettings {
    #[inline]
    fn default() -> Self {
        Self {
            max_bones: MAX_BONES,
            use_keyframe_cursors: true,
        }
    }
}

impl AnimationSettings {
    /// Returns settings with the given palette bound and defaults elsewhere.
    #[inline]
    #[must_use]
    pub fn with_max_bones(max_bones: usize) -> Self {
        Self {
            max_bones,
            ..Self::default()
        }
    }
}
