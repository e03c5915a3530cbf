//! Skeletal Animation
//!
//! Turns sparse per-joint keyframe tracks into a dense skinning palette.
//!
//! - [`KeyframeTrack`] / [`Bone`]: per-joint interpolation of translation,
//!   rotation and scale
//! - [`Skeleton`]: the bind-pose hierarchy as an index arena
//! - [`BoneRegistry`]: model-wide joint name → id / offset matrix
//! - [`AnimationClip`]: an imported animation bound to a skeleton
//! - [`Animator`]: per-instance looping playback producing one matrix per bone id
//!
//! ```rust,ignore
//! let mut registry = BoneRegistry::default();
//! let clip = Arc::new(AnimationClip::new(&animation, &root, &mut registry)?);
//! let mut animator = Animator::with_clip(clip, &registry, AnimationSettings::default())?;
//! animator.play_animation();
//! animator.update_animation(dt);
//! upload(animator.as_bytes());
//! ```

pub mod animator;
pub mod bone;
pub mod clip;
pub mod registry;
pub mod skeleton;
pub mod system;
pub mod tracks;
pub mod values;

pub use animator::{Animator, PlaybackState};
pub use bone::{Bone, BoneCursors, BoneId};
pub use clip::{AnimationClip, JointBinding, read_missing_bones};
pub use registry::{BoneInfo, BoneRegistry};
pub use skeleton::{NodeIndex, Skeleton, SkeletonNode};
pub use system::{AnimationSystem, AnimatorKey};
pub use tracks::{
    ChannelInterpolation, ChannelKind, InterpolationMode, KeyPosition, KeyRotation, KeyScale,
    Keyframe, KeyframeCursor, KeyframeTrack,
};
pub use values::Interpolatable;
