#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod errors;
pub mod settings;
pub mod transform;

pub use animation::{
    AnimationClip, AnimationSystem, Animator, AnimatorKey, Bone, BoneId, BoneInfo, BoneRegistry,
    PlaybackState, Skeleton,
};
pub use assets::{ImportedAnimation, ImportedChannel, ImportedModel, ImportedNode};
pub use errors::{ArmatureError, Result};
pub use settings::{AnimationSettings, MAX_BONES};
pub use transform::Transform;
