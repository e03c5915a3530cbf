use glam::Mat4;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::bone::{Bone, BoneId};
use crate::animation::registry::{BoneInfo, BoneRegistry};
use crate::animation::skeleton::{NodeIndex, Skeleton};
use crate::assets::import::{ImportedAnimation, ImportedModel, ImportedNode};
use crate::errors::{ArmatureError, Result};

/// What a skeleton node is bound to, resolved once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointBinding {
    /// Index into [`AnimationClip::bones`] when the joint is animated.
    pub bone: Option<usize>,
    /// Registry entry when the joint owns a palette slot.
    pub info: Option<BoneInfo>,
}

/// An imported animation bound to its model's skeleton.
///
/// Immutable once built, apart from [`refresh_bindings`](Self::refresh_bindings).
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    ticks_per_second: f32,
    skeleton: Skeleton,
    bones: Vec<Bone>,
    // Indexed by NodeIndex
    joints: Vec<JointBinding>,
}

impl AnimationClip {
    /// Builds a clip from one imported animation and the model hierarchy.
    ///
    /// Joints animated by the clip but missing from `registry` are registered
    /// with the next free id and an identity offset.
    pub fn new(
        animation: &ImportedAnimation,
        root: &ImportedNode,
        registry: &mut BoneRegistry,
    ) -> Result<Self> {
        if !(animation.duration.is_finite() && animation.duration > 0.0) {
            return Err(ArmatureError::EmptyAnimation {
                name: animation.name.clone(),
            });
        }
        if !(animation.ticks_per_second.is_finite() && animation.ticks_per_second > 0.0) {
            return Err(ArmatureError::InvalidTicksPerSecond {
                name: animation.name.clone(),
                value: animation.ticks_per_second,
            });
        }

        let skeleton = Skeleton::build(root);
        let bones = read_missing_bones(animation, registry)?;

        let mut clip = Self {
            name: animation.name.clone(),
            duration: animation.duration,
            ticks_per_second: animation.ticks_per_second,
            skeleton,
            bones,
            joints: Vec::new(),
        };
        clip.refresh_bindings(registry);
        clip.warn_on_short_channels();

        log::info!(
            "Animation clip '{}' loaded: {} bones, {} joints, duration {} ticks @ {} tps",
            clip.name,
            clip.bones.len(),
            clip.skeleton.len(),
            clip.duration,
            clip.ticks_per_second
        );

        Ok(clip)
    }

    /// Builds the `index`-th animation of an imported model.
    pub fn from_model(
        model: &ImportedModel,
        index: usize,
        registry: &mut BoneRegistry,
    ) -> Result<Self> {
        let root = model.root.as_ref().ok_or(ArmatureError::MissingRoot)?;
        let animation =
            model
                .animations
                .get(index)
                .ok_or_else(|| ArmatureError::EmptyAnimation {
                    name: format!("#{index}"),
                })?;
        Self::new(animation, root, registry)
    }

    /// Builds every animation of an imported model, in file order.
    ///
    /// Later clips may register joints earlier ones never animate, so every
    /// clip is re-bound against the final registry before returning.
    pub fn load_all(model: &ImportedModel, registry: &mut BoneRegistry) -> Result<Vec<Self>> {
        let root = model.root.as_ref().ok_or(ArmatureError::MissingRoot)?;
        let mut clips = model
            .animations
            .iter()
            .map(|animation| Self::new(animation, root, registry))
            .collect::<Result<Vec<_>>>()?;

        for clip in &mut clips {
            clip.refresh_bindings(registry);
        }
        Ok(clips)
    }

    /// Re-resolves every node against `registry`.
    ///
    /// Bindings are a snapshot taken when the clip is built. Call this after
    /// meshes or other clips register further joints, before binding the
    /// clip to an animator; nodes that gained an entry then receive palette
    /// writes instead of staying at their previous value.
    pub fn refresh_bindings(&mut self, registry: &BoneRegistry) {
        let bone_lookup: FxHashMap<&str, usize> = self
            .bones
            .iter()
            .enumerate()
            .map(|(i, bone)| (bone.name(), i))
            .collect();

        self.joints = self
            .skeleton
            .nodes()
            .iter()
            .map(|node| JointBinding {
                bone: bone_lookup.get(node.name.as_str()).copied(),
                info: registry.get(&node.name).copied(),
            })
            .collect();
    }

    fn warn_on_short_channels(&self) {
        for bone in &self.bones {
            let earliest_end = bone
                .positions()
                .end_time()
                .min(bone.rotations().end_time())
                .min(bone.scales().end_time());
            let animated = !(bone.positions().is_constant()
                && bone.rotations().is_constant()
                && bone.scales().is_constant());
            if animated && earliest_end < self.duration {
                log::warn!(
                    "Clip '{}': bone '{}' has keys ending at {} before duration {}, holding last key",
                    self.name,
                    bone.name(),
                    earliest_end,
                    self.duration
                );
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in ticks.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Length in seconds.
    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name() == name)
    }

    #[inline]
    #[must_use]
    pub fn joint(&self, index: NodeIndex) -> &JointBinding {
        &self.joints[index.index()]
    }

    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[JointBinding] {
        &self.joints
    }

    /// Smallest palette length that covers every slot this clip writes.
    #[must_use]
    pub fn required_capacity(&self) -> usize {
        self.joints
            .iter()
            .filter_map(|j| j.info)
            .map(|info| info.id.index() + 1)
            .chain(self.bones.iter().map(|b| b.id().index() + 1))
            .max()
            .unwrap_or(0)
    }
}

/// Creates a [`Bone`] for every channel of `animation`.
///
/// Joint names absent from `registry` get the next id and an identity offset.
/// Joints without a channel get no bone and stay at their bind pose.
///
/// Every channel is validated before anything is registered: on error the
/// registry is left exactly as it was.
pub fn read_missing_bones(
    animation: &ImportedAnimation,
    registry: &mut BoneRegistry,
) -> Result<Vec<Bone>> {
    let mut seen = FxHashSet::default();
    let mut bones = Vec::with_capacity(animation.channels.len());

    for channel in &animation.channels {
        if !seen.insert(channel.node_name.as_str()) {
            return Err(ArmatureError::DuplicateChannel {
                bone: channel.node_name.clone(),
            });
        }

        // Id is assigned below, once all key lists passed
        bones.push(Bone::with_interpolation(
            channel.node_name.clone(),
            BoneId(u32::MAX),
            channel.positions.clone(),
            channel.rotations.clone(),
            channel.scales.clone(),
            channel.interpolation,
        )?);
    }

    let mut next = registry.len();
    for bone in &bones {
        if registry.contains(bone.name()) {
            continue;
        }
        if next >= registry.capacity() {
            return Err(ArmatureError::BoneIdOverflow {
                name: bone.name().to_string(),
                capacity: registry.capacity(),
            });
        }
        next += 1;
    }

    for bone in &mut bones {
        let info = registry.get_or_register(bone.name(), Mat4::IDENTITY)?;
        bone.set_id(info.id);
    }

    Ok(bones)
}
