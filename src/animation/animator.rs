use std::sync::Arc;

use glam::Mat4;

use crate::animation::bone::BoneCursors;
use crate::animation::clip::AnimationClip;
use crate::animation::registry::BoneRegistry;
use crate::animation::skeleton::NodeIndex;
use crate::errors::{ArmatureError, Result};
use crate::settings::AnimationSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Per-instance player for one [`AnimationClip`].
///
/// Owns the playhead and the skinning palette (one matrix per bone id) the
/// renderer uploads. The clip itself is shared and never mutated; per-instance
/// sampling state (keyframe cursors) lives here.
///
/// Playback always loops. There is no pause: [`stop`](Self::stop) keeps the
/// playhead, and [`play_animation`](Self::play_animation) restarts from zero.
#[derive(Debug, Clone)]
pub struct Animator {
    clip: Option<Arc<AnimationClip>>,
    time: f32,
    state: PlaybackState,
    settings: AnimationSettings,

    final_matrices: Vec<Mat4>,
    palette_version: u64,

    cursors: Vec<BoneCursors>,
    // Reused traversal stack
    stack: Vec<(NodeIndex, Mat4)>,
}

impl Animator {
    /// Creates a stopped animator with a palette of `joint_count` identity
    /// matrices.
    pub fn new(joint_count: usize, settings: AnimationSettings) -> Result<Self> {
        if joint_count > settings.max_bones {
            return Err(ArmatureError::CapacityExceeded {
                required: joint_count,
                capacity: settings.max_bones,
            });
        }

        Ok(Self {
            clip: None,
            time: 0.0,
            state: PlaybackState::Stopped,
            settings,
            final_matrices: vec![Mat4::IDENTITY; joint_count],
            palette_version: 0,
            cursors: Vec::new(),
            stack: Vec::new(),
        })
    }

    /// Sizes the palette to the model's registered joint count.
    pub fn for_registry(registry: &BoneRegistry, settings: AnimationSettings) -> Result<Self> {
        Self::new(registry.len(), settings)
    }

    /// Creates an animator sized for `registry` and binds `clip`.
    pub fn with_clip(
        clip: Arc<AnimationClip>,
        registry: &BoneRegistry,
        settings: AnimationSettings,
    ) -> Result<Self> {
        let mut animator = Self::for_registry(registry, settings)?;
        animator.bind_clip(clip)?;
        Ok(animator)
    }

    // ========================================================================
    // Control surface
    // ========================================================================

    /// Makes `clip` the active clip without starting playback.
    ///
    /// The palette grows (new slots start as identity) when the clip covers
    /// ids registered after this animator was created, up to
    /// [`max_bones`](AnimationSettings::max_bones). Every slot the clip covers
    /// is reset to its bind-pose value.
    ///
    /// The clip's joint bindings must be current for the registry it was
    /// built against; see [`AnimationClip::refresh_bindings`].
    pub fn bind_clip(&mut self, clip: Arc<AnimationClip>) -> Result<()> {
        let required = clip.required_capacity();
        if required > self.settings.max_bones {
            return Err(ArmatureError::CapacityExceeded {
                required,
                capacity: self.settings.max_bones,
            });
        }
        if required > self.final_matrices.len() {
            log::debug!(
                "Animator: palette grown from {} to {required} for clip '{}'",
                self.final_matrices.len(),
                clip.name()
            );
            self.final_matrices.resize(required, Mat4::IDENTITY);
        }

        self.cursors = vec![BoneCursors::default(); clip.bones().len()];
        self.clip = Some(clip);
        self.bind_pose();
        Ok(())
    }

    /// Restarts the active clip from zero.
    pub fn play_animation(&mut self) {
        self.time = 0.0;
        if self.clip.is_none() {
            log::warn!("Animator: play requested with no clip bound, staying stopped");
            self.state = PlaybackState::Stopped;
            return;
        }
        self.cursors.fill(BoneCursors::default());
        self.state = PlaybackState::Playing;
    }

    /// Binds `clip` and plays it from zero.
    pub fn play_clip(&mut self, clip: Arc<AnimationClip>) -> Result<()> {
        self.bind_clip(clip)?;
        self.play_animation();
        Ok(())
    }

    /// Stops playback. The playhead is kept.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    /// Advances the playhead by `dt` seconds and rebuilds the palette.
    ///
    /// Does nothing unless playing. Never fails: a non-finite pose is logged
    /// and the affected slot keeps its previous matrix.
    pub fn update_animation(&mut self, dt: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(clip) = self.clip.clone() else {
            return;
        };

        let duration = clip.duration();
        let advanced = self.time + clip.ticks_per_second() * dt;
        if advanced.is_finite() {
            self.time = advanced.rem_euclid(duration);
            // rem_euclid rounds tiny negatives up to `duration`
            if self.time >= duration {
                self.time = 0.0;
            }
        } else {
            log::warn!("Animator: non-finite time step (dt = {dt}), playhead unchanged");
        }

        self.calculate_bone_transforms(&clip);
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Playhead in clip ticks.
    #[inline]
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> Option<&Arc<AnimationClip>> {
        self.clip.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    // ========================================================================
    // Renderer hand-off
    // ========================================================================

    /// Skinning palette indexed by bone id.
    #[inline]
    #[must_use]
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        &self.final_matrices
    }

    /// The palette as raw bytes, ready for a uniform or storage buffer.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.final_matrices)
    }

    /// Bumped every time the palette is rewritten.
    #[inline]
    #[must_use]
    pub fn palette_version(&self) -> u64 {
        self.palette_version
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.final_matrices.len()
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Writes `bindGlobal * offset` into every slot the active clip covers.
    pub fn bind_pose(&mut self) {
        let Some(clip) = self.clip.clone() else {
            return;
        };

        let skeleton = clip.skeleton();
        let globals = skeleton.bind_globals();
        let mut out_of_range = 0usize;
        for (i, joint) in clip.joints().iter().enumerate() {
            let Some(info) = joint.info else {
                continue;
            };
            match self.final_matrices.get_mut(info.id.index()) {
                Some(slot) => *slot = globals[i] * info.offset,
                None => out_of_range += 1,
            }
        }
        if out_of_range > 0 {
            log::warn!(
                "Clip '{}': {out_of_range} joints outside the palette of {}",
                clip.name(),
                self.final_matrices.len()
            );
        }
        self.palette_version += 1;
    }

    /// Depth-first walk from the root, composing `parent * local` and writing
    /// `global * offset` for every registered joint.
    fn calculate_bone_transforms(&mut self, clip: &AnimationClip) {
        let skeleton = clip.skeleton();
        let time = self.time;
        let use_cursors = self.settings.use_keyframe_cursors;

        // Take the scratch stack out to avoid borrowing self twice
        let mut stack = std::mem::take(&mut self.stack);
        stack.clear();
        stack.push((skeleton.root(), Mat4::IDENTITY));

        let mut non_finite = 0usize;
        let mut out_of_range = 0usize;

        while let Some((index, parent_global)) = stack.pop() {
            let node = skeleton.node(index);
            let joint = clip.joint(index);

            let local = match joint.bone {
                Some(b) => {
                    let bone = &clip.bones()[b];
                    let pose = if use_cursors {
                        bone.sample_with_cursors(time, &mut self.cursors[b])
                    } else {
                        bone.sample(time)
                    };
                    pose.to_matrix()
                }
                None => node.bind_transform,
            };

            let global = parent_global * local;

            if let Some(info) = joint.info {
                let skinning = global * info.offset;
                match self.final_matrices.get_mut(info.id.index()) {
                    Some(slot) if skinning.is_finite() => *slot = skinning,
                    Some(_) => non_finite += 1,
                    None => out_of_range += 1,
                }
            }

            // Reverse so children pop in import order
            stack.extend(node.children.iter().rev().map(|&c| (c, global)));
        }

        self.stack = stack;
        self.palette_version += 1;

        if non_finite > 0 {
            log::warn!(
                "Clip '{}': {non_finite} non-finite joint matrices at t={time}, kept previous values",
                clip.name()
            );
        }
        if out_of_range > 0 {
            log::warn!(
                "Clip '{}': {out_of_range} joints outside the palette of {}",
                clip.name(),
                self.final_matrices.len()
            );
        }
    }
}
