use std::fmt;

use glam::{Mat4, Quat, Vec3};

use crate::animation::tracks::{
    ChannelInterpolation, ChannelKind, KeyPosition, KeyRotation, KeyScale, KeyframeCursor,
    KeyframeTrack, Segment,
};
use crate::animation::values::Interpolatable;
use crate::errors::Result;
use crate::transform::Transform;

/// Index of a joint's slot in the skinning palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneId(pub u32);

impl BoneId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-instance segment caches for the three channels of one bone.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoneCursors {
    pub translation: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

/// An animated joint: three keyframe channels plus the last evaluated pose.
///
/// The cached pose belongs to standalone use through [`update`](Self::update).
/// Clips shared between animators are evaluated with [`sample`](Self::sample)
/// or [`sample_with_cursors`](Self::sample_with_cursors), which leave the cache
/// untouched.
#[derive(Debug, Clone)]
pub struct Bone {
    name: String,
    id: BoneId,
    positions: KeyframeTrack<Vec3>,
    rotations: KeyframeTrack<Quat>,
    scales: KeyframeTrack<Vec3>,
    local_transform: Mat4,
}

impl Bone {
    /// Builds a bone from raw key lists, copied verbatim.
    ///
    /// Every list must be non-empty with strictly ascending timestamps.
    pub fn new(
        name: impl Into<String>,
        id: BoneId,
        positions: Vec<KeyPosition>,
        rotations: Vec<KeyRotation>,
        scales: Vec<KeyScale>,
    ) -> Result<Self> {
        Self::with_interpolation(
            name,
            id,
            positions,
            rotations,
            scales,
            ChannelInterpolation::default(),
        )
    }

    /// Like [`new`](Self::new), with an interpolation mode per channel.
    pub fn with_interpolation(
        name: impl Into<String>,
        id: BoneId,
        positions: Vec<KeyPosition>,
        rotations: Vec<KeyRotation>,
        scales: Vec<KeyScale>,
        interpolation: ChannelInterpolation,
    ) -> Result<Self> {
        let name = name.into();
        let positions = KeyframeTrack::new(positions, interpolation.translation)
            .map_err(|e| e.into_error(&name, ChannelKind::Translation))?;
        let rotations = KeyframeTrack::new(rotations, interpolation.rotation)
            .map_err(|e| e.into_error(&name, ChannelKind::Rotation))?;
        let scales = KeyframeTrack::new(scales, interpolation.scale)
            .map_err(|e| e.into_error(&name, ChannelKind::Scale))?;

        Ok(Self {
            name,
            id,
            positions,
            rotations,
            scales,
            local_transform: Mat4::IDENTITY,
        })
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Interpolates all three channels at `time` and caches the local matrix
    /// for [`local_transform`](Self::local_transform).
    ///
    /// Convenience for evaluating a bone on its own; the animator samples
    /// without mutating the bone.
    pub fn update(&mut self, time: f32) {
        self.local_transform = self.sample(time).to_matrix();
    }

    /// Interpolated local TRS at `time`, using a plain forward scan.
    #[must_use]
    pub fn sample(&self, time: f32) -> Transform {
        self.compose(
            self.positions.segment(time),
            self.rotations.segment(time),
            self.scales.segment(time),
        )
    }

    /// Interpolated local TRS at `time`, reusing the caller's cursors.
    pub fn sample_with_cursors(&self, time: f32, cursors: &mut BoneCursors) -> Transform {
        self.compose(
            self.positions
                .segment_with_cursor(time, &mut cursors.translation),
            self.rotations.segment_with_cursor(time, &mut cursors.rotation),
            self.scales.segment_with_cursor(time, &mut cursors.scale),
        )
    }

    fn compose(&self, translation: Segment, rotation: Segment, scale: Segment) -> Transform {
        Transform::new(
            self.positions.value_at(translation),
            // slerp drifts off unit length over long chains
            self.rotations.value_at(rotation).renormalize(),
            self.scales.value_at(scale),
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> BoneId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: BoneId) {
        self.id = id;
    }

    /// Local matrix from the most recent [`update`](Self::update).
    #[inline]
    #[must_use]
    pub fn local_transform(&self) -> Mat4 {
        self.local_transform
    }

    #[inline]
    #[must_use]
    pub fn positions(&self) -> &KeyframeTrack<Vec3> {
        &self.positions
    }

    #[inline]
    #[must_use]
    pub fn rotations(&self) -> &KeyframeTrack<Quat> {
        &self.rotations
    }

    #[inline]
    #[must_use]
    pub fn scales(&self) -> &KeyframeTrack<Vec3> {
        &self.scales
    }

    /// Timestamp of the latest key over all channels.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.positions
            .end_time()
            .max(self.rotations.end_time())
            .max(self.scales.end_time())
    }
}
