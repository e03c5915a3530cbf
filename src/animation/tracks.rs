use std::fmt;

use glam::{Quat, Vec3};
use thiserror::Error;

use crate::animation::values::Interpolatable;
use crate::errors::ArmatureError;

/// Which local-transform component a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelKind {
    Translation,
    Rotation,
    Scale,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelKind::Translation => "translation",
            ChannelKind::Rotation => "rotation",
            ChannelKind::Scale => "scale",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

/// Interpolation of each channel of one joint.
///
/// Importers such as glTF pick the mode per sampler, so translation,
/// rotation and scale of the same joint may differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct ChannelInterpolation {
    pub translation: InterpolationMode,
    pub rotation: InterpolationMode,
    pub scale: InterpolationMode,
}

impl ChannelInterpolation {
    /// The same mode on all three channels.
    #[must_use]
    pub const fn uniform(mode: InterpolationMode) -> Self {
        Self {
            translation: mode,
            rotation: mode,
            scale: mode,
        }
    }

    /// Mode of the given channel.
    #[must_use]
    pub fn get(&self, channel: ChannelKind) -> InterpolationMode {
        match channel {
            ChannelKind::Translation => self.translation,
            ChannelKind::Rotation => self.rotation,
            ChannelKind::Scale => self.scale,
        }
    }

    pub fn set(&mut self, channel: ChannelKind, mode: InterpolationMode) {
        match channel {
            ChannelKind::Translation => self.translation = mode,
            ChannelKind::Rotation => self.rotation = mode,
            ChannelKind::Scale => self.scale = mode,
        }
    }
}

/// A `(timestamp, value)` sample. Timestamps are in clip ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    pub timestamp: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    #[inline]
    pub fn new(timestamp: f32, value: T) -> Self {
        Self { timestamp, value }
    }
}

pub type KeyPosition = Keyframe<Vec3>;
pub type KeyRotation = Keyframe<Quat>;
pub type KeyScale = Keyframe<Vec3>;

/// Why a key list was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("track has no keys")]
    Empty,
    #[error("timestamps not strictly ascending at key {0}")]
    Unsorted(usize),
    #[error("non-finite key at {0}")]
    NonFinite(usize),
}

impl KeyError {
    /// Attaches the joint and channel the rejected keys belonged to.
    #[must_use]
    pub fn into_error(self, bone: &str, channel: ChannelKind) -> ArmatureError {
        let bone = bone.to_string();
        match self {
            KeyError::Empty => ArmatureError::EmptyTrack { bone, channel },
            KeyError::Unsorted(index) => ArmatureError::UnsortedKeyframes {
                bone,
                channel,
                index,
            },
            KeyError::NonFinite(index) => ArmatureError::NonFiniteKeyframe {
                bone,
                channel,
                index,
            },
        }
    }
}

/// Remembers the last segment a track was sampled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// The bracketing pair for a sample time.
///
/// `index` is the left key. When `index` is the last key the sample is
/// clamped to it and `factor` is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub factor: f32,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Ordered keyframes of one channel for one joint.
///
/// Always holds at least one key, with strictly ascending timestamps.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    keys: Vec<Keyframe<T>>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Takes the key list verbatim after checking it.
    pub fn new(keys: Vec<Keyframe<T>>, interpolation: InterpolationMode) -> Result<Self, KeyError> {
        if keys.is_empty() {
            return Err(KeyError::Empty);
        }
        for (i, key) in keys.iter().enumerate() {
            if !key.timestamp.is_finite() || !key.value.is_finite() {
                return Err(KeyError::NonFinite(i));
            }
            if i > 0 && key.timestamp <= keys[i - 1].timestamp {
                return Err(KeyError::Unsorted(i));
            }
        }

        Ok(Self {
            keys,
            interpolation,
        })
    }

    /// A single-key track that evaluates to `value` at every time.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
            interpolation: InterpolationMode::Linear,
        }
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.keys.len() == 1
    }

    #[inline]
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    #[inline]
    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.keys[0].timestamp
    }

    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.keys[self.keys.len() - 1].timestamp
    }

    // ========================================================================
    // Segment lookup
    // ========================================================================

    /// Forward scan for the first `i` with `time < timestamp[i + 1]`.
    ///
    /// Past the last key the scan finds nothing and the result clamps to the
    /// final key.
    #[must_use]
    pub fn segment(&self, time: f32) -> Segment {
        let len = self.keys.len();
        if len == 1 {
            return Segment {
                index: 0,
                factor: 0.0,
            };
        }

        for i in 0..len - 1 {
            if time < self.keys[i + 1].timestamp {
                return self.segment_at(i, time);
            }
        }

        Segment {
            index: len - 1,
            factor: 0.0,
        }
    }

    /// Same result as [`segment`](Self::segment), starting from the cursor.
    ///
    /// Scans at most `MAX_SCAN_OFFSET` keys either way from the cached index,
    /// then falls back to a binary search (scrubbing, loop wrap).
    pub fn segment_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Segment {
        let len = self.keys.len();
        if len == 1 {
            return Segment {
                index: 0,
                factor: 0.0,
            };
        }

        // Cursor may come from a different track (clip rebound)
        if cursor.last_index >= len {
            cursor.last_index = 0;
        }
        let i = cursor.last_index;
        let t_curr = self.keys[i].timestamp;

        let found = if time >= t_curr {
            // Forward playback: only the right boundary needs checking
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.keys[len - 1].timestamp {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.keys[idx + 1].timestamp {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: time < keys[i], look for the left boundary
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.keys[idx].timestamp {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found.unwrap_or_else(|| {
            let next = self.keys.partition_point(|k| k.timestamp <= time);
            next.saturating_sub(1)
        });
        cursor.last_index = index;

        if index >= len - 1 {
            Segment {
                index: len - 1,
                factor: 0.0,
            }
        } else {
            self.segment_at(index, time)
        }
    }

    fn segment_at(&self, index: usize, time: f32) -> Segment {
        let t0 = self.keys[index].timestamp;
        let t1 = self.keys[index + 1].timestamp;
        // Before the first key the factor goes negative; clamp to the first value
        let factor = ((time - t0) / (t1 - t0)).clamp(0.0, 1.0);
        Segment { index, factor }
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    #[must_use]
    pub fn value_at(&self, segment: Segment) -> T {
        let left = self.keys[segment.index].value;
        if segment.index + 1 >= self.keys.len() {
            return left;
        }
        match self.interpolation {
            InterpolationMode::Step => left,
            InterpolationMode::Linear => {
                let right = self.keys[segment.index + 1].value;
                T::interpolate_linear(left, right, segment.factor)
            }
        }
    }

    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        self.value_at(self.segment(time))
    }

    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let segment = self.segment_with_cursor(time, cursor);
        self.value_at(segment)
    }
}
