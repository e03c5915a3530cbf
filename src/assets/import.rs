//! Scene Importer contract
//!
//! Plain data handed over by whatever parses the model file: the joint
//! hierarchy with bind transforms, and per-animation keyframe channels.
//! Nothing here is validated; [`AnimationClip`](crate::animation::AnimationClip)
//! construction does that.

use glam::Mat4;

use crate::animation::tracks::{ChannelInterpolation, KeyPosition, KeyRotation, KeyScale};

/// A node of the imported scene graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportedNode {
    pub name: String,
    /// Local bind-pose transform relative to the parent.
    pub transform: Mat4,
    /// In import order.
    #[cfg_attr(feature = "serialize", serde(default))]
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ImportedNode::count).sum::<usize>()
    }
}

/// Keyframes of one joint within one animation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportedChannel {
    pub node_name: String,
    pub positions: Vec<KeyPosition>,
    pub rotations: Vec<KeyRotation>,
    pub scales: Vec<KeyScale>,
    /// Per-channel mode; channels may differ (glTF samplers are per path).
    #[cfg_attr(feature = "serialize", serde(default))]
    pub interpolation: ChannelInterpolation,
}

/// One animation as read from the source file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportedAnimation {
    pub name: String,
    /// In ticks.
    pub duration: f32,
    pub ticks_per_second: f32,
    pub channels: Vec<ImportedChannel>,
}

/// Everything the animation subsystem needs from one model file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportedModel {
    pub root: Option<ImportedNode>,
    #[cfg_attr(feature = "serialize", serde(default))]
    pub animations: Vec<ImportedAnimation>,
}

#[cfg(feature = "serialize")]
impl ImportedModel {
    /// Parses a model description from JSON.
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
