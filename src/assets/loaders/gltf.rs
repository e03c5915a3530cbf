use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use rustc_hash::FxHashMap;

use crate::animation::bone::BoneId;
use crate::animation::registry::BoneRegistry;
use crate::animation::tracks::{ChannelKind, InterpolationMode, Keyframe};
use crate::assets::import::{ImportedAnimation, ImportedChannel, ImportedModel, ImportedNode};
use crate::errors::Result;

/// Name given to the node that parents several scene roots.
pub const SYNTHETIC_ROOT_NAME: &str = "__scene_root__";

/// glTF sampler times are seconds.
const GLTF_TICKS_PER_SECOND: f32 = 1.0;

/// Length given to animations whose keys all sit at t = 0 (static poses).
const SINGLE_FRAME_DURATION: f32 = 1.0 / 30.0;

/// Result of importing the skeletal parts of a glTF file.
#[derive(Debug, Clone, Default)]
pub struct GltfImport {
    pub model: ImportedModel,
    /// Per skin: glTF joint index → palette id. Mesh loaders remap
    /// `JOINTS_0` through this.
    pub skin_joints: Vec<Vec<BoneId>>,
}

/// Reads hierarchy, skins and animations out of glTF 2.0 documents.
pub struct GltfLoader;

impl GltfLoader {
    pub fn load(path: impl AsRef<Path>, registry: &mut BoneRegistry) -> Result<GltfImport> {
        let (document, buffers, _images) = gltf::import(path)?;
        Self::from_document(&document, &buffers, registry)
    }

    pub fn load_slice(bytes: &[u8], registry: &mut BoneRegistry) -> Result<GltfImport> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;
        Self::from_document(&document, &buffers, registry)
    }

    pub fn from_document(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        registry: &mut BoneRegistry,
    ) -> Result<GltfImport> {
        let root = Self::load_hierarchy(document);
        // Skins first: their inverse-bind matrices become the joint offsets
        let skin_joints = Self::load_skins(document, buffers, registry)?;
        let animations = Self::load_animations(document, buffers);

        Ok(GltfImport {
            model: ImportedModel { root, animations },
            skin_joints,
        })
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    fn load_hierarchy(document: &gltf::Document) -> Option<ImportedNode> {
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())?;

        let mut roots: Vec<ImportedNode> = scene.nodes().map(|n| Self::convert_node(&n)).collect();
        match roots.len() {
            0 => None,
            1 => roots.pop(),
            _ => Some(ImportedNode {
                name: SYNTHETIC_ROOT_NAME.to_string(),
                transform: Mat4::IDENTITY,
                children: roots,
            }),
        }
    }

    fn convert_node(node: &gltf::Node) -> ImportedNode {
        ImportedNode {
            name: node_name(node),
            transform: Mat4::from_cols_array_2d(&node.transform().matrix()),
            children: node.children().map(|c| Self::convert_node(&c)).collect(),
        }
    }

    // ========================================================================
    // Skins
    // ========================================================================

    fn load_skins(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        registry: &mut BoneRegistry,
    ) -> Result<Vec<Vec<BoneId>>> {
        let mut skins = Vec::new();

        for skin in document.skins() {
            let reader = skin.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
            let ibms: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
                Some(iter) => iter.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
                None => vec![Mat4::IDENTITY; skin.joints().count()],
            };

            let mut ids = Vec::with_capacity(ibms.len());
            for (joint, ibm) in skin.joints().zip(ibms) {
                let info = registry.get_or_register(&node_name(&joint), ibm)?;
                ids.push(info.id);
            }
            skins.push(ids);
        }

        Ok(skins)
    }

    // ========================================================================
    // Animations
    // ========================================================================

    fn load_animations(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
    ) -> Vec<ImportedAnimation> {
        let mut animations = Vec::new();

        for (anim_index, anim) in document.animations().enumerate() {
            let name = anim
                .name()
                .map_or_else(|| format!("Animation_{anim_index}"), str::to_string);

            // One channel per target node, in first-seen order
            let mut channels: Vec<ImportedChannel> = Vec::new();
            let mut slot_of_node: FxHashMap<usize, usize> = FxHashMap::default();
            let mut target_nodes: Vec<usize> = Vec::new();
            let mut max_time = 0.0_f32;

            for channel in anim.channels() {
                let reader =
                    channel.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
                let target = channel.target();
                let gltf_node = target.node();

                let Some(inputs) = reader.read_inputs() else {
                    log::warn!("Animation '{name}': channel without input accessor, skipped");
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                let Some(outputs) = reader.read_outputs() else {
                    log::warn!("Animation '{name}': channel without output accessor, skipped");
                    continue;
                };

                if matches!(outputs, ReadOutputs::MorphTargetWeights(_)) {
                    log::debug!("Animation '{name}': morph target weights ignored");
                    continue;
                }

                let interpolation = channel.sampler().interpolation();
                let cubic = interpolation == gltf::animation::Interpolation::CubicSpline;
                if cubic {
                    log::warn!(
                        "Animation '{name}': cubic-spline channel on '{}' sampled as linear",
                        node_name(&gltf_node)
                    );
                }

                let slot = *slot_of_node.entry(gltf_node.index()).or_insert_with(|| {
                    channels.push(ImportedChannel {
                        node_name: node_name(&gltf_node),
                        ..Default::default()
                    });
                    target_nodes.push(gltf_node.index());
                    channels.len() - 1
                });
                let out = &mut channels[slot];

                let kind = match outputs {
                    ReadOutputs::Translations(iter) => {
                        let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                        out.positions = zip_keys(&times, &spline_values(values, cubic));
                        ChannelKind::Translation
                    }
                    ReadOutputs::Rotations(iter) => {
                        let values: Vec<Quat> = iter.into_f32().map(Quat::from_array).collect();
                        out.rotations = zip_keys(&times, &spline_values(values, cubic));
                        ChannelKind::Rotation
                    }
                    ReadOutputs::Scales(iter) => {
                        let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                        out.scales = zip_keys(&times, &spline_values(values, cubic));
                        ChannelKind::Scale
                    }
                    ReadOutputs::MorphTargetWeights(_) => continue,
                };

                let mode = if interpolation == gltf::animation::Interpolation::Step {
                    InterpolationMode::Step
                } else {
                    InterpolationMode::Linear
                };
                out.interpolation.set(kind, mode);
                if let Some(&last) = times.last() {
                    max_time = max_time.max(last);
                }
            }

            // Every bone needs all three channels; hold the bind pose where absent
            for (slot, channel) in channels.iter_mut().enumerate() {
                let Some(node) = document.nodes().nth(target_nodes[slot]) else {
                    continue;
                };
                let (t, r, s) = node.transform().decomposed();
                if channel.positions.is_empty() {
                    channel.positions = vec![Keyframe::new(0.0, Vec3::from_array(t))];
                }
                if channel.rotations.is_empty() {
                    channel.rotations = vec![Keyframe::new(0.0, Quat::from_array(r))];
                }
                if channel.scales.is_empty() {
                    channel.scales = vec![Keyframe::new(0.0, Vec3::from_array(s))];
                }
            }

            let duration = if max_time > 0.0 {
                max_time
            } else {
                SINGLE_FRAME_DURATION
            };

            animations.push(ImportedAnimation {
                name,
                duration,
                ticks_per_second: GLTF_TICKS_PER_SECOND,
                channels,
            });
        }

        animations
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

/// Cubic-spline outputs are `[in_tangent, value, out_tangent]` per key; keep the values.
fn spline_values<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.chunks_exact(3).map(|c| c[1]).collect()
    } else {
        values
    }
}

fn zip_keys<T: Copy>(times: &[f32], values: &[T]) -> Vec<Keyframe<T>> {
    times
        .iter()
        .zip(values)
        .map(|(&t, &v)| Keyframe::new(t, v))
        .collect()
}
