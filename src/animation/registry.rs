use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::animation::bone::BoneId;
use crate::errors::{ArmatureError, Result};
use crate::settings::AnimationSettings;

/// Palette slot and inverse-bind matrix of a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfo {
    pub id: BoneId,
    /// Model space to joint local space.
    pub offset: Mat4,
}

/// Model-wide map from joint name to [`BoneInfo`].
///
/// Shared by every mesh and clip of one model. Mesh processing fills it while
/// assigning vertex influences; clip construction extends it with joints that
/// are animated but never skinned. Ids are handed out in insertion order and
/// never reassigned.
///
/// Registration takes `&mut self`, so concurrent imports into the same
/// registry must be serialised by the caller.
#[derive(Debug, Clone)]
pub struct BoneRegistry {
    entries: FxHashMap<String, BoneInfo>,
    // id -> name
    names: Vec<String>,
    capacity: usize,
}

impl Default for BoneRegistry {
    fn default() -> Self {
        Self::new(&AnimationSettings::default())
    }
}

impl BoneRegistry {
    #[must_use]
    pub fn new(settings: &AnimationSettings) -> Self {
        Self::with_capacity(settings.max_bones)
    }

    /// A registry that refuses to assign ids `>= capacity`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            names: Vec::new(),
            capacity,
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Returns the existing entry for `name`, or inserts one with the next id.
    ///
    /// `offset` is only used when the joint is new; an existing entry keeps its
    /// original matrix.
    pub fn get_or_register(&mut self, name: &str, offset: Mat4) -> Result<BoneInfo> {
        if let Some(info) = self.entries.get(name) {
            return Ok(*info);
        }

        let next = self.names.len();
        if next >= self.capacity {
            return Err(ArmatureError::BoneIdOverflow {
                name: name.to_string(),
                capacity: self.capacity,
            });
        }

        let info = BoneInfo {
            id: BoneId(next as u32),
            offset,
        };
        self.entries.insert(name.to_string(), info);
        self.names.push(name.to_string());
        log::debug!("Registered bone '{name}' as {}", info.id);

        Ok(info)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoneInfo> {
        self.entries.get(name)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn name_of(&self, id: BoneId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Number of registered joints; also the next id to be assigned.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneInfo)> {
        self.names
            .iter()
            .filter_map(|name| self.entries.get(name).map(|info| (name.as_str(), info)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn ids_are_stable_and_monotonic() {
        let mut registry = BoneRegistry::default();
        let hips = registry.get_or_register("hips", Mat4::IDENTITY).unwrap();
        let spine = registry.get_or_register("spine", Mat4::IDENTITY).unwrap();
        let again = registry
            .get_or_register("hips", Mat4::from_translation(Vec3::X))
            .unwrap();

        assert_eq!(hips.id, BoneId(0));
        assert_eq!(spine.id, BoneId(1));
        assert_eq!(again, hips);
        assert_eq!(registry.name_of(BoneId(1)), Some("spine"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn overflow_is_reported() {
        let mut registry = BoneRegistry::with_capacity(1);
        registry.get_or_register("a", Mat4::IDENTITY).unwrap();
        let err = registry.get_or_register("b", Mat4::IDENTITY).unwrap_err();
        assert!(matches!(err, ArmatureError::BoneIdOverflow { capacity: 1, .. }));
        // existing names still resolve at capacity
        assert!(registry.get_or_register("a", Mat4::IDENTITY).is_ok());
    }

    #[test]
    fn iter_follows_id_order() {
        let mut registry = BoneRegistry::default();
        for name in ["c", "a", "b"] {
            registry.get_or_register(name, Mat4::IDENTITY).unwrap();
        }
        let names: Vec<_> = registry.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
