use slotmap::{SlotMap, new_key_type};

use crate::animation::animator::Animator;

new_key_type! {
    /// Handle of an [`Animator`] owned by the scene.
    pub struct AnimatorKey;
}

/// Animation system.
///
/// Drives every playing [`Animator`] once per frame. Stopped animators are
/// skipped and keep their last palette.
pub struct AnimationSystem;

impl AnimationSystem {
    /// Advances all playing animators.
    ///
    /// # Arguments
    /// * `animators` - Per-entity animators
    /// * `dt` - Delta time per frame (in seconds)
    ///
    /// Returns how many animators were advanced.
    #[inline]
    pub fn update(animators: &mut SlotMap<AnimatorKey, Animator>, dt: f32) -> usize {
        let mut updated = 0;
        for (_key, animator) in animators.iter_mut() {
            if animator.is_playing() {
                animator.update_animation(dt);
                updated += 1;
            }
        }
        updated
    }
}
