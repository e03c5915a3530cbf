//! Animator Tests
//!
//! Tests for:
//! - Looping playhead arithmetic
//! - Play / stop state transitions
//! - Skinning palette contents (bind pose, animated hierarchy)
//! - Capacity checks
//! - AnimationSystem driving a SlotMap of animators

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use slotmap::SlotMap;

use armature::animation::system::AnimatorKey;
use armature::animation::tracks::{KeyPosition, KeyRotation, KeyScale};
use armature::animation::{AnimationClip, AnimationSystem, Animator, BoneRegistry, PlaybackState};
use armature::assets::{ImportedAnimation, ImportedChannel, ImportedModel, ImportedNode};
use armature::errors::ArmatureError;
use armature::settings::AnimationSettings;

const EPSILON: f32 = 1e-4;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn animation(duration: f32, tps: f32, channels: Vec<ImportedChannel>) -> ImportedAnimation {
    ImportedAnimation {
        name: "test".to_string(),
        duration,
        ticks_per_second: tps,
        channels,
    }
}

fn slide_channel(name: &str) -> ImportedChannel {
    ImportedChannel {
        node_name: name.to_string(),
        positions: vec![
            KeyPosition::new(0.0, Vec3::ZERO),
            KeyPosition::new(10.0, Vec3::new(10.0, 0.0, 0.0)),
        ],
        rotations: vec![KeyRotation::new(0.0, Quat::IDENTITY)],
        scales: vec![KeyScale::new(0.0, Vec3::ONE)],
        ..Default::default()
    }
}

/// root -> child, child sits one unit up the Y axis.
fn two_level() -> ImportedNode {
    ImportedNode::new("root", Mat4::IDENTITY).with_child(ImportedNode::new(
        "child",
        Mat4::from_translation(Vec3::Y),
    ))
}

fn playing(anim: &ImportedAnimation, root: &ImportedNode) -> (Animator, BoneRegistry) {
    let mut registry = BoneRegistry::default();
    let clip = Arc::new(AnimationClip::new(anim, root, &mut registry).unwrap());
    let mut animator =
        Animator::with_clip(clip, &registry, AnimationSettings::default()).unwrap();
    animator.play_animation();
    (animator, registry)
}

// ============================================================================
// Playhead
// ============================================================================

#[test]
fn looping_wraps_past_duration() {
    let (mut animator, _) = playing(&animation(10.0, 1.0, vec![slide_channel("root")]), &two_level());

    animator.update_animation(7.0);
    assert!(approx(animator.current_time(), 7.0));
    animator.update_animation(7.0);
    assert!(approx(animator.current_time(), 4.0));
}

#[test]
fn playhead_equals_scaled_sum_modulo_duration() {
    let (mut animator, _) = playing(&animation(3.0, 24.0, vec![slide_channel("root")]), &two_level());

    let deltas = [0.016, 0.033, 0.25, 0.1, 0.0, 0.5, 0.016, 0.2];
    let mut total = 0.0_f32;
    for dt in deltas {
        animator.update_animation(dt);
        total += dt;
        let expected = (total * 24.0).rem_euclid(3.0);
        let t = animator.current_time();
        assert!(t >= 0.0 && t < 3.0, "playhead out of range: {t}");
        assert!(
            approx(t, expected) || approx((t - expected).abs(), 3.0),
            "time {t} vs expected {expected}"
        );
    }
}

#[test]
fn negative_delta_wraps_backwards() {
    let (mut animator, _) = playing(&animation(10.0, 1.0, vec![slide_channel("root")]), &two_level());

    animator.update_animation(2.0);
    animator.update_animation(-5.0);
    assert!(approx(animator.current_time(), 7.0));
}

#[test]
fn non_finite_delta_keeps_playhead() {
    init_logger();
    let (mut animator, _) = playing(&animation(10.0, 1.0, vec![slide_channel("root")]), &two_level());

    animator.update_animation(3.0);
    animator.update_animation(f32::NAN);
    assert!(approx(animator.current_time(), 3.0));
    assert!(animator.final_bone_matrices().iter().all(Mat4::is_finite));
}

// ============================================================================
// State transitions
// ============================================================================

#[test]
fn stop_keeps_time_and_freezes_palette() {
    let (mut animator, _) = playing(&animation(10.0, 1.0, vec![slide_channel("root")]), &two_level());

    animator.update_animation(4.0);
    animator.stop();
    assert_eq!(animator.state(), PlaybackState::Stopped);

    let palette = animator.final_bone_matrices().to_vec();
    let version = animator.palette_version();
    animator.update_animation(3.0);

    assert!(approx(animator.current_time(), 4.0));
    assert_eq!(animator.final_bone_matrices(), palette.as_slice());
    assert_eq!(animator.palette_version(), version);
}

#[test]
fn play_restarts_from_zero() {
    let (mut animator, _) = playing(&animation(10.0, 1.0, vec![slide_channel("root")]), &two_level());

    animator.update_animation(6.0);
    animator.stop();
    animator.play_animation();

    assert!(animator.is_playing());
    assert_eq!(animator.current_time(), 0.0);
}

#[test]
fn play_without_clip_stays_stopped() {
    init_logger();
    let mut animator = Animator::new(4, AnimationSettings::default()).unwrap();
    animator.play_animation();

    assert!(!animator.is_playing());
    animator.update_animation(1.0);
    assert_eq!(animator.current_time(), 0.0);
    assert!(animator.final_bone_matrices().iter().all(|m| *m == Mat4::IDENTITY));
}

// ============================================================================
// Palette contents
// ============================================================================

#[test]
fn unanimated_hierarchy_outputs_bind_pose() {
    let offset_root = Mat4::from_scale(Vec3::splat(0.5));
    let offset_child = Mat4::from_translation(-Vec3::Y);

    let mut registry = BoneRegistry::default();
    let root_id = registry.get_or_register("root", offset_root).unwrap().id;
    let child_id = registry.get_or_register("child", offset_child).unwrap().id;

    let clip = Arc::new(
        AnimationClip::new(&animation(10.0, 1.0, vec![]), &two_level(), &mut registry).unwrap(),
    );
    let mut animator = Animator::with_clip(clip, &registry, AnimationSettings::default()).unwrap();
    animator.play_animation();
    animator.update_animation(1.5);

    let palette = animator.final_bone_matrices();
    let expected_root = Mat4::IDENTITY * Mat4::IDENTITY * offset_root;
    let expected_child = Mat4::IDENTITY * Mat4::from_translation(Vec3::Y) * offset_child;
    assert!(palette[root_id.index()].abs_diff_eq(expected_root, EPSILON));
    assert!(palette[child_id.index()].abs_diff_eq(expected_child, EPSILON));
    // offset undoes the bind translation
    assert!(palette[child_id.index()].abs_diff_eq(Mat4::IDENTITY, EPSILON));
}

#[test]
fn bind_pose_written_on_bind() {
    let mut registry = BoneRegistry::default();
    registry.get_or_register("child", Mat4::IDENTITY).unwrap();
    let clip = Arc::new(
        AnimationClip::new(&animation(10.0, 1.0, vec![]), &two_level(), &mut registry).unwrap(),
    );
    let animator = Animator::with_clip(clip, &registry, AnimationSettings::default()).unwrap();

    assert!(!animator.is_playing());
    assert!(
        animator.final_bone_matrices()[0].abs_diff_eq(Mat4::from_translation(Vec3::Y), EPSILON)
    );
}

#[test]
fn animated_parent_moves_child() {
    let (mut animator, registry) =
        playing(&animation(10.0, 1.0, vec![slide_channel("root")]), &two_level());
    let root_id = registry.get("root").unwrap().id;
    let child_id = registry.get("child").map(|i| i.id);
    // only the animated joint was registered
    assert!(child_id.is_none());

    animator.update_animation(5.0);
    let root = animator.final_bone_matrices()[root_id.index()];
    assert!(root.abs_diff_eq(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)), EPSILON));
}

#[test]
fn child_global_composes_parent() {
    let mut registry = BoneRegistry::default();
    let child_id = registry.get_or_register("child", Mat4::IDENTITY).unwrap().id;
    let clip = Arc::new(
        AnimationClip::new(
            &animation(10.0, 1.0, vec![slide_channel("root")]),
            &two_level(),
            &mut registry,
        )
        .unwrap(),
    );
    let mut animator = Animator::with_clip(clip, &registry, AnimationSettings::default()).unwrap();
    animator.play_animation();
    animator.update_animation(2.0);

    let child = animator.final_bone_matrices()[child_id.index()];
    let expected = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)) * Mat4::from_translation(Vec3::Y);
    assert!(child.abs_diff_eq(expected, EPSILON));
}

#[test]
fn cursor_and_scan_paths_agree() {
    let anim = animation(10.0, 30.0, vec![slide_channel("root")]);
    let mut registry = BoneRegistry::default();
    registry.get_or_register("child", Mat4::IDENTITY).unwrap();
    let clip = Arc::new(AnimationClip::new(&anim, &two_level(), &mut registry).unwrap());

    let mut with_cursors = Animator::with_clip(
        Arc::clone(&clip),
        &registry,
        AnimationSettings::default(),
    )
    .unwrap();
    let mut plain = Animator::with_clip(
        clip,
        &registry,
        AnimationSettings {
            use_keyframe_cursors: false,
            ..Default::default()
        },
    )
    .unwrap();
    with_cursors.play_animation();
    plain.play_animation();

    for _ in 0..50 {
        with_cursors.update_animation(0.037);
        plain.update_animation(0.037);
        for (a, b) in with_cursors
            .final_bone_matrices()
            .iter()
            .zip(plain.final_bone_matrices())
        {
            assert!(a.abs_diff_eq(*b, EPSILON));
        }
    }
}

#[test]
fn palette_bytes_cover_every_slot() {
    let (mut animator, registry) =
        playing(&animation(10.0, 1.0, vec![slide_channel("root")]), &two_level());
    let before = animator.palette_version();
    animator.update_animation(0.5);

    assert_eq!(animator.as_bytes().len(), registry.len() * 64);
    assert!(animator.palette_version() > before);
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn animator_rejects_joint_count_over_max() {
    let err = Animator::new(8, AnimationSettings::with_max_bones(4)).unwrap_err();
    assert!(matches!(
        err,
        ArmatureError::CapacityExceeded { required: 8, capacity: 4 }
    ));
}

#[test]
fn bind_rejects_clip_beyond_max_bones() {
    let mut registry = BoneRegistry::default();
    let clip = Arc::new(
        AnimationClip::new(
            &animation(10.0, 1.0, vec![slide_channel("root"), slide_channel("child")]),
            &two_level(),
            &mut registry,
        )
        .unwrap(),
    );
    let mut animator = Animator::new(1, AnimationSettings::with_max_bones(1)).unwrap();

    let err = animator.bind_clip(clip).unwrap_err();
    assert!(matches!(
        err,
        ArmatureError::CapacityExceeded { required: 2, capacity: 1 }
    ));
    assert!(animator.clip().is_none());
}

#[test]
fn bind_grows_palette_for_later_registrations() {
    let mut registry = BoneRegistry::default();
    let first = Arc::new(
        AnimationClip::new(
            &animation(10.0, 1.0, vec![slide_channel("root")]),
            &two_level(),
            &mut registry,
        )
        .unwrap(),
    );
    let mut animator =
        Animator::with_clip(first, &registry, AnimationSettings::default()).unwrap();
    assert_eq!(animator.capacity(), 1);

    // A newer clip registers "child" after the animator was sized
    let second = Arc::new(
        AnimationClip::new(
            &animation(10.0, 1.0, vec![slide_channel("child")]),
            &two_level(),
            &mut registry,
        )
        .unwrap(),
    );
    animator.play_clip(second).unwrap();

    assert_eq!(animator.capacity(), 2);
    assert_eq!(animator.as_bytes().len(), 2 * 64);
    animator.update_animation(3.0);
    let child = registry.get("child").unwrap().id;
    // the animated child replaces its bind transform with the sampled one
    assert!(animator.final_bone_matrices()[child.index()].abs_diff_eq(
        Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)),
        EPSILON
    ));
}

// ============================================================================
// Clips built together
// ============================================================================

/// root -> (a, b), b sits five units up.
fn forked() -> ImportedNode {
    ImportedNode::new("root", Mat4::IDENTITY)
        .with_child(ImportedNode::new("a", Mat4::IDENTITY))
        .with_child(ImportedNode::new("b", Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0))))
}

#[test]
fn load_all_clips_write_joints_registered_by_later_clips() {
    let model = ImportedModel {
        root: Some(forked()),
        animations: vec![
            animation(10.0, 1.0, vec![slide_channel("a")]),
            animation(10.0, 1.0, vec![slide_channel("b")]),
        ],
    };
    let mut registry = BoneRegistry::default();
    let mut clips = AnimationClip::load_all(&model, &mut registry).unwrap();
    let b = registry.get("b").unwrap().id;

    let first = Arc::new(clips.remove(0));
    let mut animator = Animator::with_clip(first, &registry, AnimationSettings::default()).unwrap();
    animator.play_animation();
    animator.update_animation(1.0);

    let slot = animator.final_bone_matrices()[b.index()];
    assert!(slot.abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)), EPSILON));
}

// ============================================================================
// AnimationSystem
// ============================================================================

#[test]
fn system_updates_only_playing_animators() {
    let anim = animation(10.0, 1.0, vec![slide_channel("root")]);
    let mut registry = BoneRegistry::default();
    let clip = Arc::new(AnimationClip::new(&anim, &two_level(), &mut registry).unwrap());

    let mut animators: SlotMap<AnimatorKey, Animator> = SlotMap::with_key();
    let make = || {
        Animator::with_clip(Arc::clone(&clip), &registry, AnimationSettings::default()).unwrap()
    };
    let running = animators.insert(make());
    let idle = animators.insert(make());
    animators[running].play_animation();

    let updated = AnimationSystem::update(&mut animators, 3.0);

    assert_eq!(updated, 1);
    assert!(approx(animators[running].current_time(), 3.0));
    assert_eq!(animators[idle].current_time(), 0.0);
}
