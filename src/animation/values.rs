use glam::{Quat, Vec3};

/// A keyframe value that can be blended between two bracketing keys.
pub trait Interpolatable: Copy + std::fmt::Debug {
    /// Blends `start` towards `end` by `t` in `[0, 1]`.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// Counteracts floating-point drift after interpolation.
    #[inline]
    #[must_use]
    fn renormalize(self) -> Self {
        self
    }

    fn is_finite(&self) -> bool;
}

impl Interpolatable for Vec3 {
    #[inline]
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        Vec3::is_finite(*self)
    }
}

impl Interpolatable for Quat {
    /// Spherical interpolation along the shortest arc.
    #[inline]
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }

    #[inline]
    fn renormalize(self) -> Self {
        self.normalize()
    }

    #[inline]
    fn is_finite(&self) -> bool {
        Quat::is_finite(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn quat_renormalize_restores_unit_length() {
        let drifted = Quat::from_xyzw(0.0, 0.0, 0.0, 1.01);
        let q = drifted.renormalize();
        assert!((q.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn quat_slerp_takes_shortest_arc() {
        let a = Quat::from_rotation_z(0.0);
        let b = -Quat::from_rotation_z(FRAC_PI_2);
        let mid = Quat::interpolate_linear(a, b, 0.5);
        let expected = Quat::from_rotation_z(FRAC_PI_2 * 0.5);
        assert!(mid.angle_between(expected) < 1e-4);
    }
}
