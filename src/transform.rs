use glam::{Mat4, Quat, Vec3};

/// Transform value
///
/// A decomposed local transform (TRS). Animated joints produce one of these per
/// sample; it is turned into a matrix with the fixed order
/// `Translate * Rotate * Scale`, rotating about the local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    #[must_use]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    // ========================================================================
    // Matrix conversions
    // ========================================================================

    /// Composes `T * R * S` into a column-major matrix.
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        compose_trs(self.translation, self.rotation, self.scale)
    }

    /// Decomposes an affine matrix back into TRS.
    ///
    /// Shear cannot be represented and is lost.
    #[must_use]
    pub fn from_matrix(mat: &Mat4) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}

/// `Translate(t) * Rotate(r) * Scale(s)`.
#[inline]
#[must_use]
pub fn compose_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Builds a matrix from row-major storage (`rows[r][c]`).
///
/// Importers that store matrices row by row (e.g. `aiMatrix4x4`) go through
/// here; glTF data is column-major and uses [`Mat4::from_cols_array_2d`].
#[inline]
#[must_use]
pub fn mat4_from_row_major(rows: &[[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(rows).transpose()
}

/// Returns `true` when `q` has unit length within `tolerance`.
#[inline]
#[must_use]
pub fn is_unit_quat(q: Quat, tolerance: f32) -> bool {
    (q.length() - 1.0).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_transposes() {
        let rows = [
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, 6.0],
            [0.0, 0.0, 1.0, 7.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = mat4_from_row_major(&rows);
        assert_eq!(m.w_axis.truncate(), Vec3::new(5.0, 6.0, 7.0));
    }
}
