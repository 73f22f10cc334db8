use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Tolerance used when checking that a rotation quaternion has unit norm
pub const UNIT_NORM_TOLERANCE: f64 = 1e-6;

/// Rigid 3D transform: translation plus rotation quaternion `[x, y, z, w]`
///
/// Stored as plain arrays so it serializes compactly. All math goes through
/// `nalgebra::Isometry3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: [f64; 3],
    /// Quaternion in `[x, y, z, w]` order
    pub rotation: [f64; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn new(translation: [f64; 3], rotation: [f64; 4]) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: [f64; 3]) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Planar pose: position in the xy-plane and heading about +z
    pub fn from_planar(x: f64, y: f64, yaw: f64) -> Self {
        Self::from_isometry(&Isometry3::new(
            Vector3::new(x, y, 0.0),
            Vector3::new(0.0, 0.0, yaw),
        ))
    }

    /// Translation plus roll/pitch/yaw (applied in that order, extrinsic)
    pub fn from_xyz_rpy(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        let rotation = UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]);
        Self::from_isometry(&Isometry3::from_parts(
            Translation3::new(xyz[0], xyz[1], xyz[2]),
            rotation,
        ))
    }

    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let q = iso.rotation.quaternion();
        Self {
            translation: [iso.translation.x, iso.translation.y, iso.translation.z],
            rotation: [q.i, q.j, q.k, q.w],
        }
    }

    /// Convert to an isometry. The stored quaternion is normalized on the way.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z, w] = self.rotation;
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));
        Isometry3::from_parts(
            Translation3::new(self.translation[0], self.translation[1], self.translation[2]),
            rotation,
        )
    }

    /// `self * other`: `other` expressed in the frame of `self`
    pub fn compose(&self, other: &Transform) -> Transform {
        Self::from_isometry(&(self.to_isometry() * other.to_isometry()))
    }

    pub fn inverse(&self) -> Transform {
        Self::from_isometry(&self.to_isometry().inverse())
    }

    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let p = self.to_isometry() * Point3::new(point[0], point[1], point[2]);
        [p.x, p.y, p.z]
    }

    /// Heading about the world z axis
    pub fn yaw(&self) -> f64 {
        self.to_isometry().rotation.euler_angles().2
    }

    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|v| v.is_finite())
            && self.rotation.iter().all(|v| v.is_finite())
    }

    /// Whether the rotation quaternion has unit norm within tolerance
    pub fn is_normalized(&self) -> bool {
        let norm_sq: f64 = self.rotation.iter().map(|v| v * v).sum();
        (norm_sq.sqrt() - 1.0).abs() <= UNIT_NORM_TOLERANCE
    }

    /// Euclidean distance between the translations of two transforms
    pub fn distance_to(&self, other: &Transform) -> f64 {
        let d: f64 = self
            .translation
            .iter()
            .zip(other.translation.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        d.sqrt()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        self.compose(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity() {
        let tf = Transform::identity();
        assert_eq!(tf.transform_point([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
        assert!(tf.is_normalized());
    }

    #[test]
    fn test_planar_rotation_of_point() {
        let tf = Transform::from_planar(1.0, 0.0, FRAC_PI_2);
        let p = tf.transform_point([1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(tf.yaw(), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_is_right_multiplication() {
        let base = Transform::from_planar(0.0, 0.0, FRAC_PI_2);
        let step = Transform::from_translation([1.0, 0.0, 0.0]);
        let result = base * step;
        // one metre along the rotated body x axis
        assert_relative_eq!(result.translation[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.translation[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let tf = Transform::from_xyz_rpy([1.0, -2.0, 0.5], [0.1, 0.2, 0.3]);
        let id = tf * tf.inverse();
        assert_relative_eq!(id.translation[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id.translation[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id.translation[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id.rotation[3].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validity_checks() {
        let mut tf = Transform::identity();
        tf.rotation = [0.0, 0.0, 0.0, 2.0];
        assert!(tf.is_finite());
        assert!(!tf.is_normalized());

        tf.translation[0] = f64::NAN;
        assert!(!tf.is_finite());
    }

    #[test]
    fn test_serde_layout() {
        let tf = Transform::from_translation([1.0, 2.0, 3.0]);
        let json = serde_json::to_string(&tf).unwrap();
        assert_eq!(
            json,
            r#"{"translation":[1.0,2.0,3.0],"rotation":[0.0,0.0,0.0,1.0]}"#
        );
    }
}
