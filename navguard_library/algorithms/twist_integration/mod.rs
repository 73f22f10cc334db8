//! Twist Integration
//!
//! Unicycle motion model that turns a velocity command held for a fixed time
//! step into a relative pose change.
//!
//! # Example
//!
//! ```rust
//! use navguard_library::algorithms::twist_integration::TwistIntegrator;
//! use navguard_library::messages::Twist;
//! use navguard_library::tf::Transform;
//!
//! let predictor = TwistIntegrator::new();
//! let cmd = Twist::from_unicycle(1.0, 0.0);
//!
//! let mut pose = Transform::identity();
//! for _ in 0..4 {
//!     pose = pose * predictor.predict(&cmd, 0.5);
//! }
//! assert!((pose.translation[0] - 2.0).abs() < 1e-12);
//! ```

use crate::messages::Twist;
use crate::tf::Transform;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// Yaw rates below this magnitude are integrated as straight-line motion
pub const ANGULAR_EPSILON: f64 = 1e-4;

/// Planar displacement `(dx, dy, dyaw)` in the body frame at the start of the step
///
/// # Arguments
/// * `forward` - Forward speed (m/s)
/// * `yaw_rate` - Yaw rate (rad/s)
/// * `dt` - Time step (seconds)
pub fn planar_displacement(forward: f64, yaw_rate: f64, dt: f64) -> (f64, f64, f64) {
    let distance = forward * dt;
    if yaw_rate.abs() < ANGULAR_EPSILON {
        return (distance, 0.0, 0.0);
    }

    let angle = yaw_rate * dt;
    let radius = distance / angle;
    let dx = angle.sin() * radius;
    let dy = radius - angle.cos() * radius;
    (dx, dy, angle)
}

/// Constant-velocity unicycle predictor
#[derive(Debug, Clone, Copy, Default)]
pub struct TwistIntegrator;

impl TwistIntegrator {
    pub fn new() -> Self {
        Self
    }

    /// Relative pose change after holding `cmd` for `step_time` seconds
    ///
    /// Only the forward speed and yaw rate are used. The translation is
    /// applied before the heading change so the result composes as
    /// `pose * change` and traces an exact circular arc.
    pub fn predict(&self, cmd: &Twist, step_time: f64) -> Transform {
        let (dx, dy, dyaw) = planar_displacement(cmd.forward_speed(), cmd.yaw_rate(), step_time);
        let change: Isometry3<f64> = Translation3::new(dx, dy, 0.0)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), dyaw);
        Transform::from_isometry(&change)
    }

    /// Predicted absolute poses for steps `1..=steps`, starting at `start`
    ///
    /// Poses are produced lazily, so a consumer that stops early never pays
    /// for the rest of the horizon.
    pub fn rollout(
        &self,
        start: &Transform,
        cmd: &Twist,
        step_time: f64,
        steps: usize,
    ) -> impl Iterator<Item = Transform> {
        let change = self.predict(cmd, step_time);
        let mut pose = *start;
        (0..steps).map(move |_| {
            pose = pose * change;
            pose
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_straight_line() {
        let predictor = TwistIntegrator::new();
        let change = predictor.predict(&Twist::from_unicycle(2.0, 0.0), 0.5);
        assert_relative_eq!(change.translation[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(change.translation[1], 0.0);
        assert_relative_eq!(change.yaw(), 0.0);
    }

    #[test]
    fn test_tiny_yaw_rate_is_straight() {
        let (dx, dy, dyaw) = planar_displacement(1.0, 0.5e-4, 1.0);
        assert_relative_eq!(dx, 1.0);
        assert_eq!(dy, 0.0);
        assert_eq!(dyaw, 0.0);

        let (_, dy, dyaw) = planar_displacement(1.0, -0.9e-4, 1.0);
        assert_eq!(dy, 0.0);
        assert_eq!(dyaw, 0.0);
    }

    #[test]
    fn test_quarter_circle() {
        // v = pi/2, w = pi/2, dt = 1 -> radius 1, quarter turn to the left
        let (dx, dy, dyaw) = planar_displacement(FRAC_PI_2, FRAC_PI_2, 1.0);
        assert_relative_eq!(dx, 1.0, epsilon = 1e-12);
        assert_relative_eq!(dy, 1.0, epsilon = 1e-12);
        assert_relative_eq!(dyaw, FRAC_PI_2);
    }

    #[test]
    fn test_right_turn_mirrors_left_turn() {
        let (lx, ly, lyaw) = planar_displacement(1.0, 0.8, 0.25);
        let (rx, ry, ryaw) = planar_displacement(1.0, -0.8, 0.25);
        assert_relative_eq!(lx, rx, epsilon = 1e-12);
        assert_relative_eq!(ly, -ry, epsilon = 1e-12);
        assert_relative_eq!(lyaw, -ryaw, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_in_place() {
        let change = TwistIntegrator::new().predict(&Twist::from_unicycle(0.0, 1.0), 0.5);
        assert_relative_eq!(change.translation[0], 0.0);
        assert_relative_eq!(change.translation[1], 0.0);
        assert_relative_eq!(change.yaw(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rollout_stays_on_circle() {
        // radius = v / w = 2 m, centre at (0, 2)
        let predictor = TwistIntegrator::new();
        let cmd = Twist::from_unicycle(1.0, 0.5);
        let poses = predictor
            .rollout(&Transform::identity(), &cmd, 0.2, 10)
            .collect::<Vec<_>>();

        assert_eq!(poses.len(), 10);
        for pose in &poses {
            let x = pose.translation[0];
            let y = pose.translation[1];
            assert_relative_eq!((x * x + (y - 2.0) * (y - 2.0)).sqrt(), 2.0, epsilon = 1e-9);
        }
        // accumulated heading = w * dt * N
        assert_relative_eq!(poses[9].yaw(), 0.5 * 0.2 * 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_turn_returns_home() {
        let predictor = TwistIntegrator::new();
        let cmd = Twist::from_unicycle(1.0, PI / 2.0);
        let poses = predictor
            .rollout(&Transform::identity(), &cmd, 0.25, 16)
            .collect::<Vec<_>>();
        let last = poses[15];
        assert_relative_eq!(last.translation[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(last.translation[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_prediction_is_body_relative() {
        let predictor = TwistIntegrator::new();
        let start = Transform::from_planar(1.0, 1.0, FRAC_PI_2);
        let poses = predictor
            .rollout(&start, &Twist::from_unicycle(1.0, 0.0), 0.5, 2)
            .collect::<Vec<_>>();
        assert_relative_eq!(poses[1].translation[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(poses[1].translation[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let predictor = TwistIntegrator::new();
        let cmd = Twist::from_unicycle(0.7, -0.3);
        assert_eq!(predictor.predict(&cmd, 0.25), predictor.predict(&cmd, 0.25));
    }

    #[test]
    fn test_rollout_is_lazy_for_huge_horizons() {
        let predictor = TwistIntegrator::new();
        let cmd = Twist::from_unicycle(1.0, 0.0);
        let mut poses = predictor.rollout(&Transform::identity(), &cmd, 0.5, usize::MAX);
        assert_relative_eq!(poses.next().unwrap().translation[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(poses.next().unwrap().translation[0], 1.0, epsilon = 1e-12);
    }
}
