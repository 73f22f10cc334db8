//! NavGuard transform math
//!
//! Rigid transforms used for the robot's world pose, predicted rollout poses
//! and link placement inside the robot model.
//!
//! # Example
//!
//! ```rust
//! use navguard_library::tf::Transform;
//!
//! let base = Transform::from_planar(1.0, 0.0, 0.0);
//! let step = Transform::from_translation([0.5, 0.0, 0.0]);
//! let next = base * step;
//! assert!((next.translation[0] - 1.5).abs() < 1e-12);
//! ```

mod transform;

pub use transform::{Transform, UNIT_NORM_TOLERANCE};

/// Get current timestamp in nanoseconds
pub fn timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
