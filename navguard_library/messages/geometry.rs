use crate::tf::{timestamp_now, Transform};
use navguard_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Velocity command in the robot body frame
///
/// Only `linear[0]` (forward speed) and `angular[2]` (yaw rate) drive the
/// unicycle motion model. The remaining components are carried through
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    /// Linear velocity `[x, y, z]` in m/s
    pub linear: [f64; 3],
    /// Angular velocity `[roll, pitch, yaw]` in rad/s
    pub angular: [f64; 3],
    /// Nanoseconds since epoch
    pub timestamp: u64,
}

impl Twist {
    pub fn new(linear: [f64; 3], angular: [f64; 3]) -> Self {
        Self {
            linear,
            angular,
            timestamp: timestamp_now(),
        }
    }

    /// Planar command: forward speed and yaw rate
    pub fn from_unicycle(forward: f64, yaw_rate: f64) -> Self {
        Self::new([forward, 0.0, 0.0], [0.0, 0.0, yaw_rate])
    }

    pub fn zero() -> Self {
        Self::new([0.0; 3], [0.0; 3])
    }

    /// Same message with every velocity component zeroed.
    /// The timestamp is kept.
    pub fn stopped(&self) -> Self {
        Self {
            linear: [0.0; 3],
            angular: [0.0; 3],
            timestamp: self.timestamp,
        }
    }

    pub fn forward_speed(&self) -> f64 {
        self.linear[0]
    }

    pub fn yaw_rate(&self) -> f64 {
        self.angular[2]
    }

    pub fn is_zero(&self) -> bool {
        self.linear.iter().chain(self.angular.iter()).all(|v| *v == 0.0)
    }
}

impl Default for Twist {
    fn default() -> Self {
        Self::zero()
    }
}

impl LogSummary for Twist {
    fn log_summary(&self) -> String {
        format!(
            "Twist(v={:.3}, w={:.3})",
            self.forward_speed(),
            self.yaw_rate()
        )
    }
}

/// Robot pose in a named frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub pose: Transform,
    pub frame_id: String,
    pub timestamp: u64,
}

impl PoseStamped {
    pub fn new(pose: Transform, frame_id: &str) -> Self {
        Self {
            pose,
            frame_id: frame_id.to_string(),
            timestamp: timestamp_now(),
        }
    }

    /// Planar pose in the `world` frame
    pub fn planar(x: f64, y: f64, yaw: f64) -> Self {
        Self::new(Transform::from_planar(x, y, yaw), "world")
    }
}

impl LogSummary for PoseStamped {
    fn log_summary(&self) -> String {
        let t = self.pose.translation;
        format!(
            "PoseStamped({}: x={:.3}, y={:.3}, yaw={:.3})",
            self.frame_id,
            t[0],
            t[1],
            self.pose.yaw()
        )
    }
}
