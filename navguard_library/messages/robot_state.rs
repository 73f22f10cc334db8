use crate::tf::Transform;
use navguard_core::core::LogSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full robot configuration used for collision queries
///
/// The floating base between the world and the robot root link is a typed
/// field instead of seven named joint variables. Every other joint is kept
/// by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotState {
    /// Pose of the robot root link in the world frame
    pub base_pose: Transform,
    pub joint_positions: BTreeMap<String, f64>,
}

impl RobotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_base_pose(&mut self, pose: Transform) {
        self.base_pose = pose;
    }

    pub fn set_joint_position(&mut self, name: &str, position: f64) {
        self.joint_positions.insert(name.to_string(), position);
    }

    /// Joint value, `0.0` for joints never reported
    pub fn joint_position(&self, name: &str) -> f64 {
        self.joint_positions.get(name).copied().unwrap_or(0.0)
    }
}

/// Robot configuration published for display, with the colliding flag set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRobotState {
    pub state: RobotState,
    pub in_collision: bool,
    pub contact_count: usize,
    pub timestamp: u64,
}

impl DisplayRobotState {
    pub fn colliding(state: RobotState, contact_count: usize) -> Self {
        Self {
            state,
            in_collision: true,
            contact_count,
            timestamp: crate::tf::timestamp_now(),
        }
    }
}

impl LogSummary for RobotState {
    fn log_summary(&self) -> String {
        let t = self.base_pose.translation;
        format!(
            "RobotState(base=({:.3}, {:.3}, {:.3}), {} joints)",
            t[0],
            t[1],
            t[2],
            self.joint_positions.len()
        )
    }
}

impl LogSummary for DisplayRobotState {
    fn log_summary(&self) -> String {
        format!(
            "DisplayRobotState(collision={}, contacts={}, {})",
            self.in_collision,
            self.contact_count,
            self.state.log_summary()
        )
    }
}
