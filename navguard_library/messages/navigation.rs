use navguard_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Runtime reconfiguration request for the rollout filter
///
/// Carries the complete configuration. It is validated as a whole and either
/// applied atomically or rejected. `horizon_steps` is signed so a negative
/// request can be reported instead of silently wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfigUpdate {
    /// Seconds per rollout step
    pub step_time: f64,
    /// Number of rollout steps
    pub horizon_steps: i64,
    pub pass_through: bool,
    /// Keep the current policy when absent
    #[serde(default)]
    pub fail_open_without_pose: Option<bool>,
}

impl FilterConfigUpdate {
    pub fn new(step_time: f64, horizon_steps: i64, pass_through: bool) -> Self {
        Self {
            step_time,
            horizon_steps,
            pass_through,
            fail_open_without_pose: None,
        }
    }
}

impl LogSummary for FilterConfigUpdate {
    fn log_summary(&self) -> String {
        format!(
            "FilterConfigUpdate(dt={:.3}, steps={}, pass_through={})",
            self.step_time, self.horizon_steps, self.pass_through
        )
    }
}
