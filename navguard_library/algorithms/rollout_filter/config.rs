use crate::messages::FilterConfigUpdate;
use navguard_core::error::{NavGuardError, NavGuardResult};
use navguard_core::RuntimeParams;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const PARAM_STEP_TIME: &str = "roll_out_step_time";
pub const PARAM_STEPS: &str = "roll_out_steps";
pub const PARAM_PASS_THROUGH: &str = "pass_through";
pub const PARAM_FAIL_OPEN: &str = "fail_open_without_pose";

pub const DEFAULT_STEP_TIME: f64 = 0.25;
pub const DEFAULT_HORIZON_STEPS: usize = 10;

/// What to do with a command when no robot pose has been received yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingPosePolicy {
    /// Forward the command unchecked
    #[default]
    FailOpen,
    /// Replace the command with a stop
    FailClosed,
}

impl MissingPosePolicy {
    pub fn from_fail_open(fail_open: bool) -> Self {
        if fail_open {
            MissingPosePolicy::FailOpen
        } else {
            MissingPosePolicy::FailClosed
        }
    }

    pub fn is_fail_open(&self) -> bool {
        matches!(self, MissingPosePolicy::FailOpen)
    }
}

/// Rollout filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Seconds simulated per rollout step, always positive
    pub step_time: f64,
    /// Number of predicted poses checked per command
    pub horizon_steps: usize,
    /// Forward every command without checking
    pub pass_through: bool,
    pub missing_pose_policy: MissingPosePolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            step_time: DEFAULT_STEP_TIME,
            horizon_steps: DEFAULT_HORIZON_STEPS,
            pass_through: false,
            missing_pose_policy: MissingPosePolicy::FailOpen,
        }
    }
}

impl FilterConfig {
    /// Validated configuration with the default missing-pose policy
    pub fn new(step_time: f64, horizon_steps: usize, pass_through: bool) -> NavGuardResult<Self> {
        let config = Self {
            step_time,
            horizon_steps,
            pass_through,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_missing_pose_policy(mut self, policy: MissingPosePolicy) -> Self {
        self.missing_pose_policy = policy;
        self
    }

    pub fn validate(&self) -> NavGuardResult<()> {
        if !self.step_time.is_finite() || self.step_time <= 0.0 {
            return Err(NavGuardError::config(format!(
                "{} must be a positive number of seconds, got {}",
                PARAM_STEP_TIME, self.step_time
            )));
        }
        Ok(())
    }

    /// Configuration resulting from applying `update` on top of `self`
    pub fn updated(&self, update: &FilterConfigUpdate) -> NavGuardResult<Self> {
        let horizon_steps = usize::try_from(update.horizon_steps).map_err(|_| {
            NavGuardError::config(format!(
                "{} must not be negative, got {}",
                PARAM_STEPS, update.horizon_steps
            ))
        })?;
        let config = Self {
            step_time: update.step_time,
            horizon_steps,
            pass_through: update.pass_through,
            missing_pose_policy: update
                .fail_open_without_pose
                .map(MissingPosePolicy::from_fail_open)
                .unwrap_or(self.missing_pose_policy),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and validate the configuration from runtime parameters.
    /// Missing keys fall back to defaults.
    pub fn from_params(params: &RuntimeParams) -> NavGuardResult<Self> {
        let defaults = Self::default();
        let update = FilterConfigUpdate {
            step_time: params.get_f64(PARAM_STEP_TIME, defaults.step_time),
            horizon_steps: params.get_i64(PARAM_STEPS, defaults.horizon_steps as i64),
            pass_through: params.get_bool(PARAM_PASS_THROUGH, defaults.pass_through),
            fail_open_without_pose: Some(params.get_bool(
                PARAM_FAIL_OPEN,
                defaults.missing_pose_policy.is_fail_open(),
            )),
        };
        defaults.updated(&update)
    }

    pub fn write_to_params(&self, params: &RuntimeParams) -> NavGuardResult<()> {
        params.set(PARAM_STEP_TIME, self.step_time)?;
        params.set(PARAM_STEPS, self.horizon_steps)?;
        params.set(PARAM_PASS_THROUGH, self.pass_through)?;
        params.set(PARAM_FAIL_OPEN, self.missing_pose_policy.is_fail_open())?;
        Ok(())
    }
}

/// Shared, atomically replaceable filter configuration
///
/// Writers validate before swapping, so readers only ever see a complete,
/// valid configuration. Readers take a copy.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<FilterConfig>>,
}

impl ConfigHandle {
    pub fn new(config: FilterConfig) -> NavGuardResult<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
        })
    }

    pub fn snapshot(&self) -> FilterConfig {
        *self.inner.read()
    }

    /// Replace the configuration. An invalid one is rejected and the
    /// previous configuration stays in effect.
    pub fn set(&self, config: FilterConfig) -> NavGuardResult<()> {
        config.validate()?;
        *self.inner.write() = config;
        Ok(())
    }

    /// Apply an update request, returning the new configuration
    pub fn apply(&self, update: &FilterConfigUpdate) -> NavGuardResult<FilterConfig> {
        let mut guard = self.inner.write();
        let next = guard.updated(update)?;
        *guard = next;
        Ok(next)
    }
}
