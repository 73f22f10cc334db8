//! Rollout Safety Filter
//!
//! Forward-simulates a velocity command for a fixed number of steps and
//! checks every predicted pose against the environment. The command is
//! forwarded unchanged when the whole rollout is clear and replaced by a
//! stop at the first colliding step.
//!
//! # Features
//!
//! - Pass-through override
//! - Fail-open (default) or fail-closed handling of a missing pose
//! - Fail-closed handling of collision query failures
//! - Early exit at the first colliding step
//! - Atomic runtime reconfiguration, applied between rollouts only
//!
//! # Example
//!
//! ```rust
//! use navguard_library::algorithms::collision_world::{shared, RobotModel, VoxelCollisionWorld};
//! use navguard_library::algorithms::rollout_filter::{FilterConfig, RolloutFilter, RolloutVerdict};
//! use navguard_library::messages::{PoseStamped, Twist};
//!
//! let world = shared(VoxelCollisionWorld::new(RobotModel::single_box("base_link", [0.6, 0.4, 0.3])));
//! let mut filter = RolloutFilter::new(world, FilterConfig::default()).unwrap();
//! filter.set_pose(PoseStamped::planar(0.0, 0.0, 0.0));
//!
//! let outcome = filter.filter(&Twist::from_unicycle(0.5, 0.0));
//! assert_eq!(outcome.verdict, RolloutVerdict::Clear);
//! ```

mod config;

pub use config::{
    ConfigHandle, FilterConfig, MissingPosePolicy, DEFAULT_HORIZON_STEPS, DEFAULT_STEP_TIME,
    PARAM_FAIL_OPEN, PARAM_PASS_THROUGH, PARAM_STEPS, PARAM_STEP_TIME,
};

use crate::algorithms::collision_oracle::CollisionOracle;
use crate::algorithms::collision_world::{CollisionWorld, SharedWorld};
use crate::algorithms::twist_integration::TwistIntegrator;
use crate::messages::{
    FilterConfigUpdate, JointState, Marker, MarkerArray, PoseStamped, RobotState, Twist,
};
use crate::tf::Transform;
use navguard_core::core::LogThrottle;
use navguard_core::error::NavGuardResult;
use std::time::Duration;

/// Minimum interval between "no pose" warnings
pub const MISSING_POSE_WARN_PERIOD: Duration = Duration::from_secs(3);
/// Minimum interval between query failure errors
pub const QUERY_FAILURE_LOG_PERIOD: Duration = Duration::from_secs(1);

pub const MARKER_NAMESPACE: &str = "nav_coll_check";
pub const MARKER_FRAME: &str = "world";

/// Why the filter emitted what it emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutVerdict {
    /// Pass-through enabled, nothing checked
    PassThrough,
    /// No pose available, handled by the missing-pose policy
    Unverified,
    /// Every predicted pose is collision free
    Clear,
    /// First colliding step (1-based)
    Blocked { step: usize },
    /// The collision query failed at this step (1-based)
    QueryFailed { step: usize },
}

/// Result of filtering one command
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Command to forward to the actuation layer
    pub command: Twist,
    pub verdict: RolloutVerdict,
    /// Predicted poses that were evaluated, in order
    pub trajectory: Vec<Transform>,
}

impl FilterOutcome {
    /// Whether the forwarded command differs from the requested one
    pub fn is_stopped(&self) -> bool {
        matches!(
            self.verdict,
            RolloutVerdict::Blocked { .. } | RolloutVerdict::QueryFailed { .. }
        ) || (self.verdict == RolloutVerdict::Unverified && self.command.is_zero())
    }

    /// True when a rollout was evaluated and diagnostics should be published
    pub fn has_rollout(&self) -> bool {
        matches!(
            self.verdict,
            RolloutVerdict::Clear
                | RolloutVerdict::Blocked { .. }
                | RolloutVerdict::QueryFailed { .. }
        )
    }
}

/// Counters over all filtered commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloutStats {
    pub commands: u64,
    pub passed_through: u64,
    pub unverified: u64,
    pub clear: u64,
    pub blocked: u64,
    pub query_failures: u64,
}

/// Arrow markers for a rollout, one per predicted pose
pub fn trajectory_markers(trajectory: &[Transform]) -> MarkerArray {
    MarkerArray::new(
        trajectory
            .iter()
            .enumerate()
            .map(|(i, pose)| Marker::arrow(MARKER_NAMESPACE, i as i32, MARKER_FRAME, *pose))
            .collect(),
    )
}

/// Predictive velocity filter over a shared collision world
///
/// Owns the last known pose and the master joint configuration. Each call
/// to [`RolloutFilter::filter`] snapshots the configuration, copies the
/// joint configuration once, and holds one world read guard for the whole
/// rollout.
pub struct RolloutFilter<W: CollisionWorld> {
    world: SharedWorld<W>,
    config: ConfigHandle,
    predictor: TwistIntegrator,
    oracle: CollisionOracle,
    last_pose: Option<PoseStamped>,
    joint_state: RobotState,
    virtual_joint: String,
    throttle: LogThrottle,
    stats: RolloutStats,
}

impl<W: CollisionWorld> RolloutFilter<W> {
    /// Filter checking only robot-versus-environment contacts
    pub fn new(world: SharedWorld<W>, config: FilterConfig) -> NavGuardResult<Self> {
        let (oracle, virtual_joint) = {
            let guard = world.read();
            (
                CollisionOracle::for_world(&*guard),
                guard.virtual_joint_name().to_string(),
            )
        };
        Self::with_oracle(world, config, oracle, virtual_joint)
    }

    pub fn with_oracle(
        world: SharedWorld<W>,
        config: FilterConfig,
        oracle: CollisionOracle,
        virtual_joint: String,
    ) -> NavGuardResult<Self> {
        Ok(Self {
            world,
            config: ConfigHandle::new(config)?,
            predictor: TwistIntegrator::new(),
            oracle,
            last_pose: None,
            joint_state: RobotState::new(),
            virtual_joint,
            throttle: LogThrottle::new(),
            stats: RolloutStats::default(),
        })
    }

    pub fn world(&self) -> &SharedWorld<W> {
        &self.world
    }

    /// Handle for reconfiguring from elsewhere
    pub fn config_handle(&self) -> ConfigHandle {
        self.config.clone()
    }

    pub fn config(&self) -> FilterConfig {
        self.config.snapshot()
    }

    /// Validate and apply a reconfiguration request. Takes effect on the
    /// next command; a rejected request leaves the configuration unchanged.
    pub fn apply_config(&self, update: &FilterConfigUpdate) -> NavGuardResult<FilterConfig> {
        self.config.apply(update)
    }

    pub fn set_config(&self, config: FilterConfig) -> NavGuardResult<()> {
        self.config.set(config)
    }

    /// Replace the last known pose
    pub fn set_pose(&mut self, pose: PoseStamped) {
        self.last_pose = Some(pose);
    }

    pub fn clear_pose(&mut self) {
        self.last_pose = None;
    }

    pub fn last_pose(&self) -> Option<&PoseStamped> {
        self.last_pose.as_ref()
    }

    /// Merge reported joint positions into the master configuration.
    /// Virtual joint variables are skipped. Returns the number merged.
    pub fn merge_joint_state(&mut self, joints: &JointState) -> usize {
        let mut merged = 0;
        for (name, position) in joints.iter() {
            if self.is_virtual_joint_variable(name) {
                continue;
            }
            self.joint_state.set_joint_position(name, position);
            merged += 1;
        }
        merged
    }

    fn is_virtual_joint_variable(&self, name: &str) -> bool {
        name == self.virtual_joint
            || name
                .strip_prefix(self.virtual_joint.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn joint_state(&self) -> &RobotState {
        &self.joint_state
    }

    pub fn oracle(&self) -> &CollisionOracle {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut CollisionOracle {
        &mut self.oracle
    }

    pub fn stats(&self) -> &RolloutStats {
        &self.stats
    }

    /// Filter one command
    pub fn filter(&mut self, command: &Twist) -> FilterOutcome {
        let config = self.config.snapshot();
        self.stats.commands += 1;

        if config.pass_through {
            self.stats.passed_through += 1;
            return FilterOutcome {
                command: *command,
                verdict: RolloutVerdict::PassThrough,
                trajectory: Vec::new(),
            };
        }

        let Some(start) = self.last_pose.as_ref().map(|pose| pose.pose) else {
            return self.handle_missing_pose(command, config.missing_pose_policy);
        };

        let mut state = self.joint_state.clone();
        let mut trajectory = Vec::new();

        let world = self.world.read();
        let poses = self
            .predictor
            .rollout(&start, command, config.step_time, config.horizon_steps);
        for (step, test_pose) in (1..).zip(poses) {
            trajectory.push(test_pose);

            match self.oracle.check(&*world, &test_pose, &mut state) {
                Ok(verdict) if verdict.in_collision => {
                    self.stats.blocked += 1;
                    tracing::debug!(
                        step,
                        contacts = verdict.contact_count,
                        "Predicted collision, stopping robot"
                    );
                    return FilterOutcome {
                        command: command.stopped(),
                        verdict: RolloutVerdict::Blocked { step },
                        trajectory,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    self.stats.query_failures += 1;
                    if let Some(suppressed) =
                        self.throttle.check("query_failure", QUERY_FAILURE_LOG_PERIOD)
                    {
                        tracing::error!(
                            step,
                            suppressed,
                            "Cannot verify rollout, stopping robot: {}",
                            e
                        );
                    }
                    return FilterOutcome {
                        command: command.stopped(),
                        verdict: RolloutVerdict::QueryFailed { step },
                        trajectory,
                    };
                }
            }
        }

        self.stats.clear += 1;
        FilterOutcome {
            command: *command,
            verdict: RolloutVerdict::Clear,
            trajectory,
        }
    }

    fn handle_missing_pose(&mut self, command: &Twist, policy: MissingPosePolicy) -> FilterOutcome {
        self.stats.unverified += 1;
        let warn = self.throttle.check("missing_pose", MISSING_POSE_WARN_PERIOD);

        let command = match policy {
            MissingPosePolicy::FailOpen => {
                if warn.is_some() {
                    tracing::warn!(
                        "Cannot get robot pose. Forwarding velocity command without safety check! This message is throttled."
                    );
                }
                *command
            }
            MissingPosePolicy::FailClosed => {
                if warn.is_some() {
                    tracing::warn!(
                        "Cannot get robot pose. Stopping robot until a pose is received. This message is throttled."
                    );
                }
                command.stopped()
            }
        };

        FilterOutcome {
            command,
            verdict: RolloutVerdict::Unverified,
            trajectory: Vec::new(),
        }
    }
}
