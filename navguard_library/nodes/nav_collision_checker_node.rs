use crate::algorithms::collision_world::{CollisionWorld, SharedWorld};
use crate::algorithms::rollout_filter::{
    trajectory_markers, FilterConfig, FilterOutcome, RolloutFilter,
};
use crate::messages::{
    DisplayRobotState, FilterConfigUpdate, JointState, MarkerArray, OccupancyVoxels, PoseStamped,
    Twist,
};
use navguard_core::core::TopicMetadata;
use navguard_core::error::NavGuardResult;
use navguard_core::{Hub, Node, NodeInfo};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum interval between rejected-map warnings through the node context
pub const MAP_REJECT_WARN_PERIOD: Duration = Duration::from_secs(1);

/// Topic names used by [`NavCollisionCheckerNode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTopics {
    pub octomap: String,
    pub robot_pose: String,
    pub joint_states: String,
    pub cmd_vel_raw: String,
    pub config: String,
    pub cmd_vel_safe: String,
    pub markers: String,
    pub in_collision_state: String,
}

impl Default for NodeTopics {
    fn default() -> Self {
        Self {
            octomap: "octomap".to_string(),
            robot_pose: "robot_pose".to_string(),
            joint_states: "joint_states".to_string(),
            cmd_vel_raw: "cmd_vel_raw".to_string(),
            config: "nav_collision_checker/config".to_string(),
            cmd_vel_safe: "cmd_vel_safe".to_string(),
            markers: "nav_collision_checker/markers".to_string(),
            in_collision_state: "nav_collision_checker/in_collision_state".to_string(),
        }
    }
}

/// Nav Collision Checker Node - predictive velocity safety filter
///
/// Subscribes to raw velocity commands, rolls each one out against the
/// latest pose, joint state and occupancy map, and publishes either the
/// command itself or a stop on `cmd_vel_safe`.
///
/// Inputs are drained at the start of every tick in a fixed order:
/// configuration, occupancy map, pose, joint states, then the newest raw
/// command. Older queued commands are discarded.
pub struct NavCollisionCheckerNode<W: CollisionWorld> {
    // Publishers
    safe_cmd_publisher: Hub<Twist>,
    marker_publisher: Hub<MarkerArray>,

    // Subscribers
    octomap_subscriber: Hub<OccupancyVoxels>,
    pose_subscriber: Hub<PoseStamped>,
    joint_state_subscriber: Hub<JointState>,
    cmd_subscriber: Hub<Twist>,
    config_subscriber: Hub<FilterConfigUpdate>,

    topics: NodeTopics,
    filter: RolloutFilter<W>,

    // State
    last_outcome: Option<FilterOutcome>,
    dropped_commands: u64,
    cmd_overwritten_seen: u64,
    rejected_map_updates: u64,
    rejected_config_updates: u64,
}

impl<W: CollisionWorld + 'static> NavCollisionCheckerNode<W> {
    /// Create a node with default topics and configuration
    pub fn new(world: SharedWorld<W>) -> NavGuardResult<Self> {
        Self::new_with_topics(world, NodeTopics::default(), FilterConfig::default())
    }

    /// Create a node with custom topics and initial configuration
    pub fn new_with_topics(
        world: SharedWorld<W>,
        topics: NodeTopics,
        config: FilterConfig,
    ) -> NavGuardResult<Self> {
        let filter = RolloutFilter::new(world, config)?;
        let cmd_subscriber: Hub<Twist> = Hub::new_with_capacity(&topics.cmd_vel_raw, 1)?;
        let cmd_overwritten_seen = cmd_subscriber.get_metrics().messages_dropped;
        Ok(Self {
            safe_cmd_publisher: Hub::new_with_capacity(&topics.cmd_vel_safe, 1)?,
            marker_publisher: Hub::new_with_capacity(&topics.markers, 1)?,
            octomap_subscriber: Hub::new_with_capacity(&topics.octomap, 2)?,
            pose_subscriber: Hub::new_with_capacity(&topics.robot_pose, 1)?,
            joint_state_subscriber: Hub::new_with_capacity(&topics.joint_states, 5)?,
            cmd_subscriber,
            config_subscriber: Hub::new(&topics.config)?,
            topics,
            filter,
            last_outcome: None,
            dropped_commands: 0,
            cmd_overwritten_seen,
            rejected_map_updates: 0,
            rejected_config_updates: 0,
        })
    }

    /// Publish the full robot configuration whenever a predicted pose collides
    pub fn enable_collision_state_output(&mut self) -> NavGuardResult<()> {
        let hub: Hub<DisplayRobotState> = Hub::new_with_capacity(&self.topics.in_collision_state, 1)?;
        self.filter.oracle_mut().attach_collision_state_publisher(hub);
        Ok(())
    }

    pub fn topics(&self) -> &NodeTopics {
        &self.topics
    }

    pub fn filter(&self) -> &RolloutFilter<W> {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut RolloutFilter<W> {
        &mut self.filter
    }

    /// Outcome of the most recently filtered command
    pub fn last_outcome(&self) -> Option<&FilterOutcome> {
        self.last_outcome.as_ref()
    }

    /// Raw commands discarded because a newer one was queued
    pub fn dropped_commands(&self) -> u64 {
        self.dropped_commands
    }

    pub fn rejected_map_updates(&self) -> u64 {
        self.rejected_map_updates
    }

    pub fn rejected_config_updates(&self) -> u64 {
        self.rejected_config_updates
    }

    fn process_config_updates(&mut self, mut ctx: Option<&mut NodeInfo>) {
        while let Some(update) = self.config_subscriber.recv(ctx.as_deref_mut()) {
            match self.filter.apply_config(&update) {
                Ok(config) => {
                    tracing::info!(
                        step_time = config.step_time,
                        steps = config.horizon_steps,
                        pass_through = config.pass_through,
                        "Applied rollout configuration"
                    );
                    if let Some(ctx) = ctx.as_deref_mut() {
                        if let Err(e) = config.write_to_params(&ctx.params) {
                            ctx.log_warning(&format!("Failed to store parameters: {}", e));
                        }
                    }
                }
                Err(e) => {
                    self.rejected_config_updates += 1;
                    tracing::warn!("Rejected configuration update, keeping previous: {}", e);
                }
            }
        }
    }

    fn process_octomap(&mut self, mut ctx: Option<&mut NodeInfo>) {
        let Some((update, skipped)) = self.octomap_subscriber.recv_latest(ctx.as_deref_mut()) else {
            return;
        };
        if skipped > 0 {
            tracing::debug!("Skipped {} superseded occupancy updates", skipped);
        }

        let start = std::time::Instant::now();
        let result = self.filter.world().write().apply_update(&update);
        match result {
            Ok(()) => tracing::debug!(
                "Occupancy update with {} voxels took {:?}",
                update.points.len(),
                start.elapsed()
            ),
            Err(e) => {
                self.rejected_map_updates += 1;
                let message = format!("Rejected occupancy update: {}", e);
                match ctx {
                    Some(ctx) => {
                        ctx.log_warning_throttled("rejected_map", MAP_REJECT_WARN_PERIOD, &message);
                    }
                    None => tracing::warn!("{}", message),
                }
            }
        }
    }

    fn process_pose(&mut self, ctx: Option<&mut NodeInfo>) {
        if let Some((pose, _)) = self.pose_subscriber.recv_latest(ctx) {
            self.filter.set_pose(pose);
        }
    }

    fn process_joint_states(&mut self, mut ctx: Option<&mut NodeInfo>) {
        while let Some(joints) = self.joint_state_subscriber.recv(ctx.as_deref_mut()) {
            self.filter.merge_joint_state(&joints);
        }
    }

    fn process_command(&mut self, mut ctx: Option<&mut NodeInfo>) {
        // commands overwritten in the queue before this tick drained it
        let overwritten = self.cmd_subscriber.get_metrics().messages_dropped;
        let mut stale = overwritten.saturating_sub(self.cmd_overwritten_seen);
        self.cmd_overwritten_seen = overwritten;

        let received = self.cmd_subscriber.recv_latest(ctx.as_deref_mut());
        if let Some((_, skipped)) = &received {
            stale += *skipped as u64;
        }
        if stale > 0 {
            self.dropped_commands += stale;
            tracing::debug!("Dropped {} stale velocity commands", stale);
        }
        let Some((command, _)) = received else {
            return;
        };

        let outcome = self.filter.filter(&command);
        self.safe_cmd_publisher
            .send(outcome.command, ctx.as_deref_mut());
        if outcome.has_rollout() {
            self.marker_publisher
                .send(trajectory_markers(&outcome.trajectory), ctx);
        }
        self.last_outcome = Some(outcome);
    }
}

impl<W: CollisionWorld + 'static> Node for NavCollisionCheckerNode<W> {
    fn name(&self) -> &'static str {
        "nav_collision_checker"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        let config = self.filter.config();
        config.write_to_params(&ctx.params)?;
        ctx.log_info(&format!(
            "Filtering '{}' -> '{}' (step_time {:.3}s, {} steps, pass_through {})",
            self.topics.cmd_vel_raw,
            self.topics.cmd_vel_safe,
            config.step_time,
            config.horizon_steps,
            config.pass_through
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        self.process_config_updates(ctx.as_deref_mut());
        self.process_octomap(ctx.as_deref_mut());
        self.process_pose(ctx.as_deref_mut());
        self.process_joint_states(ctx.as_deref_mut());
        self.process_command(ctx);
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        let stats = self.filter.stats();
        ctx.log_info(&format!(
            "Filtered {} commands: {} clear, {} blocked, {} query failures, {} unverified, {} passed through, {} dropped",
            stats.commands,
            stats.clear,
            stats.blocked,
            stats.query_failures,
            stats.unverified,
            stats.passed_through,
            self.dropped_commands
        ));
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        vec![
            TopicMetadata {
                topic_name: self.topics.cmd_vel_safe.clone(),
                type_name: "Twist".to_string(),
            },
            TopicMetadata {
                topic_name: self.topics.markers.clone(),
                type_name: "MarkerArray".to_string(),
            },
        ]
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        [
            (&self.topics.octomap, "OccupancyVoxels"),
            (&self.topics.robot_pose, "PoseStamped"),
            (&self.topics.joint_states, "JointState"),
            (&self.topics.cmd_vel_raw, "Twist"),
            (&self.topics.config, "FilterConfigUpdate"),
        ]
        .into_iter()
        .map(|(topic, type_name)| TopicMetadata {
            topic_name: topic.clone(),
            type_name: type_name.to_string(),
        })
        .collect()
    }
}
