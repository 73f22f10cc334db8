//! Wires the configured world, node and scheduler together

use crate::config::NavGuardConfig;
use navguard_core::error::NavGuardResult;
use navguard_core::{RuntimeParams, Scheduler};
use navguard_library::algorithms::collision_world::{shared, SharedWorld, VoxelCollisionWorld};
use navguard_library::algorithms::rollout_filter::FilterConfig;
use navguard_library::NavCollisionCheckerNode;
use std::time::Duration;

pub const SCHEDULER_NAME: &str = "navguard";

/// A ready-to-run filter process
pub struct App {
    pub scheduler: Scheduler,
    pub params: RuntimeParams,
    pub world: SharedWorld<VoxelCollisionWorld>,
}

impl App {
    /// Load the robot model and build the node graph. Model errors are fatal.
    pub fn build(config: &NavGuardConfig) -> NavGuardResult<Self> {
        Self::build_with_params(config, config.build_params()?)
    }

    /// As [`App::build`], with an already assembled parameter store
    pub fn build_with_params(config: &NavGuardConfig, params: RuntimeParams) -> NavGuardResult<Self> {
        let model = config.load_robot_model()?;
        tracing::info!(
            "Loaded robot model '{}' ({} links)",
            model.name,
            model.links.len()
        );

        let filter_config = FilterConfig::from_params(&params)?;
        let max_contacts = params.get_i64("max_contacts", 100).max(1) as usize;

        let world = shared(VoxelCollisionWorld::new(model).with_frame(&config.robot.frame_id));
        let mut node =
            NavCollisionCheckerNode::new_with_topics(world.clone(), config.topics.clone(), filter_config)?;
        node.filter_mut().oracle_mut().set_max_contacts(max_contacts);
        if config.diagnostics.collision_state {
            node.enable_collision_state_output()?;
        }

        let mut scheduler = Scheduler::new()
            .name(SCHEDULER_NAME)
            .with_tick_rate(config.scheduler.rate_hz)
            .with_params(params.clone());
        scheduler.add(Box::new(node), 0, Some(config.scheduler.node_logging));

        Ok(Self {
            scheduler,
            params,
            world,
        })
    }

    /// Run until interrupted, or for `duration` when given, then persist parameters
    pub fn run(&mut self, duration: Option<Duration>) -> NavGuardResult<()> {
        match duration {
            Some(duration) => self.scheduler.run_for(duration)?,
            None => self.scheduler.run()?,
        }
        if self.params.persist_path().is_some() {
            self.params.save_to_disk()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navguard_core::{Hub, NavGuardError};
    use navguard_library::algorithms::collision_world::RobotModel;
    use navguard_library::messages::{OccupancyVoxels, PoseStamped, Twist};
    use navguard_library::NodeTopics;

    fn app_config(prefix: &str) -> NavGuardConfig {
        let mut config = NavGuardConfig::default();
        config.robot.model = Some(RobotModel::single_box("base_link", [0.4, 0.4, 0.3]));
        config.topics = NodeTopics {
            octomap: format!("{}/octomap", prefix),
            robot_pose: format!("{}/robot_pose", prefix),
            joint_states: format!("{}/joint_states", prefix),
            cmd_vel_raw: format!("{}/cmd_vel_raw", prefix),
            config: format!("{}/config", prefix),
            cmd_vel_safe: format!("{}/cmd_vel_safe", prefix),
            markers: format!("{}/markers", prefix),
            in_collision_state: format!("{}/in_collision_state", prefix),
        };
        config
    }

    #[test]
    fn test_build_without_model_fails() {
        let result = App::build(&NavGuardConfig::default());
        assert!(matches!(result, Err(NavGuardError::ModelLoad(_))));
    }

    #[test]
    fn test_built_app_filters_commands() {
        let config = app_config("app/filters");
        let mut app = App::build(&config).unwrap();
        assert_eq!(
            app.scheduler.get_node_list(),
            vec!["nav_collision_checker".to_string()]
        );

        let octomap: Hub<OccupancyVoxels> = Hub::new(&config.topics.octomap).unwrap();
        let pose: Hub<PoseStamped> = Hub::new(&config.topics.robot_pose).unwrap();
        let raw: Hub<Twist> = Hub::new(&config.topics.cmd_vel_raw).unwrap();
        let safe: Hub<Twist> = Hub::new(&config.topics.cmd_vel_safe).unwrap();

        octomap.send(OccupancyVoxels::new(0.1, vec![[1.0, 0.0, 0.15]]), None);
        pose.send(PoseStamped::planar(0.0, 0.0, 0.0), None);
        raw.send(Twist::from_unicycle(1.0, 0.0), None);
        app.scheduler.tick_once();

        assert!(safe.recv(None).unwrap().is_zero());
        assert_eq!(app.world.read().voxel_count(), 1);
    }

    #[test]
    fn test_run_persists_params() {
        let dir = tempfile::tempdir().unwrap();
        let params_path = dir.path().join("params.yaml");
        let mut config = app_config("app/persist");
        config.filter.horizon_steps = 7;
        config.params_file = Some(params_path.clone());

        let mut app = App::build(&config).unwrap();
        app.run(Some(Duration::from_millis(50))).unwrap();

        let saved = std::fs::read_to_string(&params_path).unwrap();
        assert!(saved.contains("roll_out_steps: 7"));
    }
}
