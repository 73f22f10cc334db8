// NavCollisionCheckerNode driven through topics and the scheduler
use navguard_core::{Hub, Node, RuntimeParams, Scheduler};
use navguard_library::algorithms::collision_world::{shared, RobotModel, VoxelCollisionWorld};
use navguard_library::algorithms::rollout_filter::{FilterConfig, RolloutVerdict};
use navguard_library::messages::{
    DisplayRobotState, FilterConfigUpdate, JointState, MarkerArray, OccupancyVoxels, PoseStamped,
    Twist,
};
use navguard_library::{NavCollisionCheckerNode, NodeTopics};

/// Topic handles seen from outside the node
struct Harness {
    octomap: Hub<OccupancyVoxels>,
    pose: Hub<PoseStamped>,
    joints: Hub<JointState>,
    raw: Hub<Twist>,
    config: Hub<FilterConfigUpdate>,
    safe: Hub<Twist>,
    markers: Hub<MarkerArray>,
    in_collision: Hub<DisplayRobotState>,
}

fn prefixed_topics(prefix: &str) -> NodeTopics {
    NodeTopics {
        octomap: format!("{}/octomap", prefix),
        robot_pose: format!("{}/robot_pose", prefix),
        joint_states: format!("{}/joint_states", prefix),
        cmd_vel_raw: format!("{}/cmd_vel_raw", prefix),
        config: format!("{}/config", prefix),
        cmd_vel_safe: format!("{}/cmd_vel_safe", prefix),
        markers: format!("{}/markers", prefix),
        in_collision_state: format!("{}/in_collision_state", prefix),
    }
}

fn setup(prefix: &str, config: FilterConfig) -> (NavCollisionCheckerNode<VoxelCollisionWorld>, Harness) {
    let topics = prefixed_topics(prefix);
    let world = shared(VoxelCollisionWorld::new(RobotModel::single_box(
        "base_link",
        [0.4, 0.4, 0.3],
    )));
    let mut node = NavCollisionCheckerNode::new_with_topics(world, topics.clone(), config).unwrap();
    node.enable_collision_state_output().unwrap();

    let harness = Harness {
        octomap: Hub::new(&topics.octomap).unwrap(),
        pose: Hub::new(&topics.robot_pose).unwrap(),
        joints: Hub::new(&topics.joint_states).unwrap(),
        raw: Hub::new(&topics.cmd_vel_raw).unwrap(),
        config: Hub::new(&topics.config).unwrap(),
        safe: Hub::new(&topics.cmd_vel_safe).unwrap(),
        markers: Hub::new(&topics.markers).unwrap(),
        in_collision: Hub::new(&topics.in_collision_state).unwrap(),
    };
    (node, harness)
}

fn config(step_time: f64, steps: usize) -> FilterConfig {
    FilterConfig::new(step_time, steps, false).unwrap()
}

#[test]
fn test_command_without_pose_is_forwarded() {
    let (mut node, io) = setup("pipeline/no_pose", config(0.5, 4));
    let cmd = Twist::from_unicycle(0.8, 0.1);
    io.raw.send(cmd, None);
    node.tick(None);

    assert_eq!(io.safe.recv(None), Some(cmd));
    // no rollout, no markers
    assert!(io.markers.recv(None).is_none());
}

#[test]
fn test_clear_rollout_publishes_command_and_markers() {
    let (mut node, io) = setup("pipeline/clear", config(0.5, 4));
    io.octomap.send(OccupancyVoxels::empty(0.1), None);
    io.pose.send(PoseStamped::planar(0.0, 0.0, 0.0), None);
    let cmd = Twist::from_unicycle(1.0, 0.0);
    io.raw.send(cmd, None);
    node.tick(None);

    assert_eq!(io.safe.recv(None), Some(cmd));
    let markers = io.markers.recv(None).unwrap();
    assert_eq!(markers.len(), 4);
    assert!((markers.markers[3].pose.translation[0] - 2.0).abs() < 1e-12);
    assert!(io.in_collision.recv(None).is_none());
}

#[test]
fn test_collision_zeroes_command_and_reports_state() {
    let (mut node, io) = setup("pipeline/blocked", config(0.5, 4));
    io.octomap
        .send(OccupancyVoxels::new(0.1, vec![[1.45, 0.0, 0.15]]), None);
    io.pose.send(PoseStamped::planar(0.0, 0.0, 0.0), None);
    io.joints
        .send(JointState::from_pairs([("head_pan", 0.3)]), None);

    let mut cmd = Twist::from_unicycle(1.0, 0.0);
    cmd.timestamp = 1234;
    io.raw.send(cmd, None);
    node.tick(None);

    let out = io.safe.recv(None).unwrap();
    assert!(out.is_zero());
    assert_eq!(out.timestamp, 1234);

    assert_eq!(io.markers.recv(None).unwrap().len(), 3);

    let colliding = io.in_collision.recv(None).unwrap();
    assert!(colliding.in_collision);
    assert!((colliding.state.base_pose.translation[0] - 1.5).abs() < 1e-12);
    assert_eq!(colliding.state.joint_position("head_pan"), 0.3);

    assert_eq!(
        node.last_outcome().unwrap().verdict,
        RolloutVerdict::Blocked { step: 3 }
    );
}

#[test]
fn test_config_is_applied_before_command_in_same_tick() {
    let (mut node, io) = setup("pipeline/config_order", config(0.5, 4));
    io.pose.send(PoseStamped::planar(0.0, 0.0, 0.0), None);
    io.config.send(FilterConfigUpdate::new(0.25, 2, false), None);
    io.raw.send(Twist::from_unicycle(1.0, 0.0), None);
    node.tick(None);

    assert_eq!(io.markers.recv(None).unwrap().len(), 2);
    assert_eq!(node.filter().config().horizon_steps, 2);
}

#[test]
fn test_rejected_map_keeps_previous_obstacles() {
    let (mut node, io) = setup("pipeline/bad_map", config(0.5, 4));
    io.octomap
        .send(OccupancyVoxels::new(0.1, vec![[1.0, 0.0, 0.15]]), None);
    node.tick(None);

    io.octomap.send(OccupancyVoxels::new(-1.0, Vec::new()), None);
    io.pose.send(PoseStamped::planar(0.0, 0.0, 0.0), None);
    io.raw.send(Twist::from_unicycle(1.0, 0.0), None);
    node.tick(None);

    assert_eq!(node.rejected_map_updates(), 1);
    assert!(io.safe.recv(None).unwrap().is_zero());
}

#[test]
fn test_pass_through_via_scheduler_updates_params() {
    let (node, io) = setup("pipeline/scheduler", config(0.5, 4));
    let params = RuntimeParams::with_defaults();
    let mut scheduler = Scheduler::new().with_params(params.clone());
    scheduler.add(Box::new(node), 0, Some(false));

    // everything collides
    io.octomap.send(
        OccupancyVoxels::filled_box(0.1, [-3.0, -3.0, 0.05], [3.0, 3.0, 0.25]),
        None,
    );
    io.pose.send(PoseStamped::planar(0.0, 0.0, 0.0), None);
    io.raw.send(Twist::from_unicycle(0.3, 0.0), None);
    scheduler.tick_once();
    assert!(io.safe.recv(None).unwrap().is_zero());

    io.config.send(FilterConfigUpdate::new(0.5, 4, true), None);
    let cmd = Twist::from_unicycle(0.3, 0.0);
    io.raw.send(cmd, None);
    scheduler.tick_once();

    assert_eq!(io.safe.recv(None), Some(cmd));
    assert!(params.get_bool("pass_through", false));
    assert_eq!(params.get_f64("roll_out_step_time", 0.0), 0.5);
}
