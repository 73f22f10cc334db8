//! Collision Oracle
//!
//! Answers "is the robot in collision at this pose?" for a single candidate
//! pose. The pose is written into the floating-base field of the robot
//! configuration, the other joints stay as they are, and the environment
//! model is queried with robot-versus-environment checks only.
//!
//! # Example
//!
//! ```rust
//! use navguard_library::algorithms::collision_oracle::CollisionOracle;
//! use navguard_library::algorithms::collision_world::{CollisionWorld, RobotModel, VoxelCollisionWorld};
//! use navguard_library::messages::{OccupancyVoxels, RobotState};
//! use navguard_library::tf::Transform;
//!
//! let mut world = VoxelCollisionWorld::new(RobotModel::single_box("base_link", [0.6, 0.4, 0.3]));
//! world.apply_update(&OccupancyVoxels::new(0.1, vec![[1.0, 0.0, 0.15]])).unwrap();
//!
//! let mut oracle = CollisionOracle::for_world(&world);
//! let mut state = RobotState::new();
//!
//! let verdict = oracle.check(&world, &Transform::from_planar(1.0, 0.0, 0.0), &mut state).unwrap();
//! assert!(verdict.in_collision);
//! ```

use crate::algorithms::collision_world::{
    AllowedCollisionMatrix, CollisionRequest, CollisionWorld, DEFAULT_MAX_CONTACTS,
};
use crate::messages::{DisplayRobotState, RobotState};
use crate::tf::Transform;
use navguard_core::core::LogThrottle;
use navguard_core::error::NavGuardResult;
use navguard_core::Hub;
use std::time::Duration;

/// Minimum interval between contact-count log lines
pub const CONTACT_LOG_PERIOD: Duration = Duration::from_secs(1);

/// Outcome of a single pose check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionVerdict {
    pub in_collision: bool,
    pub contact_count: usize,
    /// Minimum clearance to the environment, when the world reports one
    pub distance: Option<f64>,
}

/// Per-pose collision query against a [`CollisionWorld`]
pub struct CollisionOracle {
    acm: AllowedCollisionMatrix,
    request: CollisionRequest,
    collision_state_pub: Option<Hub<DisplayRobotState>>,
    throttle: LogThrottle,
    queries: u64,
}

impl CollisionOracle {
    pub fn new(acm: AllowedCollisionMatrix) -> Self {
        Self {
            acm,
            request: CollisionRequest {
                contacts: true,
                max_contacts: DEFAULT_MAX_CONTACTS,
                distance: true,
            },
            collision_state_pub: None,
            throttle: LogThrottle::new(),
            queries: 0,
        }
    }

    /// Oracle ignoring every contact between the world's own robot links
    pub fn for_world<W: CollisionWorld + ?Sized>(world: &W) -> Self {
        Self::new(AllowedCollisionMatrix::environment_only(&world.link_names()))
    }

    /// Cap on enumerated contacts (chainable)
    pub fn with_max_contacts(mut self, max_contacts: usize) -> Self {
        self.request.max_contacts = max_contacts;
        self
    }

    /// Cap on enumerated contacts
    pub fn set_max_contacts(&mut self, max_contacts: usize) {
        self.request.max_contacts = max_contacts;
    }

    /// Publish every colliding configuration on `hub`
    pub fn attach_collision_state_publisher(&mut self, hub: Hub<DisplayRobotState>) {
        self.collision_state_pub = Some(hub);
    }

    pub fn detach_collision_state_publisher(&mut self) {
        self.collision_state_pub = None;
    }

    pub fn acm(&self) -> &AllowedCollisionMatrix {
        &self.acm
    }

    pub fn request(&self) -> &CollisionRequest {
        &self.request
    }

    /// Number of world queries issued so far
    pub fn queries(&self) -> u64 {
        self.queries
    }

    /// Check `pose` using `state` as the joint configuration
    ///
    /// Overwrites `state.base_pose`. A world query failure is returned as an
    /// error and must be treated as "cannot verify".
    pub fn check<W: CollisionWorld + ?Sized>(
        &mut self,
        world: &W,
        pose: &Transform,
        state: &mut RobotState,
    ) -> NavGuardResult<CollisionVerdict> {
        state.set_base_pose(*pose);
        self.queries += 1;

        let result = world.check_collision(&self.request, state, &self.acm)?;
        let verdict = CollisionVerdict {
            in_collision: result.collision,
            contact_count: result.contact_count(),
            distance: result.distance,
        };

        if verdict.in_collision {
            if let Some(hub) = &self.collision_state_pub {
                hub.send(
                    DisplayRobotState::colliding(state.clone(), verdict.contact_count),
                    None,
                );
            }
            if let Some(suppressed) = self.throttle.check("contacts", CONTACT_LOG_PERIOD) {
                tracing::info!(
                    contacts = verdict.contact_count,
                    suppressed,
                    "Detected {} collisions. This message is throttled.",
                    verdict.contact_count
                );
            }
        }

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::collision_world::{RobotModel, VoxelCollisionWorld};
    use crate::messages::OccupancyVoxels;
    use navguard_core::error::NavGuardError;

    fn world() -> VoxelCollisionWorld {
        let mut world = VoxelCollisionWorld::new(RobotModel::single_box("base_link", [0.6, 0.4, 0.3]));
        world
            .apply_update(&OccupancyVoxels::new(0.1, vec![[2.0, 0.0, 0.15]]))
            .unwrap();
        world
    }

    #[test]
    fn test_request_defaults() {
        let oracle = CollisionOracle::for_world(&world());
        assert!(oracle.request().contacts);
        assert!(oracle.request().distance);
        assert_eq!(oracle.request().max_contacts, 100);
        assert!(oracle.acm().is_allowed("base_link", "base_link"));
    }

    #[test]
    fn test_writes_pose_and_keeps_joints() {
        let world = world();
        let mut oracle = CollisionOracle::for_world(&world);
        let mut state = RobotState::new();
        state.set_joint_position("head_pan", 0.4);

        let pose = Transform::from_planar(0.5, 0.2, 0.1);
        let verdict = oracle.check(&world, &pose, &mut state).unwrap();

        assert!(!verdict.in_collision);
        assert!(verdict.distance.unwrap() > 0.0);
        assert_eq!(state.base_pose, pose);
        assert_eq!(state.joint_position("head_pan"), 0.4);
        assert_eq!(oracle.queries(), 1);
    }

    #[test]
    fn test_collision_publishes_state() {
        let world = world();
        let hub: Hub<DisplayRobotState> = Hub::new("oracle_test/in_collision_state").unwrap();
        let mut oracle = CollisionOracle::for_world(&world);
        oracle.attach_collision_state_publisher(hub.clone());

        let mut state = RobotState::new();
        let verdict = oracle
            .check(&world, &Transform::from_planar(2.0, 0.0, 0.0), &mut state)
            .unwrap();
        assert!(verdict.in_collision);
        assert_eq!(verdict.contact_count, 1);

        let published = hub.recv(None).unwrap();
        assert!(published.in_collision);
        assert_eq!(published.state.base_pose.translation[0], 2.0);

        // clear pose publishes nothing
        oracle
            .check(&world, &Transform::identity(), &mut state)
            .unwrap();
        assert!(hub.recv(None).is_none());
    }

    #[test]
    fn test_query_failure_propagates() {
        let world = world();
        let mut oracle = CollisionOracle::for_world(&world);
        let mut state = RobotState::new();
        let mut pose = Transform::identity();
        pose.translation[1] = f64::NAN;

        let err = oracle.check(&world, &pose, &mut state).unwrap_err();
        assert!(matches!(err, NavGuardError::QueryFailure(_)));
    }

    #[test]
    fn test_contact_cap_is_configurable() {
        let mut world = VoxelCollisionWorld::new(RobotModel::single_box("base_link", [1.0, 1.0, 0.4]));
        world
            .apply_update(&OccupancyVoxels::filled_box(0.1, [-0.3, -0.3, 0.1], [0.3, 0.3, 0.3]))
            .unwrap();
        let mut oracle = CollisionOracle::for_world(&world).with_max_contacts(5);
        let verdict = oracle
            .check(&world, &Transform::identity(), &mut RobotState::new())
            .unwrap();
        assert!(verdict.in_collision);
        assert_eq!(verdict.contact_count, 5);
    }
}
