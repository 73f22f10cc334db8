//! Collision World
//!
//! Environment model boundary used by the collision oracle. A world ingests
//! occupancy updates and answers collision queries for a full robot
//! configuration.
//!
//! # Features
//!
//! - `CollisionWorld` trait: update + query
//! - Allowed collision matrix for ignoring entity pairs
//! - Box-link robot model loaded from TOML or YAML
//! - Reference voxel world (`VoxelCollisionWorld`)
//!
//! # Example
//!
//! ```rust
//! use navguard_library::algorithms::collision_world::{
//!     AllowedCollisionMatrix, CollisionRequest, CollisionWorld, RobotModel, VoxelCollisionWorld,
//! };
//! use navguard_library::messages::{OccupancyVoxels, RobotState};
//!
//! let model = RobotModel::single_box("base_link", [0.5, 0.4, 0.3]);
//! let acm = AllowedCollisionMatrix::environment_only(&model.link_names());
//! let mut world = VoxelCollisionWorld::new(model);
//! world.apply_update(&OccupancyVoxels::new(0.1, vec![[2.0, 0.0, 0.15]])).unwrap();
//!
//! let result = world
//!     .check_collision(&CollisionRequest::default(), &RobotState::new(), &acm)
//!     .unwrap();
//! assert!(!result.collision);
//! ```

mod acm;
mod robot_model;
mod voxel;

pub use acm::AllowedCollisionMatrix;
pub use robot_model::{JointModel, LinkModel, RobotModel, DEFAULT_VIRTUAL_JOINT};
pub use voxel::{VoxelCollisionWorld, OCTOMAP_BODY};

use crate::messages::{OccupancyVoxels, RobotState};
use navguard_core::error::NavGuardResult;
use parking_lot::RwLock;
use std::sync::Arc;

/// Contact enumeration cap used by the collision oracle
pub const DEFAULT_MAX_CONTACTS: usize = 100;

/// What a collision query should compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionRequest {
    /// Enumerate individual contacts
    pub contacts: bool,
    /// Upper bound on enumerated contacts
    pub max_contacts: usize,
    /// Compute the minimum clearance to the environment
    pub distance: bool,
}

impl Default for CollisionRequest {
    fn default() -> Self {
        Self {
            contacts: true,
            max_contacts: DEFAULT_MAX_CONTACTS,
            distance: true,
        }
    }
}

/// One detected contact between two bodies
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub body_a: String,
    pub body_b: String,
    /// Approximate contact location in the world frame
    pub position: [f64; 3],
    /// Penetration depth (m)
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionResult {
    pub collision: bool,
    /// Enumerated contacts, at most `max_contacts`
    pub contacts: Vec<Contact>,
    /// Minimum signed clearance to the environment, negative when penetrating.
    /// `None` when not requested or when the environment is empty.
    pub distance: Option<f64>,
}

impl CollisionResult {
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }
}

/// Environment model answering collision queries
///
/// Queries take `&self` and updates take `&mut self`, so a world shared
/// through [`SharedWorld`] never answers a query against a half-applied
/// update.
pub trait CollisionWorld: Send + Sync {
    /// Replace the environment with the given occupancy snapshot.
    /// A rejected update leaves the previous environment in place.
    fn apply_update(&mut self, update: &OccupancyVoxels) -> NavGuardResult<()>;

    /// Check a robot configuration against the environment.
    /// Returns `NavGuardError::QueryFailure` when the answer cannot be computed.
    fn check_collision(
        &self,
        request: &CollisionRequest,
        state: &RobotState,
        acm: &AllowedCollisionMatrix,
    ) -> NavGuardResult<CollisionResult>;

    /// Names of every robot link known to the world
    fn link_names(&self) -> Vec<String>;

    /// Name of the floating joint between the world and the robot root
    fn virtual_joint_name(&self) -> &str {
        DEFAULT_VIRTUAL_JOINT
    }
}

/// Collision world shared between the environment writer and the rollout
pub type SharedWorld<W> = Arc<RwLock<W>>;

pub fn shared<W: CollisionWorld>(world: W) -> SharedWorld<W> {
    Arc::new(RwLock::new(world))
}
