//! Pure computational algorithms for predictive velocity filtering
//!
//! No topic I/O here: nodes wire these into the runtime.
//!
//! # Available Algorithms
//!
//! ## Motion Prediction
//! - **twist_integration**: unicycle model, velocity command to pose change
//!
//! ## Collision Checking
//! - **collision_world**: environment model boundary, robot model, voxel world
//! - **collision_oracle**: single-pose collision query
//!
//! ## Safety
//! - **rollout_filter**: step-wise rollout gating of velocity commands

pub mod collision_oracle;
pub mod collision_world;
pub mod rollout_filter;
pub mod twist_integration;

pub use collision_oracle::{CollisionOracle, CollisionVerdict};
pub use collision_world::{
    AllowedCollisionMatrix, CollisionRequest, CollisionResult, CollisionWorld, RobotModel,
    SharedWorld, VoxelCollisionWorld,
};
pub use rollout_filter::{
    FilterConfig, FilterOutcome, MissingPosePolicy, RolloutFilter, RolloutVerdict,
};
pub use twist_integration::{TwistIntegrator, ANGULAR_EPSILON};
