//! # NavGuard Library
//!
//! Messages, transforms, collision checking and the rollout velocity filter.
//!
//! ## Structure
//!
//! ```text
//! navguard_library/
//! ── messages/       # Topic message types
//! ── tf/             # Rigid transform math
//! ── algorithms/     # Motion prediction, collision checking, rollout filter
//! ── nodes/          # Scheduler-ready nodes
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use navguard_library::algorithms::collision_world::{shared, RobotModel, VoxelCollisionWorld};
//! use navguard_library::NavCollisionCheckerNode;
//! use navguard_core::Scheduler;
//!
//! let model = RobotModel::from_file("robot.toml").unwrap();
//! let world = shared(VoxelCollisionWorld::new(model));
//! let node = NavCollisionCheckerNode::new(world).unwrap();
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(node), 0, Some(true));
//! scheduler.run().unwrap();
//! ```

pub mod algorithms;
pub mod messages;
pub mod nodes;
pub mod tf;

// Re-export core traits needed for message types
pub use navguard_core::core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use nodes::{NavCollisionCheckerNode, NodeTopics};
pub use tf::Transform;
