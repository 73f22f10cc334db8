//! NavGuard Library Nodes
//!
//! Pre-built nodes wiring the algorithms to topics.
//!
//! - `NavCollisionCheckerNode` - predictive velocity safety filter

pub mod nav_collision_checker_node;

pub use nav_collision_checker_node::{NavCollisionCheckerNode, NodeTopics};
