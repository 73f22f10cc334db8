//! Message types exchanged between NavGuard nodes
//!
//! # Message Organization
//!
//! - Geometry: velocity commands and stamped poses
//! - Sensor: joint states
//! - Perception: occupied voxels of the environment map
//! - Robot state: full configuration for collision queries
//! - Navigation: rollout filter reconfiguration
//! - Visualization: trajectory markers
//!
//! All message types are re-exported at the crate root for convenience.

pub mod geometry;
pub mod navigation;
pub mod perception;
pub mod robot_state;
pub mod sensor;
pub mod visualization;

pub use geometry::{PoseStamped, Twist};
pub use navigation::FilterConfigUpdate;
pub use perception::OccupancyVoxels;
pub use robot_state::{DisplayRobotState, RobotState};
pub use sensor::JointState;
pub use visualization::{ColorRGBA, Marker, MarkerAction, MarkerArray, MarkerType};
