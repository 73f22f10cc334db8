//! # NavGuard
//!
//! Predictive velocity-safety filter for mobile robots. Each incoming
//! velocity command is rolled out over a short horizon and checked against
//! the occupancy map; commands that would collide are replaced by a stop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use navguard::prelude::*;
//!
//! let config = NavGuardConfig::find_and_load().unwrap();
//! let mut app = App::build(&config).unwrap();
//! app.run(None).unwrap();
//! ```

pub mod app;
pub mod config;

pub use navguard_core::{self, *};
pub use navguard_library as library;

pub use app::App;
pub use config::NavGuardConfig;

/// Everything needed to embed the filter
pub mod prelude {
    pub use crate::app::App;
    pub use crate::config::NavGuardConfig;

    pub use navguard_core::core::{Node, NodeInfo, NodeState};
    pub use navguard_core::error::{NavGuardError, NavGuardResult};
    pub use navguard_core::{Hub, RuntimeParams, Scheduler};

    pub use navguard_library::algorithms::collision_world::{
        shared, CollisionWorld, RobotModel, VoxelCollisionWorld,
    };
    pub use navguard_library::algorithms::rollout_filter::{FilterConfig, RolloutFilter};
    pub use navguard_library::messages::*;
    pub use navguard_library::{NavCollisionCheckerNode, NodeTopics};

    pub use std::time::Duration;

    pub use anyhow::{anyhow, bail, Context, Result as AnyResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
