//! Scheduling for NavGuard nodes
//!
//! A single-threaded, priority-ordered tick loop. Each node's `tick` runs to
//! completion before the next node is ticked, which is what gives the
//! rollout filter its one-command-at-a-time guarantee.

pub mod scheduler;

pub use scheduler::{Scheduler, DEFAULT_TICK_RATE_HZ};
