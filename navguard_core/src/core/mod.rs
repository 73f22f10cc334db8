//! # Core types and traits for NavGuard
//!
//! - **Node**: base trait for computational units driven by the scheduler
//! - **NodeInfo**: runtime context (state, metrics, logging, parameters)
//! - **LogThrottle**: rate limiting for repeated log messages
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - node is created with its topics and configuration
//! 2. **Initialization** - `init()` is called once
//! 3. **Execution** - `tick()` is called repeatedly by the scheduler
//! 4. **Shutdown** - `shutdown()` is called once on exit

pub mod node;
pub mod throttle;

pub use node::{
    LogSummary, Node, NodeConfig, NodeInfo, NodeMetrics, NodeState, TopicMetadata,
};
pub use throttle::LogThrottle;
