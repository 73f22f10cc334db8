//! # NavGuard Core
//!
//! Runtime building blocks for the NavGuard velocity-safety filter:
//!
//! - **Nodes**: independent computational units ticked by a scheduler
//! - **Communication**: named in-process publish/subscribe topics
//! - **Parameters**: runtime key/value tunables with YAML persistence
//! - **Scheduling**: priority-ordered tick loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use navguard_core::{Hub, Node, NodeInfo, Scheduler};
//!
//! struct ExampleNode {
//!     output: Hub<String>,
//! }
//!
//! impl Node for ExampleNode {
//!     fn name(&self) -> &'static str { "example" }
//!
//!     fn tick(&mut self, ctx: Option<&mut NodeInfo>) {
//!         self.output.send("Hello NavGuard!".into(), ctx);
//!     }
//! }
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(ExampleNode { output: Hub::new("greetings").unwrap() }), 0, None);
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod params;
pub mod scheduling;

pub use communication::Hub;
pub use core::{LogSummary, LogThrottle, Node, NodeConfig, NodeInfo, NodeState};
pub use error::{NavGuardError, NavGuardResult};
pub use params::RuntimeParams;
pub use scheduling::Scheduler;
