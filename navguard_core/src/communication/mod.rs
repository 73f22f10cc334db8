//! # Communication layer for NavGuard
//!
//! - **Hub**: named in-process publish/subscribe topics backed by bounded
//!   lock-free queues. Handles created with the same topic name share one
//!   queue, so producers and consumers only agree on a name.
//!
//! ```rust,no_run
//! use navguard_core::communication::Hub;
//! let hub: Hub<String> = Hub::new("topic_name").unwrap();
//! hub.send("hello".to_string(), None);
//! ```

pub mod hub;

pub use hub::{Hub, HubMetrics, DEFAULT_HUB_CAPACITY};
