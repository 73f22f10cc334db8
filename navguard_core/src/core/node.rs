use super::throttle::LogThrottle;
use crate::error::NavGuardResult;
use crate::params::RuntimeParams;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Trait for providing lightweight logging summaries of message types
///
/// Large messages (voxel clouds, marker arrays) should only summarise
/// metadata instead of dumping their contents.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Initializing,
    Running,
    Stopping,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Tick and logging counters for one node
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
}

/// Configuration parameters for node behavior
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub enable_logging: bool,
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            enable_logging: true,
            log_level: "INFO".to_string(),
        }
    }
}

const HISTORY_LIMIT: usize = 100;

/// Runtime context handed to a node on every lifecycle call
pub struct NodeInfo {
    name: String,
    instance_id: String,

    state: NodeState,

    config: NodeConfig,
    metrics: NodeMetrics,

    tick_start_time: Option<Instant>,

    error_history: Vec<(Instant, String)>,
    warning_history: Vec<(Instant, String)>,

    published_topics: HashMap<String, u64>,
    subscribed_topics: HashMap<String, u64>,

    throttle: LogThrottle,

    // Runtime parameters
    pub params: RuntimeParams,
}

impl NodeInfo {
    /// Create a context sharing an existing parameter store
    pub fn with_params(node_name: String, logging_enabled: bool, params: RuntimeParams) -> Self {
        Self {
            name: node_name,
            instance_id: uuid::Uuid::new_v4().to_string(),
            state: NodeState::Uninitialized,
            config: NodeConfig {
                enable_logging: logging_enabled,
                ..Default::default()
            },
            metrics: NodeMetrics::default(),
            tick_start_time: None,
            error_history: Vec::new(),
            warning_history: Vec::new(),
            published_topics: HashMap::new(),
            subscribed_topics: HashMap::new(),
            throttle: LogThrottle::new(),
            params,
        }
    }

    // State Management
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        self.state = new_state;
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.set_state(NodeState::Error(error_msg));
    }

    pub fn initialize(&mut self) {
        self.set_state(NodeState::Initializing);
        self.set_state(NodeState::Running);
    }

    pub fn shutdown(&mut self) {
        self.set_state(NodeState::Stopping);
        self.set_state(NodeState::Stopped);
    }

    // Tick Management
    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    pub fn record_tick(&mut self) {
        if let Some(start) = self.tick_start_time.take() {
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            let m = &mut self.metrics;
            m.total_ticks += 1;
            m.last_tick_duration_ms = duration_ms;
            m.max_tick_duration_ms = m.max_tick_duration_ms.max(duration_ms);
            m.avg_tick_duration_ms +=
                (duration_ms - m.avg_tick_duration_ms) / m.total_ticks as f64;
        }
    }

    // Communication tracking
    pub fn log_pub_summary(&mut self, topic: &str, summary: &str) {
        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_sent += 1;
        if self.config.enable_logging && self.config.log_level == "DEBUG" {
            tracing::trace!(node = %self.name, topic, "pub {}", summary);
        }
    }

    pub fn log_sub_summary(&mut self, topic: &str, summary: &str) {
        *self.subscribed_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_received += 1;
        if self.config.enable_logging && self.config.log_level == "DEBUG" {
            tracing::trace!(node = %self.name, topic, "sub {}", summary);
        }
    }

    // Logging
    pub fn log_info(&self, message: &str) {
        if self.config.enable_logging
            && (self.config.log_level == "INFO" || self.config.log_level == "DEBUG")
        {
            tracing::info!(node = %self.name, "{}", message);
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.config.enable_logging {
            tracing::warn!(node = %self.name, "{}", message);
        }
        push_bounded(&mut self.warning_history, message);
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        if self.config.enable_logging {
            tracing::error!(node = %self.name, "{}", message);
        }
        push_bounded(&mut self.error_history, message);
        self.metrics.errors_count += 1;
    }

    pub fn log_debug(&mut self, message: &str) {
        if self.config.enable_logging && self.config.log_level == "DEBUG" {
            tracing::debug!(node = %self.name, "{}", message);
        }
    }

    /// Warning limited to one emission per `period` for the given key.
    /// Returns true when the message was emitted.
    pub fn log_warning_throttled(&mut self, key: &str, period: Duration, message: &str) -> bool {
        match self.throttle.check(key, period) {
            Some(0) => {
                self.log_warning(message);
                true
            }
            Some(suppressed) => {
                self.log_warning(&format!("{} ({} similar suppressed)", message, suppressed));
                true
            }
            None => false,
        }
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }
    pub fn warning_history(&self) -> &[(Instant, String)] {
        &self.warning_history
    }
    pub fn error_history(&self) -> &[(Instant, String)] {
        &self.error_history
    }
    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }
    pub fn subscribed_topics(&self) -> &HashMap<String, u64> {
        &self.subscribed_topics
    }
    pub fn set_config(&mut self, config: NodeConfig) {
        self.config = config;
    }
}

fn push_bounded(history: &mut Vec<(Instant, String)>, message: &str) {
    history.push((Instant::now(), message.to_string()));
    if history.len() > HISTORY_LIMIT {
        history.remove(0);
    }
}

/// Topic metadata for monitoring and introspection
#[derive(Debug, Clone)]
pub struct TopicMetadata {
    pub topic_name: String,
    pub type_name: String,
}

/// Trait for NavGuard nodes with lifecycle support
pub trait Node: Send {
    /// Get the node's name (must be unique)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once at startup)
    fn init(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    /// Main execution step (called repeatedly by the scheduler)
    fn tick(&mut self, ctx: Option<&mut NodeInfo>);

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }
}

impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}
