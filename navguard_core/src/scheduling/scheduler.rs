use crate::core::{Node, NodeInfo, NodeState};
use crate::error::{NavGuardError, NavGuardResult};
use crate::params::RuntimeParams;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default global tick rate
pub const DEFAULT_TICK_RATE_HZ: f64 = 50.0;

struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    context: NodeInfo,
}

/// Central orchestrator: holds nodes, drives the tick loop.
///
/// Nodes tick sequentially in ascending priority order, so within one
/// iteration every node runs to completion before the next one starts.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    running: Arc<AtomicBool>,
    scheduler_name: String,
    tick_rate_hz: f64,
    params: RuntimeParams,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            scheduler_name: "DefaultScheduler".to_string(),
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            params: RuntimeParams::with_defaults(),
        }
    }

    /// Set the global tick rate (chainable)
    pub fn with_tick_rate(mut self, rate_hz: f64) -> Self {
        if rate_hz.is_finite() && rate_hz > 0.0 {
            self.tick_rate_hz = rate_hz;
        } else {
            tracing::warn!(
                "Ignoring invalid tick rate {} Hz, keeping {} Hz",
                rate_hz,
                self.tick_rate_hz
            );
        }
        self
    }

    /// Share a parameter store with every node added afterwards (chainable)
    pub fn with_params(mut self, params: RuntimeParams) -> Self {
        self.params = params;
        self
    }

    /// Set the scheduler name (chainable)
    pub fn name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Add a node; lower `priority` values tick first.
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name().to_string();
        let logging_enabled = logging_enabled.unwrap_or(false);
        let context = NodeInfo::with_params(node_name.clone(), logging_enabled, self.params.clone());

        self.nodes.push(RegisteredNode {
            node,
            priority,
            initialized: false,
            context,
        });
        // Stable sort keeps insertion order among equal priorities
        self.nodes.sort_by_key(|registered| registered.priority);

        tracing::info!(
            "Added node '{}' with priority {} (logging: {})",
            node_name,
            priority,
            logging_enabled
        );
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Handle that stops the loop from another thread
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn get_node_list(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|registered| registered.node.name().to_string())
            .collect()
    }

    /// State of a registered node
    pub fn node_state(&self, name: &str) -> Option<NodeState> {
        self.nodes
            .iter()
            .find(|registered| registered.node.name() == name)
            .map(|registered| registered.context.state().clone())
    }

    /// Main loop with signal handling and cleanup
    pub fn run(&mut self) -> NavGuardResult<()> {
        self.run_loop(None)
    }

    /// Run all nodes for a duration, then shut down gracefully
    pub fn run_for(&mut self, duration: Duration) -> NavGuardResult<()> {
        self.run_loop(Some(duration))
    }

    /// Initialize pending nodes and run exactly one iteration.
    pub fn tick_once(&mut self) {
        self.init_nodes();
        self.execute_iteration();
    }

    fn run_loop(&mut self, duration: Option<Duration>) -> NavGuardResult<()> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| NavGuardError::Internal(format!("Failed to create runtime: {}", e)))?;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            tracing::warn!("Ctrl+C received, shutting down scheduler");
            running.store(false, Ordering::SeqCst);
        }) {
            tracing::debug!("Signal handler not installed: {}", e);
        }

        rt.block_on(async {
            let start_time = Instant::now();
            let tick_period = Duration::from_secs_f64(1.0 / self.tick_rate_hz);

            self.init_nodes();
            tracing::info!(
                "Scheduler '{}' running {} node(s) at {:.1} Hz",
                self.scheduler_name,
                self.nodes.len(),
                self.tick_rate_hz
            );

            while self.is_running() {
                if let Some(max_duration) = duration {
                    if start_time.elapsed() >= max_duration {
                        tracing::info!("Scheduler reached time limit of {:?}", max_duration);
                        break;
                    }
                }

                let iteration_start = Instant::now();
                self.execute_iteration();

                let elapsed = iteration_start.elapsed();
                if elapsed < tick_period {
                    tokio::time::sleep(tick_period - elapsed).await;
                }
            }
        });

        self.shutdown_nodes();
        tracing::info!("Scheduler '{}' shutdown complete", self.scheduler_name);
        Ok(())
    }

    fn init_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| !r.initialized) {
            let node_name = registered.node.name();
            let ctx = &mut registered.context;
            match registered.node.init(ctx) {
                Ok(()) => {
                    ctx.initialize();
                    registered.initialized = true;
                    tracing::info!("Initialized node '{}'", node_name);
                }
                Err(e) => {
                    ctx.transition_to_error(format!("Initialization failed: {}", e));
                }
            }
        }
    }

    fn execute_iteration(&mut self) {
        for registered in self.nodes.iter_mut() {
            if !registered.initialized || *registered.context.state() != NodeState::Running {
                continue;
            }
            let ctx = &mut registered.context;
            ctx.start_tick();
            registered.node.tick(Some(&mut *ctx));
            ctx.record_tick();
        }
    }

    fn shutdown_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| r.initialized) {
            let node_name = registered.node.name();
            let ctx = &mut registered.context;
            match registered.node.shutdown(ctx) {
                Ok(()) => tracing::info!("Shutdown node '{}' successfully", node_name),
                Err(e) => tracing::error!("Error shutting down node '{}': {}", node_name, e),
            }
            ctx.shutdown();
            registered.initialized = false;
        }
    }
}
