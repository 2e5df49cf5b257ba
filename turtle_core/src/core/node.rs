use crate::error::TurtleResult;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Trait for providing lightweight logging summaries of message types
///
/// Messages implement this so that topic and service traffic can be traced
/// without requiring `Debug` output of the whole payload.
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

/// Performance metrics for node execution
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
    /// Emit a debug event for every published/received message
    pub trace_messages: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            enable_logging: true,
            trace_messages: false,
        }
    }
}

/// Context handed to nodes: identity, lifecycle state, metrics and logging.
///
/// Log calls are forwarded to `tracing` with the node name attached, so the
/// subscriber installed by the binary decides formatting and filtering.
pub struct NodeInfo {
    name: String,
    state: NodeState,
    config: NodeConfig,
    metrics: NodeMetrics,

    creation_time: Instant,
    tick_start_time: Option<Instant>,

    // topic -> message count
    published_topics: HashMap<String, u64>,
    subscribed_topics: HashMap<String, u64>,
}

impl NodeInfo {
    pub fn new(node_name: impl Into<String>, logging_enabled: bool) -> Self {
        let config = NodeConfig {
            enable_logging: logging_enabled,
            ..Default::default()
        };
        Self::new_with_config(node_name, config)
    }

    pub fn new_with_config(node_name: impl Into<String>, config: NodeConfig) -> Self {
        Self {
            name: node_name.into(),
            state: NodeState::Uninitialized,
            config,
            metrics: NodeMetrics::default(),
            creation_time: Instant::now(),
            tick_start_time: None,
            published_topics: HashMap::new(),
            subscribed_topics: HashMap::new(),
        }
    }

    // State Management Methods
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            tracing::trace!(node = %self.name, from = %self.state, to = %new_state, "state change");
            self.state = new_state;
        }
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.set_state(NodeState::Error(error_msg));
    }

    // Lifecycle Methods
    pub fn initialize(&mut self) -> TurtleResult<()> {
        self.set_state(NodeState::Initializing);
        self.set_state(NodeState::Running);
        Ok(())
    }

    pub fn shutdown(&mut self) -> TurtleResult<()> {
        self.set_state(NodeState::Stopping);
        self.set_state(NodeState::Stopped);
        Ok(())
    }

    // Tick Management
    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
        if self.state == NodeState::Uninitialized {
            let _ = self.initialize();
        }
    }

    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;
            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            let total_duration =
                self.metrics.avg_tick_duration_ms * (self.metrics.total_ticks - 1) as f64;
            self.metrics.avg_tick_duration_ms =
                (total_duration + duration_ms) / self.metrics.total_ticks as f64;
        }
    }

    pub fn log_pub<T: LogSummary>(&mut self, topic: &str, data: &T) {
        let summary = data.log_summary();
        self.log_pub_summary(topic, &summary);
    }

    pub fn log_sub<T: LogSummary>(&mut self, topic: &str, data: &T) {
        let summary = data.log_summary();
        self.log_sub_summary(topic, &summary);
    }

    /// Record an outgoing message on `topic`
    pub fn log_pub_summary(&mut self, topic: &str, summary: &str) {
        self.metrics.messages_sent += 1;
        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        if self.config.enable_logging && self.config.trace_messages {
            tracing::debug!(node = %self.name, topic, "pub {}", summary);
        }
    }

    /// Record an incoming message on `topic`
    pub fn log_sub_summary(&mut self, topic: &str, summary: &str) {
        self.metrics.messages_received += 1;
        *self.subscribed_topics.entry(topic.to_string()).or_insert(0) += 1;
        if self.config.enable_logging && self.config.trace_messages {
            tracing::debug!(node = %self.name, topic, "sub {}", summary);
        }
    }

    pub fn log_info(&self, message: &str) {
        if self.config.enable_logging {
            tracing::info!(node = %self.name, "{}", message);
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.config.enable_logging {
            tracing::warn!(node = %self.name, "{}", message);
        }
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        if self.config.enable_logging {
            tracing::error!(node = %self.name, "{}", message);
        }
        self.metrics.errors_count += 1;
    }

    pub fn log_debug(&self, message: &str) {
        if self.config.enable_logging {
            tracing::debug!(node = %self.name, "{}", message);
        }
    }

    /// Log a one-line summary of what the node did over its lifetime
    pub fn log_metrics_summary(&self) {
        if self.config.enable_logging {
            tracing::info!(
                node = %self.name,
                ticks = self.metrics.total_ticks,
                sent = self.metrics.messages_sent,
                received = self.metrics.messages_received,
                warnings = self.metrics.warnings_count,
                errors = self.metrics.errors_count,
                uptime_ms = self.uptime().as_millis() as u64,
                "metrics"
            );
        }
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }

    pub fn subscribed_topics(&self) -> &HashMap<String, u64> {
        &self.subscribed_topics
    }

    pub fn uptime(&self) -> Duration {
        self.creation_time.elapsed()
    }
}

/// A unit of work ticked by the [`Scheduler`](crate::scheduling::Scheduler)
pub trait Node: Send {
    /// Get the node's name (must be unique)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once before the first tick)
    fn init(&mut self, ctx: &mut NodeInfo) -> TurtleResult<()> {
        ctx.log_debug("Node initialized successfully");
        Ok(())
    }

    /// One step of work (called once per scheduler spin)
    fn tick(&mut self, ctx: Option<&mut NodeInfo>);

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> TurtleResult<()> {
        ctx.log_debug("Node shutdown successfully");
        Ok(())
    }
}

// LogSummary implementations for primitive types
impl LogSummary for f32 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
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

impl LogSummary for () {
    fn log_summary(&self) -> String {
        "()".to_string()
    }
}
