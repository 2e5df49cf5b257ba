//! # Core types and traits for the turtle runtime
//!
//! - **Node**: the base trait for units ticked by the scheduler
//! - **NodeInfo**: runtime context (state, metrics, logging) handed to nodes
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - Node is created with its topic and service endpoints
//! 2. **Initialization** - `init()` is called before the first tick
//! 3. **Execution** - `tick()` is called once per scheduler spin
//! 4. **Shutdown** - `shutdown()` is called to clean up resources

pub mod node;

pub use node::{LogSummary, Node, NodeConfig, NodeInfo, NodeMetrics, NodeState};
