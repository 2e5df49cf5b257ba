//! # turtle_core
//!
//! The runtime the turtle drawing controller and simulator are built on.
//!
//! - **Nodes**: units of work ticked by the scheduler, with a logging context
//! - **Communication**: in-process pub/sub topics and request/response services
//! - **Scheduling**: the cooperative event pump and injected clocks
//!
//! ## Quick Start
//!
//! ```rust
//! use turtle_core::{EventPump, Hub, Node, NodeInfo, Scheduler};
//!
//! struct Talker {
//!     output: Hub<f64>,
//! }
//!
//! impl Node for Talker {
//!     fn name(&self) -> &'static str { "talker" }
//!
//!     fn tick(&mut self, ctx: Option<&mut NodeInfo>) {
//!         let _ = self.output.send(1.0, ctx);
//!     }
//! }
//!
//! let hub: Hub<f64> = Hub::new("speed").unwrap();
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(Talker { output: hub.clone() }), 0, None);
//! scheduler.spin_once();
//! assert_eq!(hub.recv(None), Some(1.0));
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use communication::{Hub, PendingCall, Publisher, ServiceClient, ServiceType, Subscriber};
pub use core::{LogSummary, Node, NodeConfig, NodeInfo, NodeState};
pub use error::{TurtleError, TurtleResult};
pub use scheduling::{Clock, EventPump, MonotonicClock, Scheduler, SimClock};
