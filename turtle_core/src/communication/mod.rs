//! # Communication layer
//!
//! - **Hub**: in-process publisher-subscriber topic
//! - **service**: request/response calls with explicit pending-call handles
//!
//! **Backend-agnostic usage:**
//! ```rust
//! use turtle_core::communication::{Hub, Publisher};
//! fn stop<P: Publisher<f64>>(publisher: &P) {
//!     publisher.send(0.0).unwrap();
//! }
//! let hub: Hub<f64> = Hub::new("speed").unwrap();
//! stop(&hub);
//! ```

pub mod hub;
pub mod service;
pub mod traits;

// Re-export commonly used types for convenience
pub use hub::{Hub, HubMetrics};
pub use service::{Client, PendingCall, Server, ServiceClient, ServiceType};
pub use traits::{Publisher, Subscriber};
