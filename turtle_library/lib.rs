//! # Turtle Library
//!
//! Messages, algorithms and nodes for drawing with a simulated turtle.
//!
//! ## Structure
//!
//! ```text
//! turtle_library/
//! ── messages/       # CmdVel, turtlesim services, pose types
//! ── algorithms/     # Angle arithmetic, pose estimation
//! ── nodes/          # Drawing controller and headless simulator
//! ── config.rs       # DrawConfig (TOML)
//! ── choreography.rs # Ordered drawing steps
//! ── tools/          # turtle_draw binary
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use turtle_library::{Choreography, DrawConfig, TurtleDrawNode};
//!
//! let mut node = TurtleDrawNode::new(handles, DrawConfig::default())?;
//! Choreography::figure().run(&mut node);
//! node.shutdown();
//! ```

pub mod algorithms;
pub mod choreography;
pub mod config;
pub mod messages;
pub mod nodes;

// Re-export core traits needed for message types
pub use turtle_core::core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use choreography::{Choreography, DrawStep};
pub use config::{DrawConfig, SimConfig};
pub use nodes::{
    DrawHandles, DrawStats, SimServers, SimWorld, TrailSegment, TurtleDrawNode, TurtleSimNode,
};
