//! Turtle Library Nodes
//!
//! - `TurtleDrawNode` - open-loop drawing controller driven by a choreography
//! - `TurtleSimNode` - headless simulator ticked by the scheduler
//!
//! # Usage Examples
//!
//! ```rust
//! use turtle_core::communication::service;
//! use turtle_core::Hub;
//! use turtle_library::nodes::{SimServers, TurtleSimNode};
//! use turtle_library::{CmdVel, Kill, Pose2D, SetPen, Spawn};
//!
//! let cmd_vel: Hub<CmdVel> = Hub::new("/turtle1/cmd_vel").unwrap();
//! let (_pen, set_pen) = service::pair::<SetPen>("/turtle1/set_pen");
//! let (_spawn, spawn) = service::pair::<Spawn>("spawn");
//! let (_kill, kill) = service::pair::<Kill>("kill");
//!
//! let sim = TurtleSimNode::new(
//!     cmd_vel,
//!     SimServers { set_pen, spawn, kill },
//!     Pose2D::new(5.5, 5.5, 0.0),
//!     0.1,
//! );
//! assert_eq!(sim.world().turtle_names(), vec!["turtle1"]);
//! ```

pub mod turtle_draw_node;
pub mod turtle_sim_node;

pub use turtle_draw_node::{DrawHandles, DrawStats, TurtleDrawNode};
pub use turtle_sim_node::{
    SimServers, SimTurtle, SimWorld, TrailSegment, TurtleSimNode, WorldState, MAIN_TURTLE,
};
