//! Message types exchanged between the drawing controller and the simulator
//!
//! # Message Organization
//!
//! - Motion: velocity commands (`CmdVel`)
//! - Services: pen, spawn and kill requests (`SetPen`, `Spawn`, `Kill`)
//! - State: the controller's pose estimate and the simulator's pose
//!
//! All message types are re-exported at the crate root for convenience.

pub mod cmd_vel;
pub mod turtle_state;
pub mod turtlesim;

pub use cmd_vel::CmdVel;
pub use turtle_state::{Pose2D, TurtleState};
pub use turtlesim::{
    Kill, KillRequest, PenStyle, SetPen, SetPenRequest, Spawn, SpawnRequest, SpawnResponse,
};
