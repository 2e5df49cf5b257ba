//! # Scheduling
//!
//! - **Scheduler**: ticks registered nodes in priority order, once per spin
//! - **EventPump**: the cooperative yield contract blocking loops call into
//! - **Clock**: injected time, simulated or monotonic
//!
//! ## Usage
//!
//! ```rust,ignore
//! use turtle_core::scheduling::{EventPump, Scheduler};
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(sim_node), 0, Some(true));
//! let clock = scheduler.clock();
//! scheduler.spin_once(); // ticks sim_node, then advances `clock` by one period
//! ```
//!
//! ## Priority Levels
//!
//! Numeric priorities, 0 ticks first.

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, MonotonicClock, SimClock};
pub use scheduler::{EventPump, Scheduler, DEFAULT_PERIOD};
