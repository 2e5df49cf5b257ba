//! Pose estimation from commanded velocity
//!
//! The drawing controller never sees the turtle's true pose. Whatever it
//! believes about its heading comes from an estimator that integrates the
//! commands it has sent. [`DeadReckoning`] is the open-loop default.
//!
//! # Example
//!
//! ```rust
//! use turtle_library::algorithms::pose_estimator::{DeadReckoning, PoseEstimator};
//! use turtle_library::{CmdVel, TurtleState};
//!
//! let mut estimator = DeadReckoning::new();
//! let mut state = TurtleState::default();
//! estimator.integrate(&mut state, &CmdVel::turn(0.5), 0.1);
//! assert!((state.heading() - 0.05).abs() < 1e-12);
//! ```

use crate::messages::{CmdVel, TurtleState};

/// Updates the controller's pose estimate after a command has been sent
pub trait PoseEstimator: Send {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Account for `cmd` having been applied for `dt` seconds
    fn integrate(&mut self, state: &mut TurtleState, cmd: &CmdVel, dt: f64);
}

/// Open-loop heading integration.
///
/// Only the heading is advanced. Position is left alone because the drawing
/// operations snap it to their commanded endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeadReckoning {
    integrated_steps: u64,
}

impl DeadReckoning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands integrated so far
    pub fn integrated_steps(&self) -> u64 {
        self.integrated_steps
    }
}

impl PoseEstimator for DeadReckoning {
    fn name(&self) -> &'static str {
        "dead_reckoning"
    }

    fn integrate(&mut self, state: &mut TurtleState, cmd: &CmdVel, dt: f64) {
        state.rotate_by(cmd.angular * dt);
        self.integrated_steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_heading_advances_by_angular_times_dt() {
        let mut estimator = DeadReckoning::new();
        let mut state = TurtleState::default();

        for _ in 0..10 {
            estimator.integrate(&mut state, &CmdVel::turn(0.1), 0.1);
        }

        assert_relative_eq!(state.heading(), 0.1, epsilon = 1e-12);
        assert_eq!(estimator.integrated_steps(), 10);
    }

    #[test]
    fn test_position_untouched() {
        let mut estimator = DeadReckoning::new();
        let mut state = TurtleState::new(1.0, 2.0, 0.0, true);

        estimator.integrate(&mut state, &CmdVel::new(3.0, 1.0), 0.1);

        assert_eq!(state.position(), (1.0, 2.0));
    }

    #[test]
    fn test_heading_wraps() {
        let mut estimator = DeadReckoning::new();
        let mut state = TurtleState::new(0.0, 0.0, PI - 0.01, true);

        estimator.integrate(&mut state, &CmdVel::turn(1.0), 0.1);

        assert_relative_eq!(state.heading(), -PI + 0.09, epsilon = 1e-12);
    }
}
