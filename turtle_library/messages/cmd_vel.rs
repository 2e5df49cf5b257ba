use serde::{Deserialize, Serialize};
use turtle_core::LogSummary;

/// Command velocity message for turtle control
///
/// Only the planar components a turtle can follow: forward speed along the
/// heading and yaw rate (positive is counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmdVel {
    pub linear: f64,  // m/s forward velocity
    pub angular: f64, // rad/s turning velocity
}

impl CmdVel {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Create a zero velocity command (stop)
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Pure rotation
    pub fn turn(angular: f64) -> Self {
        Self::new(0.0, angular)
    }

    /// Straight-line motion
    pub fn forward(linear: f64) -> Self {
        Self::new(linear, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

impl Default for CmdVel {
    fn default() -> Self {
        Self::zero()
    }
}

impl LogSummary for CmdVel {
    fn log_summary(&self) -> String {
        format!("CmdVel(lin={:.3}, ang={:.3})", self.linear, self.angular)
    }
}
