//! Pose types: the controller's dead-reckoned estimate and the simulator's
//! ground truth.

use crate::algorithms::angle::normalize_angle;
use serde::{Deserialize, Serialize};
use turtle_core::LogSummary;

/// The controller's belief about where the turtle is.
///
/// The heading is kept normalized into (-π, π] by every mutator, which is
/// why the fields are private. Position is an estimate only; nothing ever
/// corrects it from the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateFields")]
pub struct TurtleState {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
}

/// Wire shape of [`TurtleState`]; deserializing goes through `new`
#[derive(Deserialize)]
struct StateFields {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
}

impl From<StateFields> for TurtleState {
    fn from(fields: StateFields) -> Self {
        Self::new(fields.x, fields.y, fields.heading, fields.pen_down)
    }
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_down: true,
        }
    }
}

impl TurtleState {
    pub fn new(x: f64, y: f64, heading: f64, pen_down: bool) -> Self {
        Self {
            x,
            y,
            heading: normalize_angle(heading),
            pen_down,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Heading in radians, always within (-π, π]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_heading(&mut self, heading: f64) {
        self.heading = normalize_angle(heading);
    }

    /// Turn by `delta` radians
    pub fn rotate_by(&mut self, delta: f64) {
        self.set_heading(self.heading + delta);
    }

    pub fn set_pen_down(&mut self, pen_down: bool) {
        self.pen_down = pen_down;
    }

    /// Euclidean distance from the estimated position to `(x, y)`
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (x - self.x).hypot(y - self.y)
    }
}

impl LogSummary for TurtleState {
    fn log_summary(&self) -> String {
        format!(
            "TurtleState(x={:.3}, y={:.3}, heading={:.3}, pen={})",
            self.x,
            self.y,
            self.heading,
            if self.pen_down { "down" } else { "up" }
        )
    }
}

/// Planar pose used by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Integrate unicycle motion for `dt` seconds
    pub fn integrate(&self, linear: f64, angular: f64, dt: f64) -> Self {
        let dx = linear * self.theta.cos() * dt;
        let dy = linear * self.theta.sin() * dt;
        Self {
            x: self.x + dx,
            y: self.y + dy,
            theta: normalize_angle(self.theta + angular * dt),
        }
    }

    pub fn distance_to(&self, other: &Pose2D) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl LogSummary for Pose2D {
    fn log_summary(&self) -> String {
        format!(
            "Pose2D(x={:.3}, y={:.3}, theta={:.3})",
            self.x, self.y, self.theta
        )
    }
}
