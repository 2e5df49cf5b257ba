//! Drawing choreographies
//!
//! A choreography is an ordered list of [`DrawStep`]s. It can be built in
//! code, loaded from TOML, or taken from [`Choreography::figure`]:
//!
//! ```toml
//! [[step]]
//! op = "move_to"
//! x = 5.0
//! y = 7.0
//!
//! [[step]]
//! op = "circle"
//! center_x = 8.0
//! center_y = 2.0
//! radius = 1.0
//! ```

use crate::nodes::TurtleDrawNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use turtle_core::{LogSummary, TurtleError, TurtleResult};

/// One drawing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawStep {
    /// Travel with the pen up, then put it down
    MoveTo {
        x: f64,
        y: f64,
        #[serde(default)]
        speed: Option<f64>,
    },
    LineTo {
        x: f64,
        y: f64,
        #[serde(default)]
        speed: Option<f64>,
    },
    Circle {
        center_x: f64,
        center_y: f64,
        #[serde(default)]
        radius: Option<f64>,
        #[serde(default)]
        speed: Option<f64>,
    },
    PenUp,
    PenDown,
    Face {
        heading: f64,
    },
}

impl DrawStep {
    pub fn move_to(x: f64, y: f64) -> Self {
        DrawStep::MoveTo { x, y, speed: None }
    }

    pub fn line_to(x: f64, y: f64) -> Self {
        DrawStep::LineTo { x, y, speed: None }
    }

    pub fn circle(center_x: f64, center_y: f64) -> Self {
        DrawStep::Circle {
            center_x,
            center_y,
            radius: None,
            speed: None,
        }
    }

    /// Execute on `node`, filling missing speed/radius from its config
    pub fn apply(&self, node: &mut TurtleDrawNode) {
        let default_speed = node.config().default_speed;
        let default_radius = node.config().default_radius;
        match *self {
            DrawStep::MoveTo { x, y, speed } => {
                node.move_turtle(x, y, speed.unwrap_or(default_speed));
            }
            DrawStep::LineTo { x, y, speed } => {
                node.draw_line(x, y, speed.unwrap_or(default_speed));
            }
            DrawStep::Circle {
                center_x,
                center_y,
                radius,
                speed,
            } => {
                node.draw_circle(
                    center_x,
                    center_y,
                    radius.unwrap_or(default_radius),
                    speed.unwrap_or(default_speed),
                );
            }
            DrawStep::PenUp => node.pen_up(),
            DrawStep::PenDown => node.pen_down(),
            DrawStep::Face { heading } => node.face_heading(heading),
        }
    }
}

impl fmt::Display for DrawStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawStep::MoveTo { x, y, .. } => write!(f, "move_to({}, {})", x, y),
            DrawStep::LineTo { x, y, .. } => write!(f, "line_to({}, {})", x, y),
            DrawStep::Circle {
                center_x,
                center_y,
                radius,
                ..
            } => match radius {
                Some(r) => write!(f, "circle({}, {}, r={})", center_x, center_y, r),
                None => write!(f, "circle({}, {})", center_x, center_y),
            },
            DrawStep::PenUp => write!(f, "pen_up"),
            DrawStep::PenDown => write!(f, "pen_down"),
            DrawStep::Face { heading } => write!(f, "face({})", heading),
        }
    }
}

/// Ordered list of drawing steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Choreography {
    #[serde(rename = "step", default)]
    steps: Vec<DrawStep>,
}

impl Choreography {
    pub fn new(steps: Vec<DrawStep>) -> Self {
        Self { steps }
    }

    /// The built-in figure: a diamond, two crossing diagonals and four
    /// circles at the corners of the canvas.
    pub fn figure() -> Self {
        Self::new(vec![
            DrawStep::move_to(5.0, 7.0),
            DrawStep::line_to(7.0, 5.0),
            DrawStep::line_to(5.0, 3.0),
            DrawStep::line_to(3.0, 5.0),
            DrawStep::line_to(7.0, 5.0),
            DrawStep::move_to(6.0, 6.0),
            DrawStep::line_to(8.0, 8.0),
            DrawStep::move_to(4.0, 4.0),
            DrawStep::line_to(2.0, 2.0),
            DrawStep::move_to(4.0, 6.0),
            DrawStep::line_to(2.0, 8.0),
            DrawStep::move_to(6.0, 4.0),
            DrawStep::line_to(8.0, 2.0),
            DrawStep::move_to(8.0, 3.0),
            DrawStep::circle(8.0, 2.0),
            DrawStep::move_to(2.0, 1.0),
            DrawStep::circle(2.0, 2.0),
            DrawStep::move_to(2.0, 9.0),
            DrawStep::circle(2.0, 8.0),
            DrawStep::move_to(2.0, 1.0),
            DrawStep::circle(2.0, 2.0),
        ])
    }

    pub fn from_toml_str(content: &str) -> TurtleResult<Self> {
        toml::from_str(content)
            .map_err(|e| TurtleError::Config(format!("invalid choreography: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> TurtleResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn steps(&self) -> &[DrawStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Execute every step in order
    pub fn run(&self, node: &mut TurtleDrawNode) {
        let total = self.steps.len();
        for (index, step) in self.steps.iter().enumerate() {
            tracing::info!("[{}/{}] {}", index + 1, total, step);
            step.apply(node);
        }
        tracing::info!("choreography finished: {}", node.state().log_summary());
    }
}
