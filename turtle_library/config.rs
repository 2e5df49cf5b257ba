//! Controller and simulator configuration
//!
//! Every key is optional; a missing key takes the value the drawing routines
//! were tuned with.
//!
//! ```toml
//! rotate_speed = 0.1
//! control_period = 0.1
//!
//! [pen]
//! r = 255
//! g = 0
//! b = 0
//! width = 3
//!
//! [sim]
//! start_x = 5.544445
//! start_y = 5.544445
//! ```

use crate::messages::PenStyle;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use turtle_core::{TurtleError, TurtleResult};

fn default_rotate_speed() -> f64 {
    0.1
}

fn default_control_period() -> f64 {
    0.1
}

fn default_heading_tolerance() -> f64 {
    1e-2
}

fn default_turn_epsilon() -> f64 {
    1e-3
}

fn default_circumference_tolerance() -> f64 {
    1e-3
}

fn default_service_wait() -> f64 {
    1.0
}

fn default_speed() -> f64 {
    1.0
}

fn default_radius() -> f64 {
    1.0
}

fn default_start_coordinate() -> f64 {
    5.544445
}

/// Tuning for the drawing controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrawConfig {
    /// Magnitude of the angular velocity used to turn in place (rad/s)
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f64,
    /// Nominal seconds between commands, used for dead reckoning
    #[serde(default = "default_control_period")]
    pub control_period: f64,
    /// A rotation ends once the heading is this close to its target (rad)
    #[serde(default = "default_heading_tolerance")]
    pub heading_tolerance: f64,
    /// Turns smaller than this are not worth a rotation (rad)
    #[serde(default = "default_turn_epsilon")]
    pub turn_epsilon: f64,
    /// How far off the circle a circle may start
    #[serde(default = "default_circumference_tolerance")]
    pub circumference_tolerance: f64,
    /// Seconds per wait on an unavailable service
    #[serde(default = "default_service_wait")]
    pub service_wait: f64,
    #[serde(default = "default_speed")]
    pub default_speed: f64,
    #[serde(default = "default_radius")]
    pub default_radius: f64,
    #[serde(default)]
    pub pen: PenStyle,
    #[serde(default)]
    pub sim: SimConfig,
}

/// Where the simulated turtle starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    #[serde(default = "default_start_coordinate")]
    pub start_x: f64,
    #[serde(default = "default_start_coordinate")]
    pub start_y: f64,
    #[serde(default)]
    pub start_theta: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_x: default_start_coordinate(),
            start_y: default_start_coordinate(),
            start_theta: 0.0,
        }
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            rotate_speed: default_rotate_speed(),
            control_period: default_control_period(),
            heading_tolerance: default_heading_tolerance(),
            turn_epsilon: default_turn_epsilon(),
            circumference_tolerance: default_circumference_tolerance(),
            service_wait: default_service_wait(),
            default_speed: default_speed(),
            default_radius: default_radius(),
            pen: PenStyle::default(),
            sim: SimConfig::default(),
        }
    }
}

impl DrawConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> TurtleResult<Self> {
        let config: DrawConfig = toml::from_str(content)
            .map_err(|e| TurtleError::Config(format!("invalid draw config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> TurtleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("loaded draw config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Reject values the control loops cannot work with
    pub fn validate(&self) -> TurtleResult<()> {
        let positive = [
            ("rotate_speed", self.rotate_speed),
            ("control_period", self.control_period),
            ("heading_tolerance", self.heading_tolerance),
            ("service_wait", self.service_wait),
            ("default_speed", self.default_speed),
            ("default_radius", self.default_radius),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TurtleError::Config(format!(
                    "{} must be positive and finite, got {}",
                    key, value
                )));
            }
        }

        for (key, value) in [
            ("control_period", self.control_period),
            ("service_wait", self.service_wait),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(TurtleError::Config(format!(
                    "{} of {} s is too long",
                    key, value
                )));
            }
        }

        let non_negative = [
            ("turn_epsilon", self.turn_epsilon),
            ("circumference_tolerance", self.circumference_tolerance),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TurtleError::Config(format!(
                    "{} must be non-negative and finite, got {}",
                    key, value
                )));
            }
        }

        // One rotate step must not jump over the whole exit window
        let step = self.rotate_step();
        if step > 2.0 * self.heading_tolerance {
            return Err(TurtleError::Config(format!(
                "rotate step {:.4} rad exceeds twice the heading tolerance {:.4} rad",
                step, self.heading_tolerance
            )));
        }

        if self.pen.width == 0 {
            return Err(TurtleError::Config("pen width must be positive".to_string()));
        }

        let sim = &self.sim;
        if !(sim.start_x.is_finite() && sim.start_y.is_finite() && sim.start_theta.is_finite()) {
            return Err(TurtleError::Config(
                "sim start pose must be finite".to_string(),
            ));
        }

        Ok(())
    }

    /// Heading change per rotate command (rad)
    pub fn rotate_step(&self) -> f64 {
        self.rotate_speed * self.control_period
    }

    pub fn control_period_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.control_period).unwrap_or(Duration::MAX)
    }

    pub fn service_wait_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.service_wait).unwrap_or(Duration::MAX)
    }
}
