//! Turtlesim service definitions
//!
//! The simulator exposes three request kinds: pen configuration, spawning a
//! new turtle and killing one by name.

use serde::{Deserialize, Serialize};
use turtle_core::{LogSummary, ServiceType};

/// Pen colour and stroke width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenStyle {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub width: u8,
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
            width: 2,
        }
    }
}

/// `set_pen` service
#[derive(Debug)]
pub struct SetPen;

impl ServiceType for SetPen {
    type Request = SetPenRequest;
    type Response = ();
    const TYPE_NAME: &'static str = "turtlesim/SetPen";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPenRequest {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub width: u8,
    /// Lift the pen so that motion leaves no trail
    pub off: bool,
}

impl SetPenRequest {
    pub fn new(style: PenStyle, off: bool) -> Self {
        Self {
            r: style.r,
            g: style.g,
            b: style.b,
            width: style.width,
            off,
        }
    }

    pub fn style(&self) -> PenStyle {
        PenStyle {
            r: self.r,
            g: self.g,
            b: self.b,
            width: self.width,
        }
    }
}

impl LogSummary for SetPenRequest {
    fn log_summary(&self) -> String {
        format!(
            "SetPen(rgb=({},{},{}), width={}, off={})",
            self.r, self.g, self.b, self.width, self.off
        )
    }
}

/// `spawn` service
#[derive(Debug)]
pub struct Spawn;

impl ServiceType for Spawn {
    type Request = SpawnRequest;
    type Response = SpawnResponse;
    const TYPE_NAME: &'static str = "turtlesim/Spawn";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    /// Requested name; empty lets the simulator pick one
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnResponse {
    pub name: String,
}

impl LogSummary for SpawnRequest {
    fn log_summary(&self) -> String {
        format!(
            "Spawn(x={:.2}, y={:.2}, theta={:.2}, name='{}')",
            self.x, self.y, self.theta, self.name
        )
    }
}

/// `kill` service
#[derive(Debug)]
pub struct Kill;

impl ServiceType for Kill {
    type Request = KillRequest;
    type Response = ();
    const TYPE_NAME: &'static str = "turtlesim/Kill";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRequest {
    pub name: String,
}

impl LogSummary for KillRequest {
    fn log_summary(&self) -> String {
        format!("Kill(name='{}')", self.name)
    }
}
