//! Error types shared by the turtle runtime and library

use thiserror::Error;

/// Errors raised by the runtime infrastructure.
///
/// Drawing operations themselves never surface these; they block or skip
/// instead. Everything around them (config loading, topic setup, file
/// export) reports through this type.
#[derive(Debug, Error)]
pub enum TurtleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for runtime operations
pub type TurtleResult<T> = Result<T, TurtleError>;
