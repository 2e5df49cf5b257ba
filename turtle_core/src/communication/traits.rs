//! Common traits for all transport implementations
//!
//! Nodes and controllers talk to these traits rather than to a concrete
//! transport, so the in-process [`Hub`](super::Hub) and the test recorders
//! are interchangeable.

use crate::error::TurtleResult;

/// Common trait for publisher/sender implementations
pub trait Publisher<T>: Send {
    /// Topic this publisher writes to
    fn topic(&self) -> &str;

    /// Send a message - returns Ok on success, Err on failure
    fn send(&self, msg: T) -> TurtleResult<()>;

    /// Try to send, reporting only whether delivery succeeded
    fn try_send(&self, msg: T) -> bool {
        self.send(msg).is_ok()
    }
}

/// Common trait for subscriber/receiver implementations
pub trait Subscriber<T>: Send {
    /// Receive a message without blocking
    fn recv(&self) -> Option<T>;

    /// Check if messages are available
    fn has_messages(&self) -> bool {
        false
    }
}
