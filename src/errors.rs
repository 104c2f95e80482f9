//! Handoff default `Error`
use std::fmt;

/// Result type: `std::result::Result<T, Error>`
pub type Result<T> = std::result::Result<T, Error>;


/// Wrapping error type.
#[derive(Debug)]
pub enum Error {
    /// std::io::Error
    Io(std::io::Error),

    /// The queue was closed once already.
    /// A queue can only be closed once
    AlreadyClosed,

    /// Attempted to send a value into a closed queue
    ClosedQueueSend,

    /// No topic with the given name is registered with the broker
    TopicNotFound(String),

    /// The subscription is not a member of the named topic
    /// (it was never subscribed there, or was already removed)
    SubscriberNotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::AlreadyClosed => write!(f, "queue is already closed"),
            Error::ClosedQueueSend => write!(f, "send on closed queue"),
            Error::TopicNotFound(topic) => write!(f, "topic not found: {}", topic),
            Error::SubscriberNotFound(topic) => write!(f, "subscriber not found in topic: {}", topic),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}


// -----------------------------------------------------------------------------
// 		- IO error -
// -----------------------------------------------------------------------------
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
