use thiserror::Error;

use crate::Topic;

/// Boxed error returned by subscriber handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when interacting with the event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    /// A subscriber failed while handling an event.
    ///
    /// Dispatch stops at the first failing subscriber. The event itself stays
    /// appended to the topic.
    #[error("Handler for {event_type} on topic {topic} failed: {source}")]
    Handler {
        topic: Topic,
        event_type: String,
        #[source]
        source: BoxError,
    },

    /// An envelope was built without a required field.
    #[error("Event envelope is missing required field: {0}")]
    MissingField(&'static str),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventLogError {
    /// Returns the handler failure carried by this error, if any.
    pub fn handler_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            EventLogError::Handler { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventLogError>;
