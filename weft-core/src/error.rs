//! Error types.

/// Error returned by an event handler.
///
/// Handlers are user code; the engine only needs a message to surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Create a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Errors surfaced by the engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A handler registered for `event` failed. The rest of the batch was aborted.
    #[error("handler for `{event}` failed: {source}")]
    Handler {
        event: String,
        #[source]
        source: HandlerError,
    },

    /// A recognized option was given a value of the wrong type.
    #[error("option `{name}` expects {expected}")]
    InvalidOption { name: String, expected: &'static str },

    /// Options could not be parsed.
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),

    /// The shell's task queue is closed.
    #[error("task queue closed")]
    QueueClosed,
}

impl EngineError {
    pub(crate) fn handler(event: &str, source: HandlerError) -> Self {
        Self::Handler {
            event: event.to_string(),
            source,
        }
    }

    pub(crate) fn invalid_option(name: &str, expected: &'static str) -> Self {
        Self::InvalidOption {
            name: name.to_string(),
            expected,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
