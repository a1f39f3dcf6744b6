/// Result alias that carries the custom [`SampleRelayError`] type.
pub type Result<T> = std::result::Result<T, SampleRelayError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SampleRelayError {
    /// Free-form error carrying a readable message, used for conditions that
    /// have no richer representation (for example a poisoned lock).
    #[error("{0}")]
    Message(String),
    /// A caller handed the library an argument it cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration could not be serialised or deserialised.
    #[error("{0}")]
    Config(#[from] serde_json::Error),
}

impl SampleRelayError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SampleRelayError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SampleRelayError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
