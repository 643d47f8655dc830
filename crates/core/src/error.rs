use thiserror::Error;

/// Core errors for the telemetry collector
#[derive(Error, Debug)]
pub enum CoreError {
    /// Programming or integration error: counter width not established,
    /// or two readings of different devices were diffed.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("Baseline required: {0}")]
    NotBaselined(String),

    /// The metric could not be produced this call. Stored state is untouched.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn precondition<S: Into<String>>(msg: S) -> Self {
        Self::PreconditionViolation(msg.into())
    }

    pub fn not_baselined<S: Into<String>>(msg: S) -> Self {
        Self::NotBaselined(msg.into())
    }

    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors recovered at the call boundary of a sampling operation.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
