//! Error types for each layer of the signal runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A domain error carried inside a signal envelope.
///
/// Unlike operational errors, this one travels *with the data*: a failing
/// operator turns its signal into an error signal, and the error rides the
/// graph until a dedicated error-handler node consumes it. That transport
/// requirement is why this type is `Clone + Serialize` rather than a
/// boxed `std::error::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct SignalError {
    /// Human-readable failure description.
    pub message: String,
}

impl SignalError {
    /// Create a new domain error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for SignalError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for SignalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

// Operator callbacks routinely turn a failed typed read into a domain
// error with `?`.
impl From<PayloadError> for SignalError {
    fn from(error: PayloadError) -> Self {
        Self::new(error.to_string())
    }
}

/// Payload conversion errors, reported by typed reads.
///
/// Callers decide whether a failed conversion becomes a domain error.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The raw value has a shape the sink cannot coerce.
    #[error("cannot convert {found} to {expected}")]
    TypeMismatch {
        /// The sink type that was requested.
        expected: &'static str,
        /// A short description of the raw value's shape.
        found: String,
    },

    /// A string value failed to parse as the requested numeric type.
    #[error("failed to parse {expected} from {value:?}")]
    Parse {
        /// The sink type that was requested.
        expected: &'static str,
        /// The string that failed to parse.
        value: String,
    },

    /// Structured decoding of a user type failed.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Observer errors.
///
/// Observers are read-only taps and must be total functions — a returned
/// error is a programmer error, not a data condition. The node aborts the
/// current operation on the first observer error (remaining observers are
/// not invoked) and surfaces it to the caller.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The observer rejected the event.
    #[error("observer failed: {0}")]
    Failed(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
