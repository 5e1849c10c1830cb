//! Error types for the fragment-matching engine.
//!
//! A heuristic that fails to establish equivalence is *not* an error; it
//! simply reports no match. Errors are reserved for inputs that violate the
//! fragment contract (empty text, scope ranges that do not cover their own
//! fragment, and similar shape problems).

use thiserror::Error;

/// The main error type for fragment-matching operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported fragment shape: {message}")]
    UnsupportedFragment { message: String },
}

impl EngineError {
    /// Convenience constructor for malformed fragment inputs.
    pub fn unsupported(message: impl Into<String>) -> Self {
        EngineError::UnsupportedFragment {
            message: message.into(),
        }
    }
}

/// A specialized Result type for fragment-matching operations.
pub type Result<T> = std::result::Result<T, EngineError>;
