//! Error types for the value crate.

use thiserror::Error;

/// Result type for value conversions.
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors that can occur while converting foreign data into a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Float values cannot be used as attribute values.
    #[error("float values are not supported as attribute values")]
    FloatForbidden,

    /// Integer does not fit in an i64.
    #[error("integer overflow: {literal} does not fit in i64")]
    IntegerOverflow {
        /// The offending literal.
        literal: String,
    },
}

impl ValueError {
    /// Create an integer overflow error.
    pub fn integer_overflow(literal: impl Into<String>) -> Self {
        Self::IntegerOverflow {
            literal: literal.into(),
        }
    }
}
