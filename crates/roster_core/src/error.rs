//! Error types for roster core.

use std::fmt;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Index names that refer to properties of the member reference itself
/// rather than to one of its attributes.
pub const RESERVED_INDEX_NAMES: &[&str] = &["cid", "collection"];

/// Errors that can occur in roster core operations.
///
/// Only programmer errors are represented here. Expected divergences such
/// as duplicates, absent keys or rejected attributes are reported through
/// return values and events.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An index was configured with an empty name.
    #[error("index name must not be empty")]
    EmptyIndexName,

    /// An index name collides with a reserved member field.
    #[error("index name `{name}` is reserved")]
    ReservedIndexName {
        /// The rejected index name.
        name: String,
    },

    /// A sort was requested on a collection without a comparator.
    #[error("cannot sort a collection without a comparator")]
    MissingComparator,

    /// Attribute value conversion error.
    #[error("value error: {0}")]
    Value(#[from] roster_value::ValueError),
}

impl CoreError {
    /// Creates a reserved index name error.
    pub fn reserved_index_name(name: impl Into<String>) -> Self {
        Self::ReservedIndexName { name: name.into() }
    }
}

/// A model rejected a set of attributes.
///
/// Validation failures are values: they are returned from
/// [`Model::set`](crate::Model::set) and carried by `invalid` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Human readable reason.
    pub message: String,
    /// The attribute at fault, if the validator named one.
    pub attribute: Option<String>,
}

impl ValidationError {
    /// Creates a validation error not tied to a single attribute.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attribute: None,
        }
    }

    /// Creates a validation error for one attribute.
    pub fn for_attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attribute: Some(attribute.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "invalid `{attribute}`: {}", self.message),
            None => write!(f, "invalid: {}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}
