//! Ordering functions for sorted collections.

use crate::model::{MemberRef, Model};
use roster_value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Extracts a sort key from a member.
pub type KeyFn = Arc<dyn Fn(&dyn Model) -> Value + Send + Sync>;

/// Three-way compares two members.
pub type CompareFn = Arc<dyn Fn(&dyn Model, &dyn Model) -> Ordering + Send + Sync>;

/// How a collection keeps its members ordered.
///
/// All three forms sort ascending and stably: members that compare equal
/// keep their relative order.
///
/// Comparators run while the collection's state is locked and must not
/// call back into the collection.
#[derive(Clone)]
pub enum Comparator {
    /// Natural order of one attribute. Members lacking it sort last.
    Attribute(String),
    /// Natural order of an extracted key.
    Key(KeyFn),
    /// An explicit three-way comparison.
    Compare(CompareFn),
}

impl Comparator {
    /// Orders by the value of `name`.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    /// Orders by the key `extract` returns.
    pub fn key<F>(extract: F) -> Self
    where
        F: Fn(&dyn Model) -> Value + Send + Sync + 'static,
    {
        Self::Key(Arc::new(extract))
    }

    /// Orders with an explicit comparison.
    pub fn compare<F>(compare: F) -> Self
    where
        F: Fn(&dyn Model, &dyn Model) -> Ordering + Send + Sync + 'static,
    {
        Self::Compare(Arc::new(compare))
    }

    /// The attribute whose change requires a re-sort, for attribute
    /// comparators. Other forms re-sort on any change.
    pub fn sort_attribute(&self) -> Option<&str> {
        match self {
            Self::Attribute(name) => Some(name),
            Self::Key(_) | Self::Compare(_) => None,
        }
    }

    /// Compares two members.
    pub fn cmp(&self, a: &dyn Model, b: &dyn Model) -> Ordering {
        match self {
            Self::Attribute(name) => {
                Value::cmp_missing_last(a.get(name).as_ref(), b.get(name).as_ref())
            }
            Self::Key(extract) => extract(a).cmp(&extract(b)),
            Self::Compare(compare) => compare(a, b),
        }
    }

    /// Sorts `members` in place.
    pub fn sort(&self, members: &mut [MemberRef]) {
        match self {
            Self::Attribute(name) => {
                members.sort_by_cached_key(|m| SortKey(m.get(name)));
            }
            Self::Key(extract) => members.sort_by_cached_key(|m| extract(m.as_ref())),
            Self::Compare(compare) => members.sort_by(|a, b| compare(a.as_ref(), b.as_ref())),
        }
    }
}

/// Attribute value ordered with missing values last.
#[derive(PartialEq, Eq)]
struct SortKey(Option<Value>);

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        Value::cmp_missing_last(self.0.as_ref(), other.0.as_ref())
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Self::Key(_) => f.write_str("Key(..)"),
            Self::Compare(_) => f.write_str("Compare(..)"),
        }
    }
}

impl From<&str> for Comparator {
    fn from(name: &str) -> Self {
        Self::attribute(name)
    }
}

impl From<String> for Comparator {
    fn from(name: String) -> Self {
        Self::Attribute(name)
    }
}
