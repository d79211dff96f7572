//! # Roster Testkit
//!
//! Test utilities for roster.
//!
//! This crate provides:
//! - Fixtures: sample members, an event recorder and test logging
//! - Property-based test generators using proptest
//! - A model-checking harness that mirrors a collection's expected state
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_testkit::prelude::*;
//!
//! #[test]
//! fn stooges_are_sorted() {
//!     init_tracing();
//!     let collection = stooge_collection(CollectionConfig::new().comparator("name"));
//!     assert_eq!(names(&collection), vec!["curly", "larry", "moe"]);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use roster_core::{Collection, CollectionConfig, SetOptions};
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
