//! # Roster Value
//!
//! Loosely-typed attribute values for roster collections.
//!
//! This crate provides:
//! - [`Value`]: a hashable, totally ordered dynamic value
//! - [`Attributes`]: the string-keyed map a model is made of
//! - the [`attrs!`] construction macro
//! - conversion from and to `serde_json::Value`
//!
//! ## Usage
//!
//! ```
//! use roster_value::{attrs, Value};
//!
//! let moe = attrs! { "id" => 1, "name" => "moe" };
//! assert_eq!(moe.get("id"), Some(&Value::Integer(1)));
//!
//! let parsed = Value::try_from(serde_json::json!({"id": 2})).unwrap();
//! assert_eq!(parsed.get("id"), Some(&Value::Integer(2)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod attributes;
mod error;
mod json;
mod value;

pub use attributes::Attributes;
pub use error::{ValueError, ValueResult};
pub use value::Value;
