//! # Roster Core
//!
//! Ordered, indexed, observable collections of models.
//!
//! This crate provides:
//! - [`Collection`] with the `set` reconciliation engine behind `add`,
//!   `remove` and `reset`
//! - Named lookup indexes with duplicate suppression on the main index
//! - Comparator-driven ordering
//! - Synchronous event streams bridging member events into collections
//! - The [`Model`] capability trait and the default [`Record`] model
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_core::{Collection, CollectionConfig, Event};
//! use roster_value::attrs;
//!
//! let people = Collection::new(CollectionConfig::new().index("username"))?;
//! people.on("add", |event: &Event| println!("added {:?}", event.member));
//!
//! people.add(attrs! { "id" => 1, "username" => "moe" });
//! let moe = people.get_in("username", "moe");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod comparator;
mod config;
mod error;
mod event;
mod index;
mod model;
mod options;
mod types;

pub use collection::{Batch, Collection, Input, Lookup, Returned, WeakCollection};
pub use comparator::{CompareFn, Comparator, KeyFn};
pub use config::{CollectionConfig, Parser};
pub use error::{CoreError, CoreResult, ValidationError, RESERVED_INDEX_NAMES};
pub use event::{Event, EventKind, Events, Handler, ALL};
pub use index::{IndexRegistry, MemberIndex};
pub use model::{
    same_member, IdGenerator, MemberRef, Model, ModelFactory, Owner, Record, RecordFactory,
    Validator, DEFAULT_ID_ATTRIBUTE,
};
pub use options::SetOptions;
pub use types::{Cid, ListenerId};

pub use roster_value::{attrs, Attributes, Value};
