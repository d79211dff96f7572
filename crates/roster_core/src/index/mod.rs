//! Lookup indexes over collection members.
//!
//! A collection maintains one [`MemberIndex`] per configured index name,
//! mapping an attribute value to the single member holding it. The
//! [`IndexRegistry`] groups them with the creation-identity map.
//!
//! # Rules
//!
//! - At most one member per key per index; filing a second member under a
//!   key displaces the first
//! - Non-indexable values (null, `false`, empty text) are never filed
//! - Removing a member purges every entry referencing it, even if its
//!   attributes changed since it was filed

mod member_index;
mod registry;

pub use member_index::MemberIndex;
pub use registry::IndexRegistry;
