//! The member capability set.
//!
//! A collection does not own attribute storage or change tracking; it
//! drives members through the [`Model`] trait. [`Record`] is the built-in
//! implementation, used whenever a collection is handed raw attribute maps
//! and no [`ModelFactory`] is configured.

mod owner;
mod record;

pub use owner::Owner;
pub use record::{IdGenerator, Record, RecordFactory, Validator};

use crate::collection::Collection;
use crate::error::ValidationError;
use crate::event::Events;
use crate::options::SetOptions;
use crate::types::Cid;
use roster_value::{Attributes, Value};
use std::fmt;
use std::sync::Arc;

/// Attribute name that identifies a member unless configured otherwise.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// A shared reference to a collection member.
pub type MemberRef = Arc<dyn Model>;

/// Capabilities a collection member must provide.
///
/// Implementations use interior mutability: members are shared between
/// the caller and every index that references them.
pub trait Model: Send + Sync {
    /// Stable creation identity.
    fn cid(&self) -> Cid;

    /// Current value of one attribute.
    fn get(&self, attribute: &str) -> Option<Value>;

    /// Snapshot of every attribute.
    fn attributes(&self) -> Attributes;

    /// Applies `attributes` on top of the current ones.
    ///
    /// With `options.validate` set, an implementation must leave its
    /// attributes untouched and return the error when validation fails.
    fn set(&self, attributes: &Attributes, options: &SetOptions) -> Result<(), ValidationError>;

    /// Whether the last `set` changed `attribute`, or changed anything at
    /// all when `attribute` is `None`.
    fn has_changed(&self, attribute: Option<&str>) -> bool;

    /// Value of `attribute` before the last `set` that changed it.
    fn previous(&self, attribute: &str) -> Option<Value>;

    /// Back-reference slot to the owning collection.
    fn owner(&self) -> &Owner;

    /// Name of the identifying attribute.
    fn id_attribute(&self) -> &str {
        DEFAULT_ID_ATTRIBUTE
    }

    /// Returns true while the member has no usable identifying value.
    fn is_new(&self) -> bool {
        !self
            .get(self.id_attribute())
            .is_some_and(|id| id.is_indexable())
    }

    /// Checks `attributes` as they would be after a `set`.
    fn validate(&self, _attributes: &Attributes) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Transforms raw attributes before they are merged onto this member.
    fn parse(&self, attributes: Attributes) -> Attributes {
        attributes
    }

    /// The member's own event stream, if it has one.
    fn events(&self) -> Option<&Events> {
        None
    }

    /// The collection currently holding this member.
    fn collection(&self) -> Option<Collection> {
        self.owner().collection()
    }
}

impl fmt::Debug for dyn Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("cid", &self.cid())
            .field("attributes", &self.attributes())
            .finish()
    }
}

/// Returns true if both references point at the same member.
pub fn same_member(a: &MemberRef, b: &MemberRef) -> bool {
    a.cid() == b.cid()
}

/// Builds members from raw attributes: the collection's member type.
pub trait ModelFactory: Send + Sync {
    /// Name of the identifying attribute of built members.
    fn id_attribute(&self) -> &str {
        DEFAULT_ID_ATTRIBUTE
    }

    /// Computes the identifying value of raw attributes.
    ///
    /// Returning `None` falls back to reading [`id_attribute`](Self::id_attribute).
    fn generate_id(&self, _attributes: &Attributes) -> Option<Value> {
        None
    }

    /// Builds a member for `collection`.
    ///
    /// Returning `None` skips the input.
    fn build(
        &self,
        attributes: Attributes,
        collection: &Collection,
        options: &SetOptions,
    ) -> Option<MemberRef>;
}
