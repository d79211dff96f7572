//! Events emitted by collections and their members.
//!
//! Every collection and every [`Record`](crate::Record) owns an [`Events`]
//! stream. Collections listen to the `"all"` channel of each member they
//! hold and re-emit member events on their own stream, so observers of a
//! collection see both collection-level events (`add`, `remove`, `sort`,
//! `reset`, `invalid`) and member-level ones (`change:<attr>`, `change`,
//! `destroy`, custom names).
//!
//! # Usage
//!
//! ```rust,ignore
//! let people = Collection::new(CollectionConfig::new())?;
//! people.on("add", |event| println!("added {:?}", event.member));
//! people.add(attrs! { "id" => 1, "name" => "moe" });
//! ```

mod emitter;

pub use emitter::{Events, Handler, ALL};

use crate::collection::Collection;
use crate::error::ValidationError;
use crate::model::MemberRef;
use crate::options::SetOptions;
use std::borrow::Cow;

/// What happened.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A member was added to a collection.
    Add,
    /// A member was removed from a collection.
    Remove {
        /// Position the member occupied just before it was removed.
        index: usize,
    },
    /// A collection's order changed.
    Sort,
    /// A collection was reset in bulk.
    Reset {
        /// The members held before the reset.
        previous: Vec<MemberRef>,
    },
    /// Attributes were rejected by a member's validation.
    Invalid {
        /// Why the attributes were rejected.
        error: ValidationError,
    },
    /// A member's attributes changed.
    ///
    /// Emitted once per changed attribute with `Some(name)`, then once
    /// with `None` for the change as a whole.
    Change {
        /// The changed attribute, if this is a per-attribute event.
        attribute: Option<String>,
    },
    /// A member was destroyed.
    Destroy,
    /// Any other event name.
    Custom(String),
}

/// A single event as delivered to handlers.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// The member concerned, if any.
    pub member: Option<MemberRef>,
    /// The collection concerned, if any.
    pub collection: Option<Collection>,
    /// Options of the call that caused the event.
    pub options: SetOptions,
}

impl Event {
    /// Creates an event with no member or collection attached.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            member: None,
            collection: None,
            options: SetOptions::default(),
        }
    }

    /// Attaches the member concerned.
    #[must_use]
    pub fn with_member(mut self, member: MemberRef) -> Self {
        self.member = Some(member);
        self
    }

    /// Attaches the collection concerned.
    #[must_use]
    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collection = Some(collection);
        self
    }

    /// Attaches the options of the originating call.
    #[must_use]
    pub fn with_options(mut self, options: SetOptions) -> Self {
        self.options = options;
        self
    }

    /// The event name listeners subscribe to.
    ///
    /// Per-attribute change events are named `change:<attribute>`.
    pub fn name(&self) -> Cow<'_, str> {
        match &self.kind {
            EventKind::Add => Cow::Borrowed("add"),
            EventKind::Remove { .. } => Cow::Borrowed("remove"),
            EventKind::Sort => Cow::Borrowed("sort"),
            EventKind::Reset { .. } => Cow::Borrowed("reset"),
            EventKind::Invalid { .. } => Cow::Borrowed("invalid"),
            EventKind::Change { attribute: None } => Cow::Borrowed("change"),
            EventKind::Change {
                attribute: Some(attribute),
            } => Cow::Owned(format!("change:{attribute}")),
            EventKind::Destroy => Cow::Borrowed("destroy"),
            EventKind::Custom(name) => Cow::Borrowed(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        assert_eq!(Event::new(EventKind::Add).name(), "add");
        assert_eq!(Event::new(EventKind::Remove { index: 3 }).name(), "remove");
        assert_eq!(
            Event::new(EventKind::Change {
                attribute: Some("name".into())
            })
            .name(),
            "change:name"
        );
        assert_eq!(
            Event::new(EventKind::Change { attribute: None }).name(),
            "change"
        );
        assert_eq!(
            Event::new(EventKind::Custom("select".into())).name(),
            "select"
        );
    }

    #[test]
    fn builder_attaches_options() {
        let event = Event::new(EventKind::Sort).with_options(SetOptions::add().silent(true));
        assert!(event.options.silent);
        assert!(event.member.is_none());
        assert!(event.collection.is_none());
    }
}
