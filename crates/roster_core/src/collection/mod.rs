//! Ordered, indexed, observable collections of members.
//!
//! A [`Collection`] keeps an ordered sequence of members together with the
//! named indexes configured for it, and announces every observable change
//! on its own event stream.
//!
//! All mutation goes through one reconciliation engine, [`Collection::set`]:
//! `add`, `remove` and `reset` are thin front doors onto it. A call runs in
//! three phases:
//!
//! 1. **Stage**: inputs are resolved against the live indexes, existing
//!    members are merged and new members are built, without holding the
//!    state lock
//! 2. **Commit**: removals, insertions and the re-sort are applied to the
//!    sequence and indexes in a single locked section
//! 3. **Announce**: events are emitted with no lock held
//!
//! Handlers may therefore call back into the collection; they always
//! observe a fully committed state.
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_core::{Collection, CollectionConfig};
//! use roster_value::attrs;
//!
//! let stooges = Collection::new(CollectionConfig::new().comparator("name"))?;
//! stooges.add(vec![
//!     attrs! { "id" => 1, "name" => "moe" },
//!     attrs! { "id" => 2, "name" => "curly" },
//! ]);
//! assert_eq!(stooges.at(0).unwrap().get("name"), Some("curly".into()));
//! ```

mod input;
mod ops;
mod reconcile;
mod reference;
mod traverse;

pub use input::{Batch, Input, Lookup, Returned};

use crate::config::CollectionConfig;
use crate::error::CoreResult;
use crate::event::{Event, Events};
use crate::index::IndexRegistry;
use crate::model::{MemberRef, Model};
use crate::options::SetOptions;
use crate::types::{Cid, ListenerId};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Weak};

/// A shared handle to an ordered collection of members.
///
/// Cloning the handle is cheap; every clone refers to the same collection.
#[derive(Clone)]
pub struct Collection {
    shared: Arc<Shared>,
}

/// A non-owning handle to a collection.
#[derive(Clone)]
pub struct WeakCollection {
    shared: Weak<Shared>,
}

struct Shared {
    config: CollectionConfig,
    state: RwLock<State>,
    events: Events,
}

/// Mutable state guarded by the collection lock.
struct State {
    /// Members in collection order.
    members: Vec<MemberRef>,
    /// Named indexes and the registered member set.
    indexes: IndexRegistry,
    /// Bridge listener registered on each member's stream.
    wiring: HashMap<Cid, ListenerId>,
}

impl Collection {
    /// Creates an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration names an empty or reserved
    /// index.
    pub fn new(config: CollectionConfig) -> CoreResult<Self> {
        config.validate()?;
        let indexes = IndexRegistry::new(config.index_names());
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: RwLock::new(State {
                    members: Vec::new(),
                    indexes,
                    wiring: HashMap::new(),
                }),
                events: Events::new(),
            }),
        })
    }

    /// Creates a collection seeded with `members`, without emitting events.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_members(
        config: CollectionConfig,
        members: impl Into<Batch<Input>>,
    ) -> CoreResult<Self> {
        let collection = Self::new(config)?;
        collection.reset_with(members, &SetOptions::reset().silent(true));
        Ok(collection)
    }

    /// The configuration this collection was created with.
    pub fn config(&self) -> &CollectionConfig {
        &self.shared.config
    }

    /// Name of the main index.
    pub fn main_index(&self) -> &str {
        self.shared.config.main_index_name()
    }

    /// The opaque parent handle, if one was configured.
    pub fn parent(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.shared.config.parent.clone()
    }

    /// The parent handle, if one was configured with type `P`.
    pub fn parent_as<P: Any + Send + Sync>(&self) -> Option<Arc<P>> {
        self.parent().and_then(|parent| parent.downcast::<P>().ok())
    }

    /// The collection's event stream.
    pub fn events(&self) -> &Events {
        &self.shared.events
    }

    /// Registers a handler on the collection's stream.
    pub fn on<F>(&self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.shared.events.on(name, handler)
    }

    /// Registers a handler for the next matching event only.
    pub fn once<F>(&self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.shared.events.once(name, handler)
    }

    /// Removes a handler.
    pub fn off(&self, id: ListenerId) -> bool {
        self.shared.events.off(id)
    }

    /// Emits `event` on the collection's stream.
    pub fn trigger(&self, event: &Event) {
        self.shared.events.trigger(event);
    }

    /// Subscribes a channel to the collection's stream.
    pub fn subscribe(&self) -> Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// Creates a non-owning handle.
    pub fn downgrade(&self) -> WeakCollection {
        WeakCollection {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns true if both handles refer to the same collection.
    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl WeakCollection {
    /// Returns a handle if the collection is still alive.
    pub fn upgrade(&self) -> Option<Collection> {
        self.shared.upgrade().map(|shared| Collection { shared })
    }

    /// Returns true if this handle refers to `collection`.
    pub fn points_to(&self, collection: &Collection) -> bool {
        Weak::as_ptr(&self.shared) == Arc::as_ptr(&collection.shared)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("main_index", &self.main_index())
            .field("len", &self.len())
            .finish()
    }
}

impl fmt::Debug for WeakCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCollection")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for member in &state.members {
            if let (Some(id), Some(events)) = (state.wiring.get(&member.cid()), member.events()) {
                events.off(*id);
            }
        }
    }
}
