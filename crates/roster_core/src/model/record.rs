//! Built-in attribute-bag member.

use super::{MemberRef, Model, ModelFactory, Owner, DEFAULT_ID_ATTRIBUTE};
use crate::collection::Collection;
use crate::error::ValidationError;
use crate::event::{Event, EventKind, Events};
use crate::options::SetOptions;
use crate::types::Cid;
use parking_lot::RwLock;
use roster_value::{Attributes, Value};
use std::sync::{Arc, Weak};

/// Validates attributes as they would be after a `set`.
pub type Validator = Arc<dyn Fn(&Attributes) -> Result<(), ValidationError> + Send + Sync>;

/// Derives an identifying value from raw attributes.
pub type IdGenerator = Arc<dyn Fn(&Attributes) -> Option<Value> + Send + Sync>;

struct RecordState {
    attributes: Attributes,
    previous: Attributes,
    changed: Vec<String>,
}

/// A member backed by a plain attribute map.
///
/// `Record` tracks the previous attribute snapshot and the keys changed by
/// the last `set`, and announces changes on its own event stream as one
/// `change:<attr>` per changed attribute followed by a single `change`.
///
/// # Example
///
/// ```rust,ignore
/// let moe = Record::new(attrs! { "id" => 1, "name" => "moe" });
/// moe.set(&attrs! { "name" => "moses" }, &SetOptions::default())?;
/// assert!(moe.has_changed(Some("name")));
/// ```
pub struct Record {
    cid: Cid,
    id_attribute: String,
    state: RwLock<RecordState>,
    validator: Option<Validator>,
    owner: Owner,
    events: Events,
    this: Weak<Record>,
}

impl Record {
    /// Creates a record identified by the `id` attribute.
    pub fn new(attributes: Attributes) -> Arc<Self> {
        Self::with_parts(attributes, DEFAULT_ID_ATTRIBUTE.to_string(), None)
    }

    fn with_parts(
        attributes: Attributes,
        id_attribute: String,
        validator: Option<Validator>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            cid: Cid::new(),
            id_attribute,
            state: RwLock::new(RecordState {
                previous: attributes.clone(),
                attributes,
                changed: Vec::new(),
            }),
            validator,
            owner: Owner::new(),
            events: Events::new(),
            this: this.clone(),
        })
    }

    /// This record as a member reference.
    pub fn member(&self) -> Option<MemberRef> {
        self.this.upgrade().map(|record| record as MemberRef)
    }

    /// Attribute names changed by the last `set`.
    pub fn changed(&self) -> Vec<String> {
        self.state.read().changed.clone()
    }

    /// Announces that this record is gone.
    ///
    /// A collection holding the record removes it when it sees the
    /// `destroy` event.
    pub fn destroy(&self) {
        self.emit(EventKind::Destroy, SetOptions::default());
    }

    /// Triggers a custom event on this record's stream.
    pub fn trigger(&self, name: impl Into<String>) {
        self.emit(EventKind::Custom(name.into()), SetOptions::default());
    }

    fn emit(&self, kind: EventKind, options: SetOptions) {
        let mut event = Event::new(kind).with_options(options);
        event.member = self.member();
        event.collection = self.owner.collection();
        self.events.trigger(&event);
    }
}

impl Model for Record {
    fn cid(&self) -> Cid {
        self.cid
    }

    fn get(&self, attribute: &str) -> Option<Value> {
        self.state.read().attributes.get(attribute).cloned()
    }

    fn attributes(&self) -> Attributes {
        self.state.read().attributes.clone()
    }

    fn set(&self, attributes: &Attributes, options: &SetOptions) -> Result<(), ValidationError> {
        if options.validate {
            let mut preview = self.attributes();
            preview.merge(attributes);
            self.validate(&preview)?;
        }

        let changed = {
            let mut state = self.state.write();
            let before = state.attributes.clone();
            let changed = state.attributes.merge(attributes);
            if !changed.is_empty() {
                state.previous = before;
            }
            state.changed = changed.clone();
            changed
        };

        if !options.silent && !changed.is_empty() {
            for attribute in changed {
                self.emit(
                    EventKind::Change {
                        attribute: Some(attribute),
                    },
                    options.clone(),
                );
            }
            self.emit(EventKind::Change { attribute: None }, options.clone());
        }
        Ok(())
    }

    fn has_changed(&self, attribute: Option<&str>) -> bool {
        let state = self.state.read();
        match attribute {
            Some(attribute) => state.changed.iter().any(|c| c == attribute),
            None => !state.changed.is_empty(),
        }
    }

    fn previous(&self, attribute: &str) -> Option<Value> {
        self.state.read().previous.get(attribute).cloned()
    }

    fn owner(&self) -> &Owner {
        &self.owner
    }

    fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    fn validate(&self, attributes: &Attributes) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator(attributes),
            None => Ok(()),
        }
    }

    fn events(&self) -> Option<&Events> {
        Some(&self.events)
    }
}

/// Builds [`Record`] members with a configurable identifying attribute,
/// validator and id generator.
#[derive(Clone, Default)]
pub struct RecordFactory {
    id_attribute: Option<String>,
    validator: Option<Validator>,
    id_generator: Option<IdGenerator>,
}

impl RecordFactory {
    /// Creates a factory producing plain `id`-keyed records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identifying attribute of built records.
    #[must_use]
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = Some(name.into());
        self
    }

    /// Sets the validator of built records.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Attributes) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Sets the id generation hook.
    ///
    /// A generated id is written into the identifying attribute of built
    /// records that do not carry one, so later lookups find them.
    #[must_use]
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Attributes) -> Option<Value> + Send + Sync + 'static,
    {
        self.id_generator = Some(Arc::new(generator));
        self
    }
}

impl ModelFactory for RecordFactory {
    fn id_attribute(&self) -> &str {
        self.id_attribute.as_deref().unwrap_or(DEFAULT_ID_ATTRIBUTE)
    }

    fn generate_id(&self, attributes: &Attributes) -> Option<Value> {
        self.id_generator
            .as_ref()
            .and_then(|generator| generator(attributes))
    }

    fn build(
        &self,
        mut attributes: Attributes,
        _collection: &Collection,
        _options: &SetOptions,
    ) -> Option<MemberRef> {
        let id_attribute = self.id_attribute().to_string();
        if !attributes.contains_key(&id_attribute) {
            if let Some(id) = self.generate_id(&attributes) {
                attributes.insert(id_attribute.clone(), id);
            }
        }
        let record: MemberRef = Record::with_parts(attributes, id_attribute, self.validator.clone());
        Some(record)
    }
}

impl std::fmt::Debug for RecordFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordFactory")
            .field("id_attribute", &self.id_attribute())
            .field("validator", &self.validator.is_some())
            .field("id_generator", &self.id_generator.is_some())
            .finish()
    }
}
