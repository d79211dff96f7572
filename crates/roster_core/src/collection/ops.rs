//! Removal, reset, lookup and explicit sorting.

use super::{Batch, Collection, Input, Lookup, Returned};
use crate::error::{CoreError, CoreResult};
use crate::event::{Event, EventKind};
use crate::model::{MemberRef, Model};
use crate::options::SetOptions;
use roster_value::Value;
use std::mem;
use tracing::{debug, warn};

impl Collection {
    /// Removes the members `input` resolves to.
    pub fn remove(&self, input: impl Into<Batch<Lookup>>) -> Returned {
        self.remove_with(input, &SetOptions::remove())
    }

    /// Removes the members `input` resolves to.
    ///
    /// Each element is resolved like [`get`](Self::get). Every member found
    /// is purged from the indexes, taken out of the sequence and unwired,
    /// then a `remove` event carrying its former position is emitted on
    /// the collection and on the member unless `silent` is set. Elements
    /// that resolve to nothing leave a `None` slot.
    pub fn remove_with(&self, input: impl Into<Batch<Lookup>>, options: &SetOptions) -> Returned {
        let (singular, lookups) = input.into().into_parts();
        let mut slots = Vec::with_capacity(lookups.len());

        for lookup in lookups {
            let detached = {
                let mut state = self.shared.state.write();
                let cid = state.resolve(self.main_index(), &lookup).map(|m| m.cid());
                cid.and_then(|cid| self.detach(&mut state, cid))
            };
            let Some((member, index)) = detached else {
                slots.push(None);
                continue;
            };
            if !options.silent {
                self.notify(&member, EventKind::Remove { index }, options);
            }
            slots.push(Some(member));
        }

        debug!(
            requested = slots.len(),
            removed = slots.iter().flatten().count(),
            "removed members"
        );
        Returned::from_parts(singular, slots)
    }

    /// Replaces every member with `input`, emitting a single `reset` event.
    pub fn reset(&self, input: impl Into<Batch<Input>>) -> Returned {
        self.reset_with(input, &SetOptions::reset())
    }

    /// Replaces every member with `input`.
    ///
    /// Current members are unwired and dropped without `remove` events and
    /// the new members are added silently. Unless `silent` is set, one
    /// `reset` event carrying the previous members follows.
    pub fn reset_with(&self, input: impl Into<Batch<Input>>, options: &SetOptions) -> Returned {
        let previous = self.clear();
        let result = self.set_with(input, &options.clone().silent(true));

        debug!(previous = previous.len(), current = self.len(), "reset collection");
        if !options.silent {
            self.trigger(
                &Event::new(EventKind::Reset { previous })
                    .with_collection(self.clone())
                    .with_options(options.clone()),
            );
        }
        result
    }

    /// Detaches every member without emitting events. Returns them in
    /// collection order.
    fn clear(&self) -> Vec<MemberRef> {
        let mut state = self.shared.state.write();
        let previous = mem::take(&mut state.members);
        for member in &previous {
            self.remove_reference(&mut state, member);
        }
        state.indexes.clear();
        previous
    }

    /// Detaches every member and drops every listener on the collection.
    ///
    /// No events are emitted. The handle stays usable.
    pub fn dispose(&self) {
        let previous = self.clear();
        self.shared.events.clear();
        debug!(released = previous.len(), "disposed collection");
    }

    /// Looks up a member in the main index.
    ///
    /// A member argument resolves by its main-index value, or failing that
    /// by creation identity. Non-indexable keys such as null or empty text
    /// find nothing.
    pub fn get(&self, lookup: impl Into<Lookup>) -> Option<MemberRef> {
        let lookup = lookup.into();
        let state = self.shared.state.read();
        state.resolve(self.main_index(), &lookup).cloned()
    }

    /// Looks up a member in the named index.
    ///
    /// An index that is not maintained finds nothing.
    pub fn get_in(&self, index: &str, lookup: impl Into<Lookup>) -> Option<MemberRef> {
        let lookup = lookup.into();
        let state = self.shared.state.read();
        if !state.indexes.has_index(index) {
            warn!(index, "lookup in unknown index");
            return None;
        }
        state.resolve(index, &lookup).cloned()
    }

    /// The member at `position`.
    pub fn at(&self, position: usize) -> Option<MemberRef> {
        self.shared.state.read().members.get(position).cloned()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.shared.state.read().members.len()
    }

    /// Returns true if there are no members.
    pub fn is_empty(&self) -> bool {
        self.shared.state.read().members.is_empty()
    }

    /// Sorts the members with the configured comparator and emits `sort`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingComparator`] if none is configured.
    pub fn sort(&self) -> CoreResult<()> {
        self.sort_with(&SetOptions::default())
    }

    /// Sorts the members, emitting `sort` unless `silent` is set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingComparator`] if none is configured.
    pub fn sort_with(&self, options: &SetOptions) -> CoreResult<()> {
        let comparator = self
            .shared
            .config
            .comparator
            .as_ref()
            .ok_or(CoreError::MissingComparator)?;
        comparator.sort(&mut self.shared.state.write().members);

        if !options.silent {
            self.trigger(
                &Event::new(EventKind::Sort)
                    .with_collection(self.clone())
                    .with_options(options.clone()),
            );
        }
        Ok(())
    }
}

impl super::State {
    /// Resolves a lookup in the index `name`.
    fn resolve(&self, name: &str, lookup: &Lookup) -> Option<&MemberRef> {
        match lookup {
            Lookup::Key(key) if key.is_indexable() => self.indexes.lookup_in(name, key),
            Lookup::Key(_) => None,
            Lookup::Member(member) => member
                .get(name)
                .filter(Value::is_indexable)
                .and_then(|key| self.indexes.lookup_in(name, &key))
                .or_else(|| self.indexes.by_cid(member.cid())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CollectionConfig;
    use crate::error::CoreError;
    use crate::model::{MemberRef, Model, Record};
    use crate::{Collection, Event, EventKind, SetOptions, Value};
    use parking_lot::Mutex;
    use roster_value::attrs;
    use std::sync::Arc;

    fn seeded(config: CollectionConfig) -> Collection {
        Collection::with_members(
            config,
            vec![
                attrs! { "id" => 1, "name" => "moe", "username" => "moe" },
                attrs! { "id" => 2, "name" => "curly", "username" => "curly" },
                attrs! { "id" => 3, "name" => "larry", "username" => "larry" },
            ],
        )
        .unwrap()
    }

    #[test]
    fn get_by_key_and_member() {
        let collection = seeded(CollectionConfig::new());
        let curly = collection.get(2i64).unwrap();

        assert_eq!(curly.get("name"), Some(Value::from("curly")));
        assert_eq!(collection.get(&curly).unwrap().cid(), curly.cid());
        assert!(collection.get(9i64).is_none());
        assert!(collection.get(Value::Null).is_none());
        assert!(collection.get("").is_none());
    }

    #[test]
    fn get_in_secondary_index() {
        let collection = seeded(CollectionConfig::new().index("username"));
        let larry = collection.get_in("username", "larry").unwrap();
        assert_eq!(larry.get("id"), Some(Value::from(3)));
        assert!(collection.get_in("email", "larry").is_none());
    }

    #[test]
    fn at_follows_order() {
        let collection = seeded(CollectionConfig::new());
        assert_eq!(collection.at(0).unwrap().get("id"), Some(Value::from(1)));
        assert_eq!(collection.at(2).unwrap().get("id"), Some(Value::from(3)));
        assert!(collection.at(3).is_none());
    }

    #[test]
    fn remove_reports_former_position() {
        let collection = seeded(CollectionConfig::new());
        let positions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&positions);
        collection.on("remove", move |event: &Event| {
            if let EventKind::Remove { index } = event.kind {
                sink.lock().push(index);
            }
        });

        let removed = collection.remove(vec![3i64, 1]);

        assert_eq!(removed.members().len(), 2);
        assert_eq!(*positions.lock(), vec![2, 0]);
        assert_eq!(collection.len(), 1);
        assert!(collection.get(1i64).is_none());
    }

    #[test]
    fn remove_keeps_slot_for_unresolved() {
        let collection = seeded(CollectionConfig::new());
        let slots = collection.remove(vec![9i64, 2]).many();
        assert!(slots[0].is_none());
        assert!(slots[1].is_some());
        assert!(collection.remove(9i64).one().is_none());
    }

    #[test]
    fn remove_notifies_member() {
        let collection = seeded(CollectionConfig::new());
        let moe = collection.get(1i64).unwrap();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        moe.events()
            .unwrap()
            .on("remove", move |_: &Event| *sink.lock() += 1);

        collection.remove(&moe);

        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn reset_emits_one_event() {
        let collection = seeded(CollectionConfig::new());
        let old = collection.get(1i64).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        collection.on("all", move |event: &Event| {
            let previous = match &event.kind {
                EventKind::Reset { previous } => previous.len(),
                _ => 0,
            };
            sink.lock().push((event.name().into_owned(), previous));
        });

        collection.reset(vec![attrs! { "id" => 7 }, attrs! { "id" => 8 }]);

        assert_eq!(*log.lock(), vec![("reset".to_string(), 3)]);
        assert_eq!(collection.len(), 2);
        assert!(collection.get(1i64).is_none());
        assert!(old.collection().is_none());
    }

    #[test]
    fn silent_reset_emits_nothing() {
        let collection = seeded(CollectionConfig::new());
        let log = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&log);
        collection.on("all", move |_: &Event| *sink.lock() += 1);

        collection.reset_with(Vec::<MemberRef>::new(), &SetOptions::reset().silent(true));

        assert_eq!(*log.lock(), 0);
        assert!(collection.is_empty());
    }

    #[test]
    fn sort_requires_comparator() {
        let collection = seeded(CollectionConfig::new());
        assert!(matches!(collection.sort(), Err(CoreError::MissingComparator)));
    }

    #[test]
    fn explicit_sort_after_external_change() {
        let collection = seeded(CollectionConfig::new().comparator("name"));
        let moe = collection.get(1i64).unwrap();
        moe.set(&attrs! { "name" => "aaron" }, &SetOptions::default())
            .unwrap();
        let sorted = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&sorted);
        collection.on("sort", move |_: &Event| *sink.lock() += 1);

        collection.sort().unwrap();

        assert_eq!(collection.at(0).unwrap().cid(), moe.cid());
        assert_eq!(*sorted.lock(), 1);
    }

    #[test]
    fn dispose_detaches_everything() {
        let collection = seeded(CollectionConfig::new());
        let moe = collection.get(1i64).unwrap();
        collection.on("all", |_: &Event| {});

        collection.dispose();

        assert!(collection.is_empty());
        assert!(moe.collection().is_none());
        assert_eq!(collection.events().listener_count(), 0);
        assert_eq!(moe.events().map(|e| e.listener_count()), Some(0));
    }

    #[test]
    fn anonymous_member_removed_by_reference() {
        let collection = Collection::new(CollectionConfig::new()).unwrap();
        let anonymous: MemberRef = Record::new(attrs! { "name" => "shemp" });
        collection.add(Arc::clone(&anonymous));

        assert!(collection.remove(&anonymous).one().is_some());
        assert!(collection.is_empty());
    }
}
