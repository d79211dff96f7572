//! End-to-end collection scenarios.

use parking_lot::RwLock;
use roster_core::{
    Attributes, Cid, Collection, CollectionConfig, Comparator, Event, EventKind, Input, MemberRef,
    Model, ModelFactory, Owner, Record, SetOptions, ValidationError, Value,
};
use roster_testkit::prelude::*;
use roster_value::attrs;
use std::sync::Arc;

/// A minimal member type with no event stream of its own.
struct Stooge {
    cid: Cid,
    attributes: RwLock<Attributes>,
    changed: RwLock<Vec<String>>,
    owner: Owner,
}

impl Stooge {
    fn new(attributes: Attributes) -> Arc<Self> {
        Arc::new(Self {
            cid: Cid::new(),
            attributes: RwLock::new(attributes),
            changed: RwLock::new(Vec::new()),
            owner: Owner::new(),
        })
    }
}

impl Model for Stooge {
    fn cid(&self) -> Cid {
        self.cid
    }

    fn get(&self, attribute: &str) -> Option<Value> {
        self.attributes.read().get(attribute).cloned()
    }

    fn attributes(&self) -> Attributes {
        self.attributes.read().clone()
    }

    fn set(&self, attributes: &Attributes, _options: &SetOptions) -> Result<(), ValidationError> {
        *self.changed.write() = self.attributes.write().merge(attributes);
        Ok(())
    }

    fn has_changed(&self, attribute: Option<&str>) -> bool {
        let changed = self.changed.read();
        attribute.map_or(!changed.is_empty(), |a| changed.iter().any(|c| c == a))
    }

    fn previous(&self, _attribute: &str) -> Option<Value> {
        None
    }

    fn owner(&self) -> &Owner {
        &self.owner
    }
}

struct StoogeFactory;

impl ModelFactory for StoogeFactory {
    fn build(
        &self,
        attributes: Attributes,
        _collection: &Collection,
        _options: &SetOptions,
    ) -> Option<MemberRef> {
        Some(Stooge::new(attributes))
    }
}

#[test]
fn basics() {
    init_tracing();
    let collection = Collection::new(CollectionConfig::new()).unwrap();
    let added = collection.add(attrs! { "hi" => "there" }).one().unwrap();

    assert_eq!(collection.len(), 1);
    assert_eq!(collection.at(0).unwrap().cid(), added.cid());
    assert_eq!(added.get("hi"), Some(Value::from("there")));
}

#[test]
fn id_index_by_default() {
    let collection = Collection::new(CollectionConfig::new()).unwrap();
    let added = collection
        .add(vec![attrs! { "id" => "47" }, attrs! { "id" => "48" }])
        .members();

    assert_eq!(collection.get("47").unwrap().cid(), added[0].cid());
    assert_eq!(collection.get("48").unwrap().cid(), added[1].cid());
}

#[test]
fn optional_secondary_indexes() {
    let collection = Collection::new(CollectionConfig::new().index("username")).unwrap();
    collection.add(vec![
        attrs! { "id" => 1, "username" => "larry" },
        attrs! { "id" => 2, "username" => "curly" },
        attrs! { "id" => 3, "username" => "moe" },
    ]);

    for (id, username) in [(1, "larry"), (2, "curly"), (3, "moe")] {
        let by_id = collection.get(id as i64).unwrap();
        let by_username = collection.get_in("username", username).unwrap();
        assert_eq!(by_id.cid(), by_username.cid());
    }
}

#[test]
fn model_constructors() {
    let collection = Collection::new(CollectionConfig::new().model(StoogeFactory)).unwrap();
    let built: MemberRef = Stooge::new(attrs! { "name" => "moe" });

    let added = collection
        .add(vec![
            Input::from(attrs! { "name" => "moe" }),
            Input::from(Arc::clone(&built)),
        ])
        .members();

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.at(1).unwrap().cid(), built.cid());
    assert_ne!(added[0].cid(), built.cid());
    assert!(added[0].events().is_none());
    assert!(added[0].collection().unwrap().ptr_eq(&collection));

    collection.remove(&built);
    assert_eq!(collection.len(), 1);
    assert!(built.collection().is_none());
}

#[test]
fn custom_model_merges_and_resorts() {
    let collection = Collection::new(
        CollectionConfig::new()
            .model(StoogeFactory)
            .comparator("name"),
    )
    .unwrap();
    collection.add(stooges());
    assert_eq!(names(&collection), vec!["curly", "larry", "moe"]);

    collection.set_with(
        attrs! { "id" => 1, "name" => "aaron" },
        &SetOptions::set().with_remove(false),
    );

    assert_eq!(names(&collection), vec!["aaron", "curly", "larry"]);
}

#[test]
fn custom_model_merge_refiles_indexes() {
    let collection = Collection::new(
        CollectionConfig::new()
            .model(StoogeFactory)
            .index("username"),
    )
    .unwrap();
    collection.add(stooges());

    collection.set_with(
        attrs! { "id" => 1, "username" => "moses" },
        &SetOptions::set().with_remove(false),
    );

    assert!(collection.get_in("username", "moe").is_none());
    let moses = collection.get_in("username", "moses").unwrap();
    assert_eq!(id_of(&moses), 1);
    assert_eq!(collection.get_in("username", "curly").map(|m| id_of(&m)), Some(2));
}

#[test]
fn silent_set_keeps_secondary_index_exact() {
    let collection = Collection::new(CollectionConfig::new().index("username")).unwrap();
    collection.add(attrs! { "id" => 1, "username" => "moe" });

    collection.set_with(
        vec![attrs! { "id" => 1, "username" => "moses" }],
        &SetOptions::set().silent(true),
    );

    assert!(collection.get_in("username", "moe").is_none());
    assert_eq!(collection.get_in("username", "moses").map(|m| id_of(&m)), Some(1));
}

#[test]
fn add_events() {
    let collection = Collection::new(CollectionConfig::new()).unwrap();
    let moe = Record::new(attrs! { "name" => "moe" });
    let log = EventLog::attach(&collection);
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let sink = Arc::clone(&seen);
    collection.on("add", move |event: &Event| {
        *sink.lock() = Some((
            event.member.as_ref().map(|m| m.cid()),
            event.collection.is_some(),
        ));
    });

    collection.add(Arc::clone(&moe));

    assert_eq!(*seen.lock(), Some((Some(moe.cid()), true)));
    assert_eq!(log.names(), vec!["add"]);
}

#[test]
fn remove_events_for_members_with_only_a_cid() {
    let collection = Collection::new(CollectionConfig::new()).unwrap();
    let moe: MemberRef = Record::new(attrs! { "name" => "moe" });
    collection.add(Arc::clone(&moe));
    let log = EventLog::attach(&collection);

    collection.remove(&moe);

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "remove");
    assert_eq!(entries[0].index, Some(0));
    assert!(collection.is_empty());
}

#[test]
fn comparator_as_attribute() {
    let collection = Collection::new(CollectionConfig::new().comparator("name")).unwrap();
    collection.add(stooges());
    assert_eq!(names(&collection), vec!["curly", "larry", "moe"]);
}

#[test]
fn comparator_as_key_extractor() {
    let collection = Collection::new(
        CollectionConfig::new().comparator(Comparator::key(|m| m.get("name").unwrap_or_default())),
    )
    .unwrap();
    collection.add(stooges());
    assert_eq!(names(&collection), vec!["curly", "larry", "moe"]);
}

#[test]
fn comparator_as_two_way_compare() {
    let collection = Collection::new(CollectionConfig::new().comparator(Comparator::compare(
        |a, b| a.get("name").cmp(&b.get("name")),
    )))
    .unwrap();
    collection.add(stooges());
    assert_eq!(names(&collection), vec!["curly", "larry", "moe"]);
}

#[test]
fn parent_reference_is_kept() {
    let parent = Arc::new(String::from("stooge club"));
    let collection =
        Collection::new(CollectionConfig::new().parent(Arc::clone(&parent))).unwrap();
    let stored = collection.parent_as::<String>().unwrap();
    assert!(Arc::ptr_eq(&stored, &parent));
}

#[test]
fn set_works_for_simple_objects() {
    let collection = Collection::new(CollectionConfig::new()).unwrap();
    collection.set(vec![attrs! { "id" => "thing" }, attrs! { "id" => "other" }]);
    assert_eq!(collection.len(), 2);

    collection.set(vec![attrs! { "id" => "thing", "other" => "property" }]);

    assert_eq!(collection.len(), 1);
    let first = collection.at(0).unwrap();
    assert_eq!(first.get("id"), Some(Value::from("thing")));
    assert_eq!(first.get("other"), Some(Value::from("property")));
}

#[test]
fn order_preserved_without_comparator() {
    let collection = Collection::new(CollectionConfig::new()).unwrap();
    collection.add(vec![
        attrs! { "id" => 30, "name" => "a" },
        attrs! { "id" => 10, "name" => "b" },
        attrs! { "id" => 20, "name" => "c" },
    ]);
    assert_eq!(names(&collection), vec!["a", "b", "c"]);
}

#[test]
fn set_reconciliation_removes_unlisted() {
    let collection = stooge_collection(CollectionConfig::new());
    let log = EventLog::attach(&collection);

    collection.set(vec![attrs! { "id" => 1 }, attrs! { "id" => 2 }]);

    assert_eq!(collection.len(), 2);
    assert!(collection.get(3i64).is_none());
    assert_eq!(log.count("remove"), 1);
    assert_eq!(log.count("add"), 0);
}

#[test]
fn reset_fires_exactly_one_event() {
    let collection = stooge_collection(CollectionConfig::new());
    let log = EventLog::attach(&collection);

    collection.reset(vec![
        attrs! { "id" => 7 },
        attrs! { "id" => 8 },
        attrs! { "id" => 9 },
        attrs! { "id" => 10 },
    ]);

    assert_eq!(log.names(), vec!["reset"]);
    assert_eq!(collection.len(), 4);
}

#[test]
fn reentrant_removal_during_add() {
    let collection = stooge_collection(CollectionConfig::new().index("username"));
    let handle = collection.clone();
    collection.once("add", move |_event: &Event| {
        handle.remove(2i64);
    });

    collection.add(vec![attrs! { "id" => 4, "username" => "shemp" }, attrs! { "id" => 5, "username" => "joe" }]);

    assert_eq!(ids(&collection), vec![1, 3, 4, 5]);
    assert!(collection.get(2i64).is_none());
    assert!(collection.get_in("username", "curly").is_none());
    assert_eq!(collection.get_in("username", "joe").map(|m| id_of(&m)), Some(5));
    let mut visited = 0;
    for member in &collection {
        assert!(collection.contains(&member));
        visited += 1;
    }
    assert_eq!(visited, collection.len());
}

#[test]
fn reentrant_add_during_remove() {
    let collection = stooge_collection(CollectionConfig::new().comparator("name"));
    let handle = collection.clone();
    collection.once("remove", move |_event: &Event| {
        handle.add(attrs! { "id" => 4, "name" => "shemp" });
    });

    collection.remove(1i64);

    assert_eq!(names(&collection), vec!["curly", "larry", "shemp"]);
}

#[test]
fn validation_gate() {
    let collection =
        Collection::new(CollectionConfig::new().model(rejecting_factory("always"))).unwrap();
    let log = EventLog::attach(&collection);

    let result = collection.add_with(attrs! { "id" => 1 }, &SetOptions::add().validate(true));

    assert!(result.one().is_none());
    assert!(collection.is_empty());
    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "invalid");
    assert_eq!(entries[0].error, Some(ValidationError::new("always")));
}

#[test]
fn invalid_is_emitted_even_when_silent() {
    let collection =
        Collection::new(CollectionConfig::new().model(rejecting_factory("always"))).unwrap();
    let log = EventLog::attach(&collection);

    collection.add_with(
        attrs! { "id" => 1 },
        &SetOptions::add().validate(true).silent(true),
    );

    assert_eq!(log.names(), vec!["invalid"]);
}

#[test]
fn channel_subscribers_see_events() {
    let collection = Collection::new(CollectionConfig::new()).unwrap();
    let rx = collection.subscribe();

    collection.add(stooges());

    let names: Vec<String> = rx.try_iter().map(|e| e.name().into_owned()).collect();
    assert_eq!(names, vec!["add", "add", "add"]);
}

#[test]
fn member_in_two_collections() {
    let first = Collection::new(CollectionConfig::new()).unwrap();
    let second = Collection::new(CollectionConfig::new()).unwrap();
    let moe = Record::new(attrs! { "id" => 1, "name" => "moe" });
    first.add(Arc::clone(&moe));
    second.add(Arc::clone(&moe));
    let first_log = EventLog::attach(&first);
    let second_log = EventLog::attach(&second);

    second.remove(1i64);
    moe.set(&attrs! { "name" => "moses" }, &SetOptions::default())
        .unwrap();

    assert_eq!(first_log.names(), vec!["change:name", "change"]);
    assert_eq!(second_log.names(), vec!["remove"]);
}

#[test]
fn remove_event_carries_kind_index() {
    let collection = stooge_collection(CollectionConfig::new());
    let rx = collection.subscribe();

    collection.remove(3i64);

    let event = rx.try_recv().unwrap();
    assert!(matches!(event.kind, EventKind::Remove { index: 2 }));
}

#[test]
fn set_from_json_document() {
    let collection = stooge_collection(CollectionConfig::new());
    let document = serde_json::json!([
        {"id": 2, "name": "curly"},
        {"id": 4, "name": "shemp"}
    ]);

    collection.set(roster_core::Batch::from_json(document).unwrap());

    assert_eq!(ids(&collection), vec![2, 4]);
    assert_eq!(names(&collection), vec!["curly", "shemp"]);
}
