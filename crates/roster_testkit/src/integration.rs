//! Model-checking harness for collections.
//!
//! [`CollectionHarness`] applies operations to a real collection and to a
//! plain shadow list describing what the collection should contain, then
//! checks that the two agree.

use crate::fixtures::ids;
use crate::generators::{CollectionOperation, ID_RANGE};
use roster_core::{Collection, CollectionConfig, Model, SetOptions};
use roster_value::{Attributes, Value};

/// A collection paired with its expected contents.
///
/// The harness expects a collection without comparator whose members all
/// carry an integer `id`, and an index on `username`.
pub struct CollectionHarness {
    /// The collection under test.
    pub collection: Collection,
    /// Expected members, in expected order.
    shadow: Vec<(i64, Attributes)>,
}

impl CollectionHarness {
    /// Creates a harness over an empty collection indexed by `username`.
    pub fn new() -> Self {
        Self {
            collection: Collection::new(CollectionConfig::new().index("username"))
                .expect("Failed to create collection"),
            shadow: Vec::new(),
        }
    }

    /// Applies `operation` to the collection and to the shadow.
    pub fn apply(&mut self, operation: &CollectionOperation) {
        match operation {
            CollectionOperation::Add(batch) => {
                self.collection.add(batch.clone());
                self.shadow_add(batch);
            }
            CollectionOperation::Set(batch) => {
                self.collection.set(batch.clone());
                self.shadow_set(batch);
            }
            CollectionOperation::Remove(keys) => {
                self.collection.remove(keys.clone());
                self.shadow.retain(|(id, _)| !keys.contains(id));
            }
            CollectionOperation::Reset(batch) => {
                self.collection
                    .reset_with(batch.clone(), &SetOptions::reset());
                self.shadow.clear();
                self.shadow_add(batch);
            }
        }
    }

    fn shadow_add(&mut self, batch: &[Attributes]) {
        for attributes in batch {
            let id = shadow_id(attributes);
            if !self.shadow.iter().any(|(existing, _)| *existing == id) {
                self.shadow.push((id, attributes.clone()));
            }
        }
    }

    fn shadow_set(&mut self, batch: &[Attributes]) {
        let mut next: Vec<(i64, Attributes)> = Vec::new();
        for attributes in batch {
            let id = shadow_id(attributes);
            if let Some((_, merged)) = next.iter_mut().find(|(existing, _)| *existing == id) {
                merged.merge(attributes);
                continue;
            }
            let mut current = self
                .shadow
                .iter()
                .find(|(existing, _)| *existing == id)
                .map(|(_, attrs)| attrs.clone())
                .unwrap_or_default();
            current.merge(attributes);
            next.push((id, current));
        }
        self.shadow = next;
    }

    /// Expected ids in expected order.
    pub fn expected_ids(&self) -> Vec<i64> {
        self.shadow.iter().map(|(id, _)| *id).collect()
    }

    /// Checks that the collection matches the shadow and that every index
    /// is exact.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first mismatch.
    pub fn verify(&self) {
        assert_eq!(ids(&self.collection), self.expected_ids(), "member order");

        for (id, attributes) in &self.shadow {
            let member = self
                .collection
                .get(*id)
                .unwrap_or_else(|| panic!("id {id} missing from main index"));
            assert_eq!(&member.attributes(), attributes, "attributes of {id}");
        }

        // Usernames may collide, so a value can be unfiled; never stale.
        for member in self.collection.iter() {
            let Some(username) = member.get("username") else {
                continue;
            };
            if let Some(filed) = self.collection.get_in("username", username.clone()) {
                assert_eq!(filed.get("username"), Some(username));
                assert!(self.collection.contains(&filed), "stale username entry");
            }
        }

        let expected = self.expected_ids();
        for missing in (0..ID_RANGE).filter(|id| !expected.contains(id)) {
            assert!(
                self.collection.get(missing).is_none(),
                "removed id {missing} still indexed"
            );
        }
        assert_eq!(self.collection.len(), self.shadow.len());
    }
}

impl Default for CollectionHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn shadow_id(attributes: &Attributes) -> i64 {
    attributes
        .get("id")
        .and_then(Value::as_integer)
        .expect("Harness members need an integer id")
}
