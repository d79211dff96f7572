//! A single named lookup index.

use crate::model::MemberRef;
use crate::types::Cid;
use roster_value::Value;
use std::collections::HashMap;

/// Hash index from attribute value to the one member holding it.
///
/// `MemberIndex` is the duplicate-suppression mechanism: it stores at most
/// one member per key. It also remembers which key each member is filed
/// under, so a member can be purged even after its attribute changed
/// without the index being told.
pub struct MemberIndex {
    /// Attribute this index is keyed by.
    attribute: String,
    /// Key to member mapping.
    entries: HashMap<Value, MemberRef>,
    /// Member to key mapping.
    keys: HashMap<Cid, Value>,
}

impl MemberIndex {
    /// Creates an empty index over `attribute`.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            entries: HashMap::new(),
            keys: HashMap::new(),
        }
    }

    /// The indexed attribute.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Files `member` under its current value of the indexed attribute.
    ///
    /// A member already filed under another key is moved. A member that
    /// previously held the key is displaced. Non-indexable values leave
    /// the member unfiled. Returns true if the member is now filed.
    pub fn insert(&mut self, member: &MemberRef) -> bool {
        let cid = member.cid();
        self.remove(cid);

        let Some(key) = member
            .get(&self.attribute)
            .filter(Value::is_indexable)
        else {
            return false;
        };

        if let Some(displaced) = self.entries.insert(key.clone(), MemberRef::clone(member)) {
            self.keys.remove(&displaced.cid());
        }
        self.keys.insert(cid, key);
        true
    }

    /// Purges the member with `cid`. Returns true if it was filed.
    pub fn remove(&mut self, cid: Cid) -> bool {
        match self.keys.remove(&cid) {
            Some(key) => {
                self.entries.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Looks up the member filed under `key`.
    pub fn lookup(&self, key: &Value) -> Option<&MemberRef> {
        self.entries.get(key)
    }

    /// The key `cid` is filed under.
    pub fn key_of(&self, cid: Cid) -> Option<&Value> {
        self.keys.get(&cid)
    }

    /// Checks if the index contains a key.
    pub fn contains(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears the index.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}
