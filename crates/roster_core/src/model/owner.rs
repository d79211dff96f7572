//! Back-reference from a member to the collection holding it.

use crate::collection::{Collection, WeakCollection};
use parking_lot::RwLock;

/// Weak back-reference slot embedded in every member.
///
/// The first collection to add a member claims the slot; only that
/// collection clears it again on removal. A member held by several
/// collections therefore keeps pointing at the first one.
#[derive(Default)]
pub struct Owner {
    slot: RwLock<Option<WeakCollection>>,
}

impl Owner {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The owning collection, if it is still alive.
    pub fn collection(&self) -> Option<Collection> {
        self.slot.read().as_ref().and_then(WeakCollection::upgrade)
    }

    /// Claims the slot for `collection` unless a live collection holds it.
    ///
    /// Returns true if `collection` is now the owner.
    pub(crate) fn claim(&self, collection: &Collection) -> bool {
        let mut slot = self.slot.write();
        match slot.as_ref().and_then(WeakCollection::upgrade) {
            Some(current) => current.ptr_eq(collection),
            None => {
                *slot = Some(collection.downgrade());
                true
            }
        }
    }

    /// Clears the slot if `collection` is the owner.
    pub(crate) fn release(&self, collection: &Collection) -> bool {
        let mut slot = self.slot.write();
        let owned = slot
            .as_ref()
            .is_some_and(|weak| weak.points_to(collection));
        if owned {
            *slot = None;
        }
        owned
    }
}

impl std::fmt::Debug for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Owner")
            .field("attached", &self.collection().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectionConfig;

    #[test]
    fn first_claim_wins() {
        let a = Collection::new(CollectionConfig::new()).unwrap();
        let b = Collection::new(CollectionConfig::new()).unwrap();
        let owner = Owner::new();

        assert!(owner.claim(&a));
        assert!(!owner.claim(&b));
        assert!(owner.collection().unwrap().ptr_eq(&a));
    }

    #[test]
    fn only_owner_releases() {
        let a = Collection::new(CollectionConfig::new()).unwrap();
        let b = Collection::new(CollectionConfig::new()).unwrap();
        let owner = Owner::new();
        owner.claim(&a);

        assert!(!owner.release(&b));
        assert!(owner.collection().is_some());
        assert!(owner.release(&a));
        assert!(owner.collection().is_none());
    }

    #[test]
    fn dropped_owner_can_be_replaced() {
        let owner = Owner::new();
        {
            let a = Collection::new(CollectionConfig::new()).unwrap();
            owner.claim(&a);
        }
        let b = Collection::new(CollectionConfig::new()).unwrap();
        assert!(owner.claim(&b));
    }
}
