//! Property tests: random operation sequences against a shadow model.

use proptest::prelude::*;
use roster_core::{Collection, CollectionConfig, Model, SetOptions};
use roster_testkit::prelude::*;

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn operation_sequences_match_shadow(ops in operation_sequence_strategy(1, 24)) {
        let mut harness = CollectionHarness::new();
        for op in &ops {
            harness.apply(op);
            harness.verify();
        }
    }

    #[test]
    fn adding_twice_is_idempotent(batch in batch_strategy(0, 12)) {
        let collection = Collection::new(CollectionConfig::new()).unwrap();
        collection.add(batch.clone());
        let first = ids(&collection);
        let log = EventLog::attach(&collection);

        collection.add(batch);

        prop_assert_eq!(ids(&collection), first);
        prop_assert_eq!(log.count("add"), 0);
    }

    #[test]
    fn main_index_is_exact(batch in batch_strategy(0, 16), removed in prop::collection::vec(id_strategy(), 0..8)) {
        let collection = Collection::new(CollectionConfig::new()).unwrap();
        collection.add(batch);
        collection.remove(removed.clone());

        for member in collection.iter() {
            let filed = collection.get(id_of(&member));
            prop_assert!(filed.is_some_and(|f| f.cid() == member.cid()));
        }
        for id in removed {
            prop_assert!(collection.get(id).is_none());
        }
    }

    #[test]
    fn sorted_collections_stay_sorted(ops in operation_sequence_strategy(1, 16)) {
        let collection = Collection::new(CollectionConfig::new().comparator("rank")).unwrap();
        for op in ops {
            match op {
                CollectionOperation::Add(batch) => { collection.add(batch); }
                CollectionOperation::Set(batch) => { collection.set(batch); }
                CollectionOperation::Remove(keys) => { collection.remove(keys); }
                CollectionOperation::Reset(batch) => {
                    collection.reset_with(batch, &SetOptions::reset());
                }
            }
            let ranks: Vec<_> = collection.map(|m| m.get("rank"));
            prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
