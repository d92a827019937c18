//! End-to-end tests against the public `CuckooFilter` façade, exercising
//! whole-filter scenarios rather than individual module internals (those are
//! covered by the unit tests living alongside each module).

#[cfg(test)]
mod basic {
    use cuckoo_filter::{CuckooFilter, FilterConfig};

    #[test]
    fn empty_filter_contains_nothing() {
        let filter: CuckooFilter<&str> = CuckooFilter::with_parameters(1024, 4, 8).unwrap();
        assert!(!filter.might_contain(&"anything"));
        assert_eq!(filter.size(), 0);
    }

    #[test]
    fn insert_query_delete_round_trip() {
        let mut filter: CuckooFilter<String> = CuckooFilter::with_parameters(1024, 4, 8).unwrap();
        let words = ["alpha", "beta", "gamma", "delta"];
        for word in &words {
            assert!(filter.put(&word.to_string()));
        }
        for word in &words {
            assert!(filter.might_contain(&word.to_string()));
        }
        assert_eq!(filter.size(), words.len() as u64);

        assert!(filter.delete(&"beta".to_string()));
        assert!(!filter.might_contain(&"beta".to_string()));
        assert!(filter.might_contain(&"alpha".to_string()));
        assert_eq!(filter.size(), words.len() as u64 - 1);
    }

    #[test]
    fn deleting_an_absent_key_is_a_no_op() {
        let mut filter: CuckooFilter<u64> = CuckooFilter::with_parameters(1024, 4, 8).unwrap();
        assert!(filter.put(&1));
        assert!(!filter.delete(&2));
        assert!(filter.might_contain(&1));
        assert_eq!(filter.size(), 1);
    }

    #[test]
    fn filter_from_config_meets_its_capacity_bound() {
        let config = FilterConfig::new(5_000, 0.01).unwrap();
        let mut filter: CuckooFilter<u64> = CuckooFilter::new(config).unwrap();
        assert!(filter.capacity() >= 5_000);

        let mut rejected = 0;
        for i in 0..5_000u64 {
            if !filter.put(&i) {
                rejected += 1;
            }
        }
        // Filling to exactly the sizing target should succeed for nearly
        // every element at the load factor the config targets.
        assert!(rejected < 100, "rejected {rejected} of 5000 inserts");
    }
}

#[cfg(test)]
mod reversibility {
    use cuckoo_filter::CuckooFilter;
    use rand::Rng;

    /// Sweeps many random insertions and confirms every accepted element
    /// remains queryable, exercising the alternate-index involution across a
    /// realistic mix of hash values rather than the handful of fixed cases
    /// covered by the strategy module's own unit tests.
    #[test]
    fn survives_many_random_insertions() {
        let mut rng = rand::thread_rng();
        let mut filter: CuckooFilter<u64> = CuckooFilter::with_parameters(4096, 4, 12).unwrap();
        let mut accepted = Vec::new();

        for _ in 0..10_000 {
            let value: u64 = rng.gen();
            if filter.put(&value) {
                accepted.push(value);
            }
        }

        for value in &accepted {
            assert!(filter.might_contain(value));
        }
    }
}

#[cfg(test)]
mod capacity {
    use cuckoo_filter::CuckooFilter;

    /// Drives a small filter past its structural capacity and confirms
    /// rejected inserts leave previously accepted elements intact.
    #[test]
    fn overfilling_preserves_existing_entries() {
        let mut filter: CuckooFilter<u64> = CuckooFilter::with_parameters(4, 4, 8).unwrap();
        let mut accepted = Vec::new();

        for i in 0..64u64 {
            if filter.put(&i) {
                accepted.push(i);
            }
        }

        assert!(accepted.len() < 64, "a 16-slot table accepted every insert");
        assert!(filter.size() <= filter.capacity());
        for i in &accepted {
            assert!(filter.might_contain(i));
        }
    }
}

#[cfg(test)]
mod merging {
    use cuckoo_filter::CuckooFilter;

    #[test]
    fn put_all_preserves_both_sides() {
        let mut a: CuckooFilter<u64> = CuckooFilter::with_parameters(256, 4, 8).unwrap();
        let mut b: CuckooFilter<u64> = CuckooFilter::with_parameters(256, 4, 8).unwrap();

        for i in 0..30u64 {
            assert!(a.put(&i));
        }
        for i in 30..60u64 {
            assert!(b.put(&i));
        }

        assert!(a.put_all(&b));
        for i in 0..60u64 {
            assert!(a.might_contain(&i));
        }
    }
}

#[cfg(test)]
mod persistence {
    use cuckoo_filter::serialize;
    use cuckoo_filter::CuckooFilter;

    #[test]
    fn serialized_filter_round_trips_through_bytes() {
        let mut filter: CuckooFilter<u64> = CuckooFilter::with_parameters(512, 4, 8).unwrap();
        for i in 0..80u64 {
            filter.put(&i);
        }

        let bytes = serialize::to_bytes(&filter);
        let restored: CuckooFilter<u64> = serialize::from_bytes(&bytes).unwrap();

        assert!(restored.equivalent(&filter));
        for i in 0..80u64 {
            assert!(restored.might_contain(&i));
        }
    }
}
