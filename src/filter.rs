//! The outer typed filter façade: the public entry point binding a
//! [`Strategy`] to a [`BucketTable`] behind the element type `T`.

use std::hash::Hash;
use std::marker::PhantomData;

use crate::bucket_table::BucketTable;
use crate::config::FilterConfig;
use crate::error::Result;
use crate::strategy::{Strategy, StrategyKind};

/// An approximate set-membership filter with support for deletion.
///
/// `CuckooFilter` never stores `T` itself — only short fingerprints derived
/// from it — so it cannot enumerate its elements, and `delete` can remove a
/// different element that happens to share a fingerprint and bucket (a
/// "false delete", intrinsic to fingerprint-only filters).
///
/// # Examples
/// ```
/// use cuckoo_filter::{CuckooFilter, FilterConfig};
///
/// let config = FilterConfig::new(1_000, 0.01).unwrap();
/// let mut filter: CuckooFilter<&str> = CuckooFilter::new(config).unwrap();
/// assert!(filter.put(&"alpha"));
/// assert!(filter.might_contain(&"alpha"));
/// assert!(filter.delete(&"alpha"));
/// assert!(!filter.might_contain(&"alpha"));
/// ```
pub struct CuckooFilter<T: Hash> {
    table: BucketTable,
    strategy: Strategy,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Hash> CuckooFilter<T> {
    /// Builds an empty filter sized by `config`.
    pub fn new(config: FilterConfig) -> Result<Self> {
        Self::with_parameters(
            config.num_buckets(),
            config.num_entries_per_bucket(),
            config.num_bits_per_entry(),
        )
    }

    /// Builds an empty filter from explicit shape parameters.
    pub fn with_parameters(
        num_buckets: u64,
        num_entries_per_bucket: u32,
        num_bits_per_entry: u32,
    ) -> Result<Self> {
        Ok(Self {
            table: BucketTable::new(num_buckets, num_entries_per_bucket, num_bits_per_entry)?,
            strategy: Strategy::new(),
            _marker: PhantomData,
        })
    }

    pub(crate) fn from_parts(table: BucketTable, strategy: Strategy) -> Self {
        Self {
            table,
            strategy,
            _marker: PhantomData,
        }
    }

    pub(crate) fn table(&self) -> &BucketTable {
        &self.table
    }

    pub(crate) fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Inserts `item`. Returns `false` if the table is structurally full;
    /// the table is left unchanged on failure.
    pub fn put(&mut self, item: &T) -> bool {
        self.strategy.put(item, &mut self.table)
    }

    /// Removes one instance of `item`. See the struct docs for false-delete
    /// semantics.
    pub fn delete(&mut self, item: &T) -> bool {
        self.strategy.delete(item, &mut self.table)
    }

    /// `true` if `item` may have been inserted.
    pub fn might_contain(&self, item: &T) -> bool {
        self.strategy.might_contain(item, &self.table)
    }

    /// Merges every fingerprint of `other` into `self`. Returns `false` and
    /// stops on the first unrecoverable failure.
    pub fn put_all(&mut self, other: &CuckooFilter<T>) -> bool {
        self.strategy.put_all(&mut self.table, &other.table)
    }

    /// Structural equivalence: `true` iff `self` and `other` have the same
    /// shape and store the same fingerprint multiset in every candidate
    /// bucket pair.
    pub fn equivalent(&self, other: &CuckooFilter<T>) -> bool {
        self.strategy.equivalent(&self.table, &other.table)
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.table.size()
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.table.capacity()
    }

    #[inline]
    pub fn load(&self) -> f64 {
        self.table.load()
    }

    #[inline]
    pub fn expected_fpp(&self) -> f64 {
        self.table.expected_fpp()
    }

    #[inline]
    pub fn bit_size(&self) -> u64 {
        self.table.bit_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_filter() -> CuckooFilter<&'static str> {
        CuckooFilter::with_parameters(1024, 4, 8).unwrap()
    }

    #[test]
    fn empty_lookup() {
        let filter = small_filter();
        assert!(!filter.might_contain(&"alpha"));
        assert_eq!(filter.size(), 0);
    }

    #[test]
    fn insert_then_query() {
        let mut filter = small_filter();
        for item in ["a", "b", "c"] {
            assert!(filter.put(&item));
        }
        for item in ["a", "b", "c"] {
            assert!(filter.might_contain(&item));
        }
        assert_eq!(filter.size(), 3);
    }

    #[test]
    fn delete_absent_key() {
        let mut filter = small_filter();
        assert!(!filter.delete(&"ghost"));
        assert_eq!(filter.size(), 0);
    }

    #[test]
    fn capacity_stress() {
        let mut filter: CuckooFilter<u64> = CuckooFilter::with_parameters(2, 4, 8).unwrap();
        let mut accepted = Vec::new();
        for i in 0..9u64 {
            if filter.put(&i) {
                accepted.push(i);
            }
        }
        assert!(filter.size() <= 8);
        for i in &accepted {
            assert!(filter.might_contain(i));
        }
    }

    #[test]
    fn put_all_monotonicity() {
        let mut src: CuckooFilter<u64> = CuckooFilter::with_parameters(64, 4, 8).unwrap();
        let mut dest: CuckooFilter<u64> = CuckooFilter::with_parameters(64, 4, 8).unwrap();
        for i in 0..20u64 {
            assert!(src.put(&i));
        }
        assert!(dest.put_all(&src));
        for i in 0..20u64 {
            assert!(dest.might_contain(&i));
        }
    }

    #[test]
    fn fresh_filters_of_same_shape_are_equivalent() {
        let a = small_filter();
        let b = small_filter();
        assert!(a.equivalent(&b));
    }
}
