//! Translates a desired element count and target false-positive rate into
//! the three shape parameters a [`crate::bucket_table::BucketTable`] needs.
//!
//! This is the "capacity/sizing heuristics" collaborator named as external to
//! the core cuckoo hashing engine; it lives here only because this crate has
//! no surrounding layer to provide it, and a filter is otherwise unusable
//! from a cold start.

use crate::error::{CuckooFilterError, Result};

/// Standard cuckoo-filter bucket width: four entries per bucket keeps load
/// factors above 95% reachable for fingerprint widths wide enough for target
/// false-positive rates below about 2%.
pub const DEFAULT_ENTRIES_PER_BUCKET: u32 = 4;

/// Target load factor used when sizing `num_buckets` from `expected_items`.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.95;

/// The shape parameters derived for a [`crate::filter::CuckooFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    num_buckets: u64,
    num_entries_per_bucket: u32,
    num_bits_per_entry: u32,
}

impl FilterConfig {
    /// Derives a shape from an expected element count and a target
    /// false-positive probability in `(0, 1)`.
    pub fn new(expected_items: u64, target_fpp: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(CuckooFilterError::InvalidShape(
                "expected_items must be greater than zero".into(),
            ));
        }
        if !target_fpp.is_finite() || target_fpp <= 0.0 || target_fpp >= 1.0 {
            return Err(CuckooFilterError::InvalidShape(
                "target_fpp must be finite and strictly between 0 and 1".into(),
            ));
        }

        let b = f64::from(DEFAULT_ENTRIES_PER_BUCKET);
        let num_bits_per_entry = ((2.0 * b / target_fpp).log2().ceil() as i64).clamp(1, 32) as u32;

        let needed_buckets = (expected_items as f64 / (b * DEFAULT_LOAD_FACTOR)).ceil() as u64;
        let mut num_buckets = needed_buckets.max(2);
        if num_buckets % 2 != 0 {
            num_buckets += 1;
        }

        Self::with_shape(num_buckets, DEFAULT_ENTRIES_PER_BUCKET, num_bits_per_entry)
    }

    /// Builds a config from explicit shape parameters, validating them the
    /// same way [`crate::bucket_table::BucketTable::new`] would.
    pub fn with_shape(
        num_buckets: u64,
        num_entries_per_bucket: u32,
        num_bits_per_entry: u32,
    ) -> Result<Self> {
        if num_buckets == 0 || num_buckets % 2 != 0 {
            return Err(CuckooFilterError::InvalidShape(format!(
                "num_buckets must be even and non-zero, got {num_buckets}"
            )));
        }
        if num_entries_per_bucket == 0 {
            return Err(CuckooFilterError::InvalidShape(
                "num_entries_per_bucket must be non-zero".into(),
            ));
        }
        if num_bits_per_entry == 0 || num_bits_per_entry > 32 {
            return Err(CuckooFilterError::InvalidShape(format!(
                "num_bits_per_entry must be in [1, 32], got {num_bits_per_entry}"
            )));
        }

        Ok(Self {
            num_buckets,
            num_entries_per_bucket,
            num_bits_per_entry,
        })
    }

    #[inline]
    pub fn num_buckets(&self) -> u64 {
        self.num_buckets
    }

    #[inline]
    pub fn num_entries_per_bucket(&self) -> u32 {
        self.num_entries_per_bucket
    }

    #[inline]
    pub fn num_bits_per_entry(&self) -> u32 {
        self.num_bits_per_entry
    }
}
