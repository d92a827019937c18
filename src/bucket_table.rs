//! A fixed `num_buckets × num_entries_per_bucket` matrix of `num_bits_per_entry`-wide
//! entries, packed into a dense `Vec<u64>` via [`crate::bitfield`].

use crate::bitfield;
use crate::error::{CuckooFilterError, Result};

/// Reserved entry value meaning "slot unused".
pub const EMPTY: u32 = 0;

/// A bit-packed matrix of bucket entries.
///
/// `num_buckets` must be even (required by [`crate::strategy`]'s alt-index
/// reversibility) and non-zero; `num_entries_per_bucket` must be non-zero;
/// `num_bits_per_entry` must be in `[1, 32]`.
#[derive(Debug, Clone)]
pub struct BucketTable {
    num_buckets: u64,
    num_entries_per_bucket: u32,
    num_bits_per_entry: u32,
    data: Vec<u64>,
    size: u64,
    checksum: i64,
}

impl BucketTable {
    fn word_count(num_buckets: u64, num_entries_per_bucket: u32, num_bits_per_entry: u32) -> Result<usize> {
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

        let total_entries = num_buckets
            .checked_mul(num_entries_per_bucket as u64)
            .ok_or_else(|| CuckooFilterError::SizeOverflow("num_buckets * num_entries_per_bucket overflowed".into()))?;
        let total_bits = total_entries
            .checked_mul(num_bits_per_entry as u64)
            .ok_or_else(|| CuckooFilterError::SizeOverflow("total bit width overflowed".into()))?;
        let word_count = total_bits.div_ceil(64);
        usize::try_from(word_count)
            .map_err(|_| CuckooFilterError::SizeOverflow("word count exceeds addressable memory".into()))
    }

    pub fn new(
        num_buckets: u64,
        num_entries_per_bucket: u32,
        num_bits_per_entry: u32,
    ) -> Result<Self> {
        let word_count = Self::word_count(num_buckets, num_entries_per_bucket, num_bits_per_entry)?;

        Ok(Self {
            num_buckets,
            num_entries_per_bucket,
            num_bits_per_entry,
            data: vec![0u64; word_count],
            size: 0,
            checksum: 0,
        })
    }

    /// Rebuilds a table from its serialized parts (see [`crate::serialize`]),
    /// validating shape the same way [`BucketTable::new`] does and rejecting
    /// a `data` array whose length doesn't match the shape.
    pub fn from_raw_parts(
        num_buckets: u64,
        num_entries_per_bucket: u32,
        num_bits_per_entry: u32,
        data: Vec<u64>,
        size: u64,
        checksum: i64,
    ) -> Result<Self> {
        let word_count = Self::word_count(num_buckets, num_entries_per_bucket, num_bits_per_entry)?;
        if data.len() != word_count {
            return Err(CuckooFilterError::Malformed(format!(
                "expected {word_count} data words for this shape, got {}",
                data.len()
            )));
        }

        Ok(Self {
            num_buckets,
            num_entries_per_bucket,
            num_bits_per_entry,
            data,
            size,
            checksum,
        })
    }

    #[inline]
    fn bit_offset(&self, bucket: u64, entry: u32) -> u64 {
        (bucket * self.num_entries_per_bucket as u64 + entry as u64) * self.num_bits_per_entry as u64
    }

    #[inline]
    pub fn read_entry(&self, bucket: u64, entry: u32) -> u32 {
        bitfield::read(&self.data, self.bit_offset(bucket, entry), self.num_bits_per_entry)
    }

    /// First `entry` index in `bucket` holding `value`, else `-1`.
    pub fn find_entry(&self, value: u32, bucket: u64) -> i32 {
        for entry in 0..self.num_entries_per_bucket {
            if self.read_entry(bucket, entry) == value {
                return entry as i32;
            }
        }
        -1
    }

    pub fn count_entry(&self, value: u32, bucket: u64) -> u32 {
        (0..self.num_entries_per_bucket)
            .filter(|&entry| self.read_entry(bucket, entry) == value)
            .count() as u32
    }

    pub fn has_entry(&self, value: u32, bucket: u64) -> bool {
        self.find_entry(value, bucket) >= 0
    }

    /// Unconditionally writes `new_value` into `(bucket, entry)`, returning
    /// the slot's previous value and keeping `size`/`checksum` consistent.
    pub fn swap_entry(&mut self, new_value: u32, bucket: u64, entry: u32) -> u32 {
        let offset = self.bit_offset(bucket, entry);
        let old_value = bitfield::write(new_value, &mut self.data, offset, self.num_bits_per_entry);

        self.checksum += new_value as i64 - old_value as i64;
        match (old_value == EMPTY, new_value == EMPTY) {
            (true, false) => self.size += 1,
            (false, true) => self.size -= 1,
            _ => {}
        }
        assert!(self.size as i64 >= 0, "size underflowed below zero");
        old_value
    }

    /// Finds the first slot in `bucket` equal to `find_value` and swaps it to
    /// `new_value`; returns whether a slot was found.
    pub fn swap_any_entry(&mut self, new_value: u32, find_value: u32, bucket: u64) -> bool {
        let entry = self.find_entry(find_value, bucket);
        if entry < 0 {
            return false;
        }
        self.swap_entry(new_value, bucket, entry as u32);
        true
    }

    pub fn is_compatible(&self, other: &BucketTable) -> bool {
        self.num_buckets == other.num_buckets
            && self.num_entries_per_bucket == other.num_entries_per_bucket
            && self.num_bits_per_entry == other.num_bits_per_entry
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

    #[inline]
    pub fn data(&self) -> &[u64] {
        &self.data
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn checksum(&self) -> i64 {
        self.checksum
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.num_buckets * self.num_entries_per_bucket as u64
    }

    #[inline]
    pub fn load(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    #[inline]
    pub fn bit_size(&self) -> u64 {
        self.data.len() as u64 * 64
    }

    pub fn expected_fpp(&self) -> f64 {
        (2.0 * self.size as f64 / self.num_buckets as f64) / (1u64 << self.num_bits_per_entry) as f64
    }

    /// Full scan recomputation of `size`/`checksum`, used by tests to check
    /// the incremental bookkeeping in [`BucketTable::swap_entry`] against
    /// ground truth.
    #[cfg(test)]
    fn recompute(&self) -> (u64, i64) {
        let mut size = 0u64;
        let mut checksum = 0i64;
        for bucket in 0..self.num_buckets {
            for entry in 0..self.num_entries_per_bucket {
                let value = self.read_entry(bucket, entry);
                if value != EMPTY {
                    size += 1;
                }
                checksum += value as i64;
            }
        }
        (size, checksum)
    }
}

impl PartialEq for BucketTable {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other) && self.size == other.size && self.checksum == other.checksum
    }
}

impl Eq for BucketTable {}

impl std::hash::Hash for BucketTable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.num_buckets.hash(state);
        self.num_entries_per_bucket.hash(state);
        self.num_bits_per_entry.hash(state);
        self.size.hash(state);
        self.checksum.hash(state);
    }
}
