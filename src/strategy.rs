//! Cuckoo hashing over a [`BucketTable`]: fingerprint derivation, the
//! primary/alternate index pair, and the relocation ("kick") algorithm that
//! resolves bucket overflow on insertion.
//!
//! The alternate-index transform is an involution (`alt_index(alt_index(i,
//! F), F) == i`) by construction: the offset added to `i` is always odd, and
//! its sign is flipped based on the parity of `i`, so the transform always
//! moves between a bucket of one parity and the other. Reapplying it flips
//! parity back and cancels the offset. This lets eviction find a kicked
//! fingerprint's other candidate bucket from nothing but its current bucket
//! and its own value — the original element is never consulted again.

use std::hash::Hash;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bucket_table::{BucketTable, EMPTY};
use crate::error::{CuckooFilterError, Result};
use crate::hash;

/// Bounded eviction attempts before `put` gives up and rolls back.
pub const MAX_RELOCATION_ATTEMPTS: usize = 500;

/// Seed for the eviction victim-slot source (see module docs and the design
/// note on reproducibility).
const EVICTION_SEED: u64 = 1;

/// A versioned, append-only enumeration of cuckoo hashing strategies. The
/// ordinal is part of the serialized form of any filter using this table and
/// must never be reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StrategyKind {
    Murmur128BealduprasV32 = 0,
}

impl StrategyKind {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Result<Self> {
        match ordinal {
            0 => Ok(StrategyKind::Murmur128BealduprasV32),
            other => Err(CuckooFilterError::Malformed(format!(
                "unknown strategy ordinal {other}"
            ))),
        }
    }
}

/// Scans the 32-bit `hash` in `f`-bit windows from least to most significant
/// and returns the first non-zero window, or `1` if every window is zero.
/// Never returns `EMPTY` (`0`).
pub fn fingerprint(hash: u32, f: u32) -> u32 {
    debug_assert!(f >= 1 && f <= 32);
    let window_mask: u64 = (1u64 << f) - 1;
    let mut offset = 0u32;
    while offset < 32 {
        let window = ((hash as u64 >> offset) & window_mask) as u32;
        if window != 0 {
            return window;
        }
        offset += f;
    }
    1
}

fn euclid_mod(value: i64, modulus: i64) -> i64 {
    let r = value % modulus;
    if r < 0 {
        r + modulus
    } else {
        r
    }
}

/// Primary bucket index: `hash` reinterpreted as signed, reduced modulo `m`
/// with Euclidean (non-negative) semantics.
pub fn primary_index(hash: u32, m: u64) -> u64 {
    euclid_mod(hash as i32 as i64, m as i64) as u64
}

/// `offset = parsign(i) * odd(hash32(F))`, added to `i` via [`protected_sum`]
/// and reduced modulo `m`. Requires `m` even (see module docs).
pub fn alt_index(i: u64, fingerprint: u32, m: u64) -> u64 {
    let i = i as i64;
    let m = m as i64;
    let sign: i64 = if i % 2 == 0 { 1 } else { -1 };
    let odd_hash = hash::hash32(fingerprint as i32) | 1;
    let offset = sign * odd_hash as i64;
    euclid_mod(protected_sum(i, offset, m), m) as u64
}

/// Returns `i + offset` if that sum cannot overflow; otherwise reduces `i`
/// by `m` first. Reducing by `m` before summing preserves the eventual `mod
/// m` result while dragging `i` into a range where the addition is safe.
fn protected_sum(i: i64, offset: i64, m: i64) -> i64 {
    match i.checked_add(offset) {
        Some(sum) => sum,
        None => protected_sum(i - m, offset, m),
    }
}

/// Splits a 128-bit-derived 64-bit hash into its two 32-bit halves, as used
/// by every operation below to get `(hash1, hash2)`.
fn split(h: u64) -> (u32, u32) {
    (h as u32, (h >> 32) as u32)
}

/// The cuckoo hashing engine for the `MURMUR128_BEALDUPRAS_32` strategy. A
/// small value type owning only its eviction RNG; it holds no state specific
/// to any particular [`BucketTable`].
pub struct Strategy {
    kind: StrategyKind,
    eviction_rng: StdRng,
}

impl Strategy {
    pub fn new() -> Self {
        Self {
            kind: StrategyKind::Murmur128BealduprasV32,
            eviction_rng: StdRng::seed_from_u64(EVICTION_SEED),
        }
    }

    /// Builds a strategy for a specific [`StrategyKind`], used when
    /// reconstructing a filter in [`crate::serialize`].
    pub fn with_kind(kind: StrategyKind) -> Self {
        Self {
            kind,
            eviction_rng: StdRng::seed_from_u64(EVICTION_SEED),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn locate<T: Hash>(&self, item: &T, table: &BucketTable) -> (u32, u64, u64) {
        let (hash1, hash2) = split(hash::hash128(item));
        let f = fingerprint(hash2, table.num_bits_per_entry());
        let i1 = primary_index(hash1, table.num_buckets());
        let i2 = alt_index(i1, f, table.num_buckets());
        (f, i1, i2)
    }

    /// Inserts `item`'s fingerprint into `table`. Returns `false` if the
    /// table is structurally full after [`MAX_RELOCATION_ATTEMPTS`] kicks;
    /// on failure, `table` is left bit-identical to its pre-call state.
    pub fn put<T: Hash>(&mut self, item: &T, table: &mut BucketTable) -> bool {
        let (f, i1, i2) = self.locate(item, table);

        if table.swap_any_entry(f, EMPTY, i1) {
            return true;
        }
        if table.swap_any_entry(f, EMPTY, i2) {
            return true;
        }
        self.evict(f, i2, table)
    }

    /// The bounded relocation loop: repeatedly overwrites a random slot in
    /// the current bucket with the arriving fingerprint, re-homing whatever
    /// it displaced to that value's own alternate bucket.
    fn evict(&mut self, fingerprint: u32, start_index: u64, table: &mut BucketTable) -> bool {
        let original_fingerprint = fingerprint;
        let mut current_fingerprint = fingerprint;
        let mut current_index = start_index;
        let mut history: Vec<(u64, u32, u32)> = Vec::with_capacity(MAX_RELOCATION_ATTEMPTS);

        for _ in 0..MAX_RELOCATION_ATTEMPTS {
            let entries_per_bucket = table.num_entries_per_bucket();
            let slot = self.eviction_rng.gen_range(0, entries_per_bucket);
            let kicked = table.swap_entry(current_fingerprint, current_index, slot);
            history.push((current_index, slot, kicked));

            // Defensive: an EMPTY slot would normally already have been
            // claimed in put()'s first two attempts, but treat landing on
            // one as success rather than asserting it can't happen.
            if kicked == EMPTY {
                return true;
            }

            current_fingerprint = kicked;
            current_index = alt_index(current_index, current_fingerprint, table.num_buckets());
        }

        let mut last_restored = None;
        for (bucket, entry, old_value) in history.into_iter().rev() {
            last_restored = Some(table.swap_entry(old_value, bucket, entry));
        }
        assert_eq!(
            last_restored,
            Some(original_fingerprint),
            "rollback failed to restore the original fingerprint"
        );
        false
    }

    /// Removes one instance of `item`'s fingerprint. A false delete — of a
    /// fingerprint placed by a different element sharing both fingerprint
    /// and bucket — is possible and is an intrinsic property of fingerprint-
    /// only filters, not a bug.
    pub fn delete<T: Hash>(&self, item: &T, table: &mut BucketTable) -> bool {
        let (f, i1, i2) = self.locate(item, table);
        table.swap_any_entry(EMPTY, f, i1) || table.swap_any_entry(EMPTY, f, i2)
    }

    /// `true` if `item` was possibly inserted. Never false-negative for
    /// elements actually present, provided no eviction has silently failed
    /// and no false delete has occurred.
    pub fn might_contain<T: Hash>(&self, item: &T, table: &BucketTable) -> bool {
        let (f, i1, i2) = self.locate(item, table);
        table.has_entry(f, i1) || table.has_entry(f, i2)
    }

    /// Merges every fingerprint of `src` into `dest`. Returns `false` without
    /// touching `dest` if the two tables aren't [`BucketTable::is_compatible`]
    /// (their bucket indices don't line up), and also returns `false` and
    /// stops on the first unrecoverable eviction failure (`dest` may then
    /// hold a partial merge, mirroring how `put` itself can partially fail).
    pub fn put_all(&mut self, dest: &mut BucketTable, src: &BucketTable) -> bool {
        if !dest.is_compatible(src) {
            return false;
        }

        for bucket in 0..src.num_buckets() {
            for entry in 0..src.num_entries_per_bucket() {
                let f = src.read_entry(bucket, entry);
                if f == EMPTY {
                    continue;
                }
                if dest.swap_any_entry(f, EMPTY, bucket) {
                    continue;
                }
                let alt = alt_index(bucket, f, dest.num_buckets());
                if dest.swap_any_entry(f, EMPTY, alt) {
                    continue;
                }
                if !self.evict(f, alt, dest) {
                    return false;
                }
            }
        }
        true
    }

    /// Structural equivalence: `false` if the tables aren't the same shape.
    /// Otherwise, for every stored fingerprint `F` at bucket `i` in `b`, the
    /// combined count across `{i, alt_index(i, F)}` must match between `a`
    /// and `b` — the two candidate buckets are semantically interchangeable.
    pub fn equivalent(&self, a: &BucketTable, b: &BucketTable) -> bool {
        if !a.is_compatible(b) {
            return false;
        }
        let m = b.num_buckets();
        for bucket in 0..m {
            for entry in 0..b.num_entries_per_bucket() {
                let f = b.read_entry(bucket, entry);
                if f == EMPTY {
                    continue;
                }
                let alt = alt_index(bucket, f, m);
                let count_a = a.count_entry(f, bucket) + a.count_entry(f, alt);
                let count_b = b.count_entry(f, bucket) + b.count_entry(f, alt);
                if count_a != count_b {
                    return false;
                }
            }
        }
        true
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new()
    }
}
