//! Bit-exact big-endian serialization of a [`CuckooFilter`], built on
//! `byteorder` the way the teacher's wire formats do.
//!
//! Layout: strategy ordinal (`u8`), then shape (`num_buckets: u64,
//! num_entries_per_bucket: u32, num_bits_per_entry: u32`), then `size: u64`,
//! `checksum: i64`, then the packed data words (`u64` each, in order).

use std::hash::Hash;
use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::bucket_table::BucketTable;
use crate::error::{CuckooFilterError, Result};
use crate::filter::CuckooFilter;
use crate::strategy::{Strategy, StrategyKind};

/// Serializes `filter` into its big-endian wire form.
pub fn to_bytes<T: Hash>(filter: &CuckooFilter<T>) -> Vec<u8> {
    let table = filter.table();
    let mut out = Vec::with_capacity(25 + table.data().len() * 8);

    out.write_u8(filter.strategy_kind().ordinal()).unwrap();
    out.write_u64::<BigEndian>(table.num_buckets()).unwrap();
    out.write_u32::<BigEndian>(table.num_entries_per_bucket()).unwrap();
    out.write_u32::<BigEndian>(table.num_bits_per_entry()).unwrap();
    out.write_u64::<BigEndian>(table.size()).unwrap();
    out.write_i64::<BigEndian>(table.checksum()).unwrap();
    for word in table.data() {
        out.write_u64::<BigEndian>(*word).unwrap();
    }
    out
}

/// Reconstructs a [`CuckooFilter`] from bytes written by [`to_bytes`].
/// Returns [`CuckooFilterError::Malformed`] on truncation, a bad shape, an
/// unknown strategy ordinal, or a data length inconsistent with the shape.
pub fn from_bytes<T: Hash>(bytes: &[u8]) -> Result<CuckooFilter<T>> {
    let mut cursor = Cursor::new(bytes);

    let ordinal = read_u8(&mut cursor)?;
    let kind = StrategyKind::from_ordinal(ordinal)?;

    let num_buckets = read_u64(&mut cursor)?;
    let num_entries_per_bucket = read_u32(&mut cursor)?;
    let num_bits_per_entry = read_u32(&mut cursor)?;
    let size = read_u64(&mut cursor)?;
    let checksum = read_i64(&mut cursor)?;

    let mut data = Vec::new();
    loop {
        let mut word = [0u8; 8];
        match cursor.read_exact(&mut word) {
            Ok(()) => data.push(u64::from_be_bytes(word)),
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => {
                return Err(CuckooFilterError::Malformed(format!(
                    "failed reading packed data: {err}"
                )))
            }
        }
    }

    let table = BucketTable::from_raw_parts(
        num_buckets,
        num_entries_per_bucket,
        num_bits_per_entry,
        data,
        size,
        checksum,
    )?;

    Ok(CuckooFilter::from_parts(table, Strategy::with_kind(kind)))
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8> {
    cursor
        .read_u8()
        .map_err(|err| CuckooFilterError::Malformed(format!("truncated strategy ordinal: {err}")))
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32> {
    cursor
        .read_u32::<BigEndian>()
        .map_err(|err| CuckooFilterError::Malformed(format!("truncated u32 field: {err}")))
}

fn read_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64> {
    cursor
        .read_u64::<BigEndian>()
        .map_err(|err| CuckooFilterError::Malformed(format!("truncated u64 field: {err}")))
}

fn read_i64(cursor: &mut Cursor<&[u8]>) -> Result<i64> {
    cursor
        .read_i64::<BigEndian>()
        .map_err(|err| CuckooFilterError::Malformed(format!("truncated i64 field: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_empty_filter() {
        let filter: CuckooFilter<&str> = CuckooFilter::with_parameters(1024, 4, 8).unwrap();
        let bytes = to_bytes(&filter);
        let rebuilt: CuckooFilter<&str> = from_bytes(&bytes).unwrap();
        assert!(rebuilt.equivalent(&filter));
        assert_eq!(rebuilt.size(), 0);
    }

    #[test]
    fn round_trips_a_populated_filter() {
        let mut filter: CuckooFilter<u64> = CuckooFilter::with_parameters(256, 4, 8).unwrap();
        for i in 0..50u64 {
            assert!(filter.put(&i));
        }
        let bytes = to_bytes(&filter);
        let rebuilt: CuckooFilter<u64> = from_bytes(&bytes).unwrap();
        assert!(rebuilt.equivalent(&filter));
        for i in 0..50u64 {
            assert!(rebuilt.might_contain(&i));
        }
    }

    #[test]
    fn rejects_truncated_bytes() {
        let filter: CuckooFilter<&str> = CuckooFilter::with_parameters(1024, 4, 8).unwrap();
        let bytes = to_bytes(&filter);
        let truncated = &bytes[..bytes.len() - 3];
        let result: Result<CuckooFilter<&str>> = from_bytes(truncated);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_strategy_ordinal() {
        let mut bytes = vec![0xFFu8];
        bytes.extend_from_slice(&[0u8; 24]);
        let result: Result<CuckooFilter<&str>> = from_bytes(&bytes);
        assert!(result.is_err());
    }
}
