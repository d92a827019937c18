//! An in-memory cuckoo filter: approximate set membership with support for
//! deletion, built on cuckoo hashing over a bit-packed bucket table.
//!
//! A cuckoo filter stores short fingerprints of inserted items rather than
//! the items themselves. Membership queries can false-positive (an item
//! never inserted reads as present) but never false-negative for items that
//! remain present, and unlike a Bloom filter, individual items can be
//! removed again.

mod bitfield;
mod bucket_table;
mod config;
mod error;
mod filter;
mod hash;
mod strategy;

pub mod serialize;

pub use config::FilterConfig;
pub use error::{CuckooFilterError, Result};
pub use filter::CuckooFilter;
pub use strategy::StrategyKind;
