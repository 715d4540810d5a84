#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod capacity;
mod error;
mod key;
mod slot;

pub mod hash_table;

mod hash_table_proptest;

pub use capacity::PRIMES;
pub use error::TableError;
#[cfg(any(test, feature = "stats"))]
pub use hash_table::DebugStats;
pub use hash_table::HashTable;
pub use key::Key;
pub use key::KeyRef;
