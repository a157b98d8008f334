#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod allocator;

pub mod hash_index;

/// A vector paired with a [`HashIndex`] for lookups by value.
///
/// This module provides `IndexedVec`, which owns its items and keeps the
/// index in sync across pushes, ordered inserts and removals.
pub mod indexed_vec;

pub mod position;

pub use allocator::Global;
pub use allocator::SlotAllocator;
pub use hash_index::ChainIter;
pub use hash_index::HashIndex;
#[cfg(any(test, feature = "stats"))]
pub use hash_index::ChainHistogram;
#[cfg(any(test, feature = "stats"))]
pub use hash_index::DebugStats;
#[cfg(any(feature = "foldhash", feature = "std"))]
pub use indexed_vec::DefaultHashBuilder;
#[cfg(any(feature = "foldhash", feature = "std"))]
pub use indexed_vec::DefaultIndexedVec;
pub use indexed_vec::IndexedVec;
pub use position::HashCode;
pub use position::Position;
pub use position::SizeType;
