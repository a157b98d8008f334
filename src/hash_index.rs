//! The hash-chaining index.
//!
//! [`HashIndex`] maps hash codes to positions in an array owned by the
//! caller. It stores no keys or values, only two arrays of positions:
//!
//! - the bucket table, a power-of-two sized array where each slot holds the
//!   most recently inserted position for that bucket.
//! - the index chain, parallel to the caller's array, where the slot for
//!   position `p` holds the position inserted into the same bucket right
//!   before `p`.
//!
//! Looking a key up means hashing it, walking the chain from
//! [`first`](HashIndex::first) through [`next`](HashIndex::next) until
//! [`Position::NULL`], and comparing the caller's items at each position.
//!
//! # Memory contract
//!
//! The index chain is reallocated when a position beyond its capacity is
//! inserted. Nothing in the public API hands out references into it, but any
//! raw view obtained through unsafe means is invalid after such an insert.
//!
//! # Concurrency
//!
//! All operations take `&self` or `&mut self` and never synchronize
//! internally. Sharing across threads needs external locking.

use alloc::vec;
use core::fmt::Debug;
use core::marker::PhantomData;
use core::ops::Index;

use log::trace;

use crate::allocator::Global;
use crate::allocator::SlotAllocator;
use crate::allocator::SlotBuffer;
use crate::position::HashCode;
use crate::position::Position;
use crate::position::SizeType;

/// Bucket count and index chain size used by [`HashIndex::new`].
pub const DEFAULT_INITIAL_SIZE: usize = 1024;

/// Index chain growth granularity used until
/// [`set_granularity`](HashIndex::set_granularity) is called.
pub const DEFAULT_GRANULARITY: usize = 1024;

/// Lookup mask of an allocated index. ANDing with it is a no-op.
const LOOKUP_ALLOCATED: usize = usize::MAX;

/// Lookup mask of an unallocated index. Collapses every lookup onto slot 0 of
/// the shared null slot.
const LOOKUP_UNALLOCATED: usize = 0;

/// A hash-chaining index from hash codes to positions in an external array.
///
/// Type parameters:
/// - `P`: position type. Its all-bits-one value is reserved as
///   [`Position::NULL`]. Defaults to `u32`.
/// - `K`: hash code type. Defaults to `u64`.
/// - `S`: size type used by the public API. Defaults to `usize`.
/// - `A`: allocation strategy for both arrays. Defaults to [`Global`].
///
/// Nothing is allocated until the first insertion. Positions inserted under
/// the same bucket are returned most recent first.
///
/// ## Example
///
/// ```rust
/// # use core::hash::BuildHasher;
/// # use std::hash::RandomState;
/// #
/// # use chain_index::HashIndex;
/// #
/// struct Thing {
///     name: String,
/// }
///
/// let state = RandomState::new();
/// let mut index: HashIndex = HashIndex::new();
/// let mut things = Vec::new();
///
/// for name in ["cube", "sphere", "cone"] {
///     things.push(Thing { name: name.to_string() });
///     index.insert(state.hash_one(name), (things.len() - 1) as u32);
/// }
///
/// let found = index.find(state.hash_one("sphere"), "sphere", &things, |key, thing| {
///     *key == thing.name
/// });
/// assert_eq!(found, Some(1));
/// ```
pub struct HashIndex<P = u32, K = u64, S = usize, A = Global>
where
    P: Position,
    A: SlotAllocator<P>,
{
    hash_buckets: SlotBuffer<P>,
    index_chain: SlotBuffer<P>,

    hash_buckets_size: usize,
    index_chain_size: usize,
    hash_mask: usize,
    lookup_mask: usize,
    granularity: usize,

    alloc: A,

    _phantom: PhantomData<fn(K) -> S>,
}

impl<P, K, S> HashIndex<P, K, S, Global>
where
    P: Position,
    K: HashCode,
    S: SizeType,
{
    /// Creates an empty index with 1024 buckets and room for 1024 positions.
    ///
    /// No memory is allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let index: HashIndex = HashIndex::new();
    /// assert!(!index.is_allocated());
    /// assert_eq!(index.hash_buckets_size(), 1024);
    /// assert_eq!(index.index_chain_size(), 1024);
    /// ```
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty index with the given bucket count and index chain
    /// size.
    ///
    /// # Panics
    ///
    /// Panics if `hash_buckets_size` is not a power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let index: HashIndex = HashIndex::with_sizes(64, 100);
    /// assert_eq!(index.hash_buckets_size(), 64);
    /// assert_eq!(index.allocated_bytes(), 0);
    /// ```
    pub fn with_sizes(hash_buckets_size: S, index_chain_size: S) -> Self {
        Self::with_sizes_in(hash_buckets_size, index_chain_size, Global)
    }
}

impl<P, K, S, A> HashIndex<P, K, S, A>
where
    P: Position,
    K: HashCode,
    S: SizeType,
    A: SlotAllocator<P>,
{
    /// Creates an empty index with default sizes that allocates from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self::init(DEFAULT_INITIAL_SIZE, DEFAULT_INITIAL_SIZE, alloc)
    }

    /// Creates an empty index with the given sizes that allocates from
    /// `alloc`.
    ///
    /// # Panics
    ///
    /// Panics if `hash_buckets_size` is not a power of two.
    pub fn with_sizes_in(hash_buckets_size: S, index_chain_size: S, alloc: A) -> Self {
        Self::init(hash_buckets_size.to_usize(), index_chain_size.to_usize(), alloc)
    }

    fn init(hash_buckets_size: usize, index_chain_size: usize, alloc: A) -> Self {
        assert!(
            hash_buckets_size.is_power_of_two(),
            "size of the hash bucket table must be a power of two, got {hash_buckets_size}"
        );

        Self {
            hash_buckets: SlotBuffer::sentinel(),
            index_chain: SlotBuffer::sentinel(),
            hash_buckets_size,
            index_chain_size,
            hash_mask: hash_buckets_size - 1,
            lookup_mask: LOOKUP_UNALLOCATED,
            granularity: DEFAULT_GRANULARITY,
            alloc,
            _phantom: PhantomData,
        }
    }

    /// Returns the most recently inserted position for the bucket of `hash`,
    /// or [`Position::NULL`] if the bucket is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let mut index: HashIndex = HashIndex::new();
    /// assert_eq!(index.first(7), u32::MAX);
    ///
    /// index.insert(7, 0);
    /// index.insert(7, 1);
    /// assert_eq!(index.first(7), 1);
    /// ```
    #[inline(always)]
    pub fn first(&self, hash: K) -> P {
        // Power-of-two bucket counts let us reduce the hash with an AND. The
        // lookup mask is zero while unallocated, sending every hash to the
        // single null slot without a branch.
        self.hash_buckets.as_slice()[hash.bucket_bits() & self.hash_mask & self.lookup_mask]
    }

    /// Returns the position inserted into the same bucket right before
    /// `position`, or [`Position::NULL`] at the end of the chain.
    ///
    /// `position` must be below [`index_chain_size`](Self::index_chain_size).
    /// This is checked in debug builds only.
    #[inline(always)]
    pub fn next(&self, position: P) -> P {
        debug_assert!(
            position != P::NULL && position.to_usize() < self.index_chain_size,
            "position {position:?} is outside the index chain ({})",
            self.index_chain_size
        );
        self.index_chain.as_slice()[position.to_usize() & self.lookup_mask]
    }

    /// Returns an iterator over the chain for `hash`, most recent first.
    ///
    /// The chain covers the whole bucket, so positions inserted under other
    /// hashes that share the bucket are yielded too.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let mut index: HashIndex = HashIndex::with_sizes(4, 4);
    /// index.insert(0, 0);
    /// index.insert(4, 1);
    /// index.insert(8, 2);
    /// assert_eq!(index.iter_chain(0).collect::<Vec<_>>(), vec![2, 1, 0]);
    /// ```
    pub fn iter_chain(&self, hash: K) -> ChainIter<'_, P, K, S, A> {
        ChainIter {
            index: self,
            current: self.first(hash),
        }
    }

    /// Returns `true` if `position` is reachable from the bucket of `hash`.
    pub fn contains(&self, hash: K, position: P) -> bool {
        self.iter_chain(hash).any(|p| p == position)
    }

    /// Finds the first position in the chain for `hash` whose item in
    /// `collection` satisfies `eq(needle, item)`.
    ///
    /// Only positions in the chain are visited, so the cost is proportional
    /// to the bucket's chain length.
    ///
    /// # Arguments
    ///
    /// * `hash` - The hash code `needle` was inserted under
    /// * `needle` - The key being looked up
    /// * `collection` - The external array the positions refer to
    /// * `eq` - Compares the key against a stored item
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let names = ["a", "b", "c"];
    /// let mut index: HashIndex = HashIndex::new();
    /// for (i, name) in names.iter().enumerate() {
    ///     index.insert(name.len() as u64, i as u32);
    /// }
    ///
    /// assert_eq!(index.find(1, "b", &names[..], |k, item| k == *item), Some(1));
    /// assert_eq!(index.find(1, "z", &names[..], |k, item| k == *item), None);
    /// ```
    pub fn find<Q, C>(
        &self,
        hash: K,
        needle: &Q,
        collection: &C,
        eq: impl Fn(&Q, &C::Output) -> bool,
    ) -> Option<P>
    where
        Q: ?Sized,
        C: Index<usize> + ?Sized,
    {
        self.iter_chain(hash)
            .find(|&position| eq(needle, &collection[position.to_usize()]))
    }

    /// Like [`find`](Self::find), comparing with `==`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let values = vec![10u64, 20, 30];
    /// let mut index: HashIndex = HashIndex::new();
    /// for (i, v) in values.iter().enumerate() {
    ///     index.insert(*v, i as u32);
    /// }
    /// assert_eq!(index.find_eq(20, &20u64, &values), Some(1));
    /// ```
    pub fn find_eq<Q, C>(&self, hash: K, needle: &Q, collection: &C) -> Option<P>
    where
        Q: PartialEq<C::Output> + ?Sized,
        C: Index<usize> + ?Sized,
    {
        self.find(hash, needle, collection, |needle, item| needle == item)
    }

    /// Prepends `position` to the chain for `hash`.
    ///
    /// Allocates on first use and grows the index chain when `position` is
    /// beyond its capacity.
    ///
    /// No deduplication is done. Inserting a position that is already linked
    /// somewhere overwrites its chain slot, detaching whatever followed it in
    /// the old chain. [`erase`](Self::erase) it first.
    pub fn insert(&mut self, hash: K, position: P) {
        debug_assert!(position != P::NULL, "the null position cannot be inserted");
        let index = position.to_usize();

        if !self.is_allocated() {
            let index_chain_size = if index >= self.index_chain_size {
                index + 1
            } else {
                self.index_chain_size
            };
            self.allocate(self.hash_buckets_size, index_chain_size);
        } else if index >= self.index_chain_size {
            self.grow_index_chain(index + 1);
        }

        let bucket = hash.bucket_bits() & self.hash_mask;
        let buckets = self.hash_buckets.as_mut_slice();
        self.index_chain.as_mut_slice()[index] = buckets[bucket];
        buckets[bucket] = position;
    }

    /// Unlinks `position` from the chain for `hash`.
    ///
    /// Does nothing if the index is unallocated or `position` is not in that
    /// chain. `position` must be below
    /// [`index_chain_size`](Self::index_chain_size).
    pub fn erase(&mut self, hash: K, position: P) {
        debug_assert!(
            position != P::NULL && position.to_usize() < self.index_chain_size,
            "position {position:?} is outside the index chain ({})",
            self.index_chain_size
        );

        if !self.is_allocated() {
            return;
        }

        let index = position.to_usize();
        let bucket = hash.bucket_bits() & self.hash_mask;
        let buckets = self.hash_buckets.as_mut_slice();
        let chain = self.index_chain.as_mut_slice();

        if buckets[bucket] == position {
            buckets[bucket] = chain[index];
            chain[index] = P::NULL;
            return;
        }

        let mut current = buckets[bucket];
        while current != P::NULL {
            let slot = current.to_usize();
            if chain[slot] == position {
                chain[slot] = chain[index];
                chain[index] = P::NULL;
                return;
            }
            current = chain[slot];
        }
    }

    /// Inserts `position` and shifts every stored position `>= position` up
    /// by one.
    ///
    /// Use this when an item was inserted in the middle of the external
    /// array. Runs in time proportional to the bucket table plus the index
    /// chain.
    pub fn insert_at_index(&mut self, hash: K, position: P) {
        if !self.is_allocated() {
            self.insert(hash, position);
            return;
        }

        let index = position.to_usize();
        let mut max = index;
        for slot in self
            .hash_buckets
            .as_mut_slice()
            .iter_mut()
            .chain(self.index_chain.as_mut_slice().iter_mut())
        {
            if *slot != P::NULL && *slot >= position {
                let shifted = slot.to_usize() + 1;
                *slot = P::from_usize(shifted);
                max = max.max(shifted);
            }
        }

        if max >= self.index_chain_size {
            self.grow_index_chain(max + 1);
        }

        let chain = self.index_chain.as_mut_slice();
        chain.copy_within(index..max, index + 1);
        chain[index] = P::NULL;

        self.insert(hash, position);
    }

    /// Erases `position` and shifts every stored position above it down by
    /// one.
    ///
    /// Use this when an item was removed from the middle of the external
    /// array. Runs in time proportional to the bucket table plus the index
    /// chain.
    pub fn erase_and_remove_index(&mut self, hash: K, position: P) {
        debug_assert!(
            position != P::NULL && position.to_usize() < self.index_chain_size,
            "position {position:?} is outside the index chain ({})",
            self.index_chain_size
        );

        if !self.is_allocated() {
            return;
        }

        self.erase(hash, position);

        let index = position.to_usize();
        let mut max = index;
        for slot in self
            .hash_buckets
            .as_mut_slice()
            .iter_mut()
            .chain(self.index_chain.as_mut_slice().iter_mut())
        {
            if *slot == P::NULL {
                continue;
            }
            if *slot == position {
                // Only reachable when `position` was linked under a hash
                // other than `hash`; its item is gone either way.
                *slot = P::NULL;
            } else if *slot > position {
                let value = slot.to_usize();
                max = max.max(value);
                *slot = P::from_usize(value - 1);
            }
        }

        let chain = self.index_chain.as_mut_slice();
        chain.copy_within(index + 1..=max, index);
        chain[max] = P::NULL;
    }

    /// Empties every bucket and chain slot, keeping both arrays allocated.
    pub fn clear(&mut self) {
        if self.is_allocated() {
            self.hash_buckets.as_mut_slice().fill(P::NULL);
            // The shift operations scan every chain slot, so none may keep a
            // position from before the clear.
            self.index_chain.as_mut_slice().fill(P::NULL);
        }
    }

    /// Frees both arrays and records new sizes for the next allocation.
    ///
    /// # Panics
    ///
    /// Panics if `hash_buckets_size` is not a power of two.
    pub fn clear_and_resize(&mut self, hash_buckets_size: S, index_chain_size: S) {
        let hash_buckets_size = hash_buckets_size.to_usize();
        assert!(
            hash_buckets_size.is_power_of_two(),
            "size of the hash bucket table must be a power of two, got {hash_buckets_size}"
        );

        self.clear_and_free();
        self.hash_buckets_size = hash_buckets_size;
        self.index_chain_size = index_chain_size.to_usize();
        self.hash_mask = hash_buckets_size - 1;

        trace!(
            "hash index resized to {} buckets, {} chain slots (deferred)",
            self.hash_buckets_size, self.index_chain_size
        );
    }

    /// Frees both arrays, returning to the unallocated state.
    ///
    /// The recorded sizes are kept and used by the next allocation.
    pub fn clear_and_free(&mut self) {
        if !self.is_allocated() {
            return;
        }

        trace!(
            "freeing hash index: {} buckets, {} chain slots",
            self.hash_buckets_size, self.index_chain_size
        );
        self.hash_buckets.release(&self.alloc);
        self.index_chain.release(&self.alloc);
        self.lookup_mask = LOOKUP_UNALLOCATED;
    }

    /// Sets the rounding unit for index chain growth.
    ///
    /// Powers of two work best, but any non-zero value is accepted.
    ///
    /// # Panics
    ///
    /// Panics if `granularity` is zero.
    pub fn set_granularity(&mut self, granularity: S) {
        let granularity = granularity.to_usize();
        assert!(granularity > 0, "granularity must be non-zero");
        self.granularity = granularity;
    }

    /// Grows the index chain to at least `index_chain_size` slots, rounded up
    /// to a multiple of the granularity.
    ///
    /// Never shrinks. While unallocated, only the size for the first
    /// allocation is recorded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let mut index: HashIndex = HashIndex::with_sizes(16, 16);
    /// index.set_granularity(16);
    /// index.insert(0, 0);
    ///
    /// index.resize_index_chain(17);
    /// assert_eq!(index.index_chain_size(), 32);
    ///
    /// index.resize_index_chain(8);
    /// assert_eq!(index.index_chain_size(), 32);
    /// ```
    pub fn resize_index_chain(&mut self, index_chain_size: S) {
        self.grow_index_chain(index_chain_size.to_usize());
    }

    fn grow_index_chain(&mut self, requested: usize) {
        if requested <= self.index_chain_size {
            return;
        }

        let new_size = match requested % self.granularity {
            0 => requested,
            rem => requested + (self.granularity - rem),
        };

        if self.index_chain.is_sentinel() {
            trace!(
                "deferring hash index chain growth {} -> {}",
                self.index_chain_size, new_size
            );
            self.index_chain_size = new_size;
            return;
        }

        trace!(
            "growing hash index chain {} -> {}",
            self.index_chain_size, new_size
        );
        self.index_chain.grow(&self.alloc, new_size, P::NULL);
        self.index_chain_size = new_size;
    }

    fn allocate(&mut self, hash_buckets_size: usize, index_chain_size: usize) {
        assert!(
            hash_buckets_size.is_power_of_two(),
            "size of the hash bucket table must be a power of two, got {hash_buckets_size}"
        );

        self.clear_and_free();

        trace!(
            "allocating hash index: {} buckets, {} chain slots",
            hash_buckets_size, index_chain_size
        );
        self.hash_buckets = SlotBuffer::filled(&self.alloc, hash_buckets_size, P::NULL);
        self.index_chain = SlotBuffer::filled(&self.alloc, index_chain_size, P::NULL);
        self.hash_buckets_size = hash_buckets_size;
        self.index_chain_size = index_chain_size;
        self.hash_mask = hash_buckets_size - 1;
        self.lookup_mask = LOOKUP_ALLOCATED;
    }

    /// Scores how evenly positions are spread over the buckets, from 0 to
    /// 100.
    ///
    /// Returns 100 for an index holding zero or one position. Otherwise each
    /// bucket whose chain length is more than one away from the average adds
    /// the excess to an error total, and the score is
    /// `100 - error * 100 / items`, floored at 0. Low scores point at a poor
    /// hash function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let mut spread: HashIndex = HashIndex::with_sizes(64, 64);
    /// let mut clustered: HashIndex = HashIndex::with_sizes(64, 64);
    /// for i in 0..64u32 {
    ///     spread.insert(i as u64, i);
    ///     clustered.insert(0, i);
    /// }
    /// assert_eq!(spread.compute_distribution_percentage(), 100);
    /// assert!(clustered.compute_distribution_percentage() < 10);
    /// ```
    pub fn compute_distribution_percentage(&self) -> S {
        S::from_usize(self.distribution_percentage())
    }

    fn distribution_percentage(&self) -> usize {
        if !self.is_allocated() {
            return 100;
        }

        let lengths = self.chain_lengths();
        let total_items: usize = lengths.iter().sum();
        if total_items <= 1 {
            return 100;
        }

        let average = total_items / self.hash_buckets_size;
        let error: usize = lengths
            .iter()
            .map(|&length| length.abs_diff(average).saturating_sub(1))
            .sum();

        100usize.saturating_sub(error * 100 / total_items)
    }

    /// Chain length of every bucket, in bucket order.
    fn chain_lengths(&self) -> alloc::vec::Vec<usize> {
        let mut lengths = vec![0usize; self.hash_buckets_size];
        if !self.is_allocated() {
            return lengths;
        }

        let chain = self.index_chain.as_slice();
        for (length, &head) in lengths.iter_mut().zip(self.hash_buckets.as_slice()) {
            let mut current = head;
            while current != P::NULL {
                *length += 1;
                current = chain[current.to_usize()];
            }
        }
        lengths
    }

    /// Bytes held by both arrays, or 0 while unallocated.
    pub fn allocated_bytes(&self) -> S {
        if !self.is_allocated() {
            return S::from_usize(0);
        }
        S::from_usize((self.hash_buckets_size + self.index_chain_size) * size_of::<P>())
    }

    /// Number of buckets. Always a power of two.
    pub fn hash_buckets_size(&self) -> S {
        S::from_usize(self.hash_buckets_size)
    }

    /// Number of index chain slots, or the size the first allocation will use
    /// while unallocated.
    pub fn index_chain_size(&self) -> S {
        S::from_usize(self.index_chain_size)
    }

    /// Rounding unit for index chain growth.
    pub fn granularity(&self) -> S {
        S::from_usize(self.granularity)
    }

    /// Returns `true` once the arrays have been allocated.
    pub fn is_allocated(&self) -> bool {
        self.lookup_mask == LOOKUP_ALLOCATED
    }

    /// Exchanges the contents of two indexes without copying either array.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Moves the contents out, leaving a default, unallocated index behind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_index::HashIndex;
    /// #
    /// let mut index: HashIndex = HashIndex::new();
    /// index.insert(1, 0);
    ///
    /// let moved = index.take();
    /// assert!(moved.is_allocated());
    /// assert!(!index.is_allocated());
    /// assert_eq!(index.allocated_bytes(), 0);
    /// ```
    pub fn take(&mut self) -> Self
    where
        A: Default,
    {
        let mut taken = Self::new_in(A::default());
        self.swap(&mut taken);
        taken
    }

    /// Counts how many buckets have each chain length.
    ///
    /// Entry `n` of the result is the number of buckets whose chain holds
    /// exactly `n` positions.
    ///
    /// Requires the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_length_histogram(&self) -> ChainHistogram {
        let lengths = self.chain_lengths();
        let longest = lengths.iter().copied().max().unwrap_or(0);

        let mut counts = vec![0usize; longest + 1];
        for length in lengths {
            counts[length] += 1;
        }
        ChainHistogram { counts }
    }

    /// Returns occupancy and memory statistics for debugging.
    ///
    /// Requires the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let lengths = self.chain_lengths();
        DebugStats {
            allocated: self.is_allocated(),
            hash_buckets: self.hash_buckets_size,
            used_buckets: lengths.iter().filter(|&&length| length > 0).count(),
            items: lengths.iter().sum(),
            longest_chain: lengths.iter().copied().max().unwrap_or(0),
            index_chain_slots: self.index_chain_size,
            granularity: self.granularity,
            total_bytes: self.allocated_bytes().to_usize(),
            distribution: self.distribution_percentage(),
        }
    }
}

// SAFETY: Both buffers are uniquely owned by the index, or point at the
// immutable null slot. Moving the index moves that ownership along with the
// allocator that frees it.
unsafe impl<P, K, S, A> Send for HashIndex<P, K, S, A>
where
    P: Position + Send,
    A: SlotAllocator<P> + Send,
{
}

// SAFETY: Shared references only read the buffers.
unsafe impl<P, K, S, A> Sync for HashIndex<P, K, S, A>
where
    P: Position + Sync,
    A: SlotAllocator<P> + Sync,
{
}

impl<P, K, S> Default for HashIndex<P, K, S, Global>
where
    P: Position,
    K: HashCode,
    S: SizeType,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, K, S, A> Clone for HashIndex<P, K, S, A>
where
    P: Position,
    K: HashCode,
    S: SizeType,
    A: SlotAllocator<P> + Clone,
{
    fn clone(&self) -> Self {
        let alloc = self.alloc.clone();
        Self {
            hash_buckets: self.hash_buckets.duplicate(&alloc),
            index_chain: self.index_chain.duplicate(&alloc),
            hash_buckets_size: self.hash_buckets_size,
            index_chain_size: self.index_chain_size,
            hash_mask: self.hash_mask,
            lookup_mask: self.lookup_mask,
            granularity: self.granularity,
            alloc,
            _phantom: PhantomData,
        }
    }
}

impl<P, K, S, A> PartialEq for HashIndex<P, K, S, A>
where
    P: Position,
    K: HashCode,
    S: SizeType,
    A: SlotAllocator<P>,
{
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }

        if self.hash_buckets_size != other.hash_buckets_size
            || self.index_chain_size != other.index_chain_size
            || self.hash_mask != other.hash_mask
            || self.lookup_mask != other.lookup_mask
            || self.granularity != other.granularity
        {
            return false;
        }

        // Same lookup mask, so both are allocated or neither is.
        if !self.is_allocated() {
            return true;
        }

        self.hash_buckets.as_slice() == other.hash_buckets.as_slice()
            && self.index_chain.as_slice() == other.index_chain.as_slice()
    }
}

impl<P, K, S, A> Eq for HashIndex<P, K, S, A>
where
    P: Position,
    K: HashCode,
    S: SizeType,
    A: SlotAllocator<P>,
{
}

impl<P, K, S, A> Debug for HashIndex<P, K, S, A>
where
    P: Position,
    A: SlotAllocator<P>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashIndex")
            .field("allocated", &(self.lookup_mask == LOOKUP_ALLOCATED))
            .field("hash_buckets_size", &self.hash_buckets_size)
            .field("index_chain_size", &self.index_chain_size)
            .field("granularity", &self.granularity)
            .finish()
    }
}

impl<P, K, S, A> Drop for HashIndex<P, K, S, A>
where
    P: Position,
    A: SlotAllocator<P>,
{
    fn drop(&mut self) {
        self.hash_buckets.release(&self.alloc);
        self.index_chain.release(&self.alloc);
    }
}

/// Iterator over the positions chained under one bucket.
///
/// Created by [`HashIndex::iter_chain`].
pub struct ChainIter<'a, P, K, S, A>
where
    P: Position,
    A: SlotAllocator<P>,
{
    index: &'a HashIndex<P, K, S, A>,
    current: P,
}

impl<P, K, S, A> Iterator for ChainIter<'_, P, K, S, A>
where
    P: Position,
    K: HashCode,
    S: SizeType,
    A: SlotAllocator<P>,
{
    type Item = P;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == P::NULL {
            return None;
        }

        let position = self.current;
        self.current = self.index.next(position);
        Some(position)
    }
}

/// Columns used by the longest bar of [`ChainHistogram::print`].
#[cfg(any(test, feature = "stats"))]
const HISTOGRAM_WIDTH: usize = 50;

/// Number of buckets per chain length.
///
/// Requires the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHistogram {
    /// `counts[n]` is the number of buckets holding exactly `n` positions.
    pub counts: alloc::vec::Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ChainHistogram {
    /// Number of buckets counted.
    pub fn buckets(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Length of the bar for a row holding `count` buckets. The fullest row
    /// spans [`HISTOGRAM_WIDTH`] columns and any non-empty row gets at least
    /// one.
    #[cfg(any(test, feature = "std"))]
    fn bar_len(&self, count: usize) -> usize {
        let fullest = self.counts.iter().copied().max().unwrap_or(0);
        if count == 0 || fullest == 0 {
            return 0;
        }
        (count * HISTOGRAM_WIDTH).div_ceil(fullest)
    }

    /// Prints one row per chain length that occurs, with the share of
    /// buckets holding it.
    ///
    /// Requires the `std` feature.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let buckets = self.buckets();
        if buckets == 0 {
            println!("chain histogram: empty");
            return;
        }

        println!("chain lengths over {buckets} buckets:");
        for (length, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let share = count as f64 * 100.0 / buckets as f64;
            println!(
                "{length:>4} | {:<width$} {count} ({share:.1}%)",
                "#".repeat(self.bar_len(count)),
                width = HISTOGRAM_WIDTH,
            );
        }
    }
}

/// Debug statistics for hash index analysis.
///
/// Requires the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugStats {
    /// Whether the arrays are allocated
    pub allocated: bool,
    /// Number of buckets
    pub hash_buckets: usize,
    /// Number of buckets with a non-empty chain
    pub used_buckets: usize,
    /// Number of positions reachable from the buckets
    pub items: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Number of index chain slots
    pub index_chain_slots: usize,
    /// Index chain growth granularity
    pub granularity: usize,
    /// Total memory in bytes used by both arrays
    pub total_bytes: usize,
    /// Result of [`HashIndex::compute_distribution_percentage`]
    pub distribution: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Index Debug Statistics ===");
        if !self.allocated {
            println!("Unallocated ({} buckets pending)", self.hash_buckets);
            return;
        }
        println!(
            "Buckets: {}/{} used ({:.2}%)",
            self.used_buckets,
            self.hash_buckets,
            self.used_buckets as f64 / self.hash_buckets as f64 * 100.0
        );
        println!(
            "Items: {} (longest chain {})",
            self.items, self.longest_chain
        );
        println!(
            "Index chain: {} slots (granularity {})",
            self.index_chain_slots, self.granularity
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!("Distribution: {}%", self.distribution);
    }
}
