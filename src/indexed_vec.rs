use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::hash_index::HashIndex;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hash builder used by [`DefaultIndexedVec`].
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hash builder used by [`DefaultIndexedVec`].
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}

/// An [`IndexedVec`] using the crate's default hash builder.
#[cfg(any(feature = "foldhash", feature = "std"))]
pub type DefaultIndexedVec<T> = IndexedVec<T, DefaultHashBuilder>;

/// A vector that can look its items up by value.
///
/// `IndexedVec<T, S>` owns a `Vec<T>` and keeps a [`HashIndex`] from the hash
/// of each item to its position. Items keep their insertion order and may
/// repeat; lookups return the most recently inserted match.
///
/// # Performance Characteristics
///
/// - **Memory**: one `usize` per item plus one per bucket, on top of the
///   items themselves.
/// - **Ordered insert/remove**: `O(buckets + len)` because every stored
///   position above the affected one is shifted.
#[derive(Clone)]
pub struct IndexedVec<T, S> {
    values: Vec<T>,
    index: HashIndex<usize, u64>,
    hash_builder: S,
}

impl<T, S> Debug for IndexedVec<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl<T, S> PartialEq for IndexedVec<T, S>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<T, S> Eq for IndexedVec<T, S> where T: Eq {}

impl<T, S> IndexedVec<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty vector with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use chain_index::IndexedVec;
    ///
    /// let values: IndexedVec<i32, _> = IndexedVec::with_hasher(RandomState::new());
    /// assert!(values.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            values: Vec::new(),
            index: HashIndex::new(),
            hash_builder,
        }
    }

    /// Creates an empty vector with room for `capacity` items and a bucket
    /// per item, rounded up to a power of two.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let buckets = capacity.max(1).next_power_of_two();
        Self {
            values: Vec::with_capacity(capacity),
            index: HashIndex::with_sizes(buckets, capacity),
            hash_builder,
        }
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the items in order.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Returns an iterator over the items in order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Returns the item at `position`.
    pub fn get(&self, position: usize) -> Option<&T> {
        self.values.get(position)
    }

    /// Returns the index backing lookups.
    pub fn index(&self) -> &HashIndex<usize, u64> {
        &self.index
    }

    fn hash<Q: Hash + ?Sized>(&self, value: &Q) -> u64 {
        self.hash_builder.hash_one(value)
    }

    /// Appends `value` and returns its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_index::DefaultIndexedVec;
    ///
    /// let mut values = DefaultIndexedVec::new();
    /// assert_eq!(values.push("a"), 0);
    /// assert_eq!(values.push("b"), 1);
    /// assert_eq!(values.position_of("b"), Some(1));
    /// # }
    /// ```
    pub fn push(&mut self, value: T) -> usize {
        let position = self.values.len();
        let hash = self.hash(&value);
        self.index.insert(hash, position);
        self.values.push(value);
        position
    }

    /// Returns the position of the most recently inserted item equal to
    /// `key`.
    pub fn position_of<Q>(&self, key: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .find(self.hash(key), key, &self.values[..], |key, item| {
                <T as Borrow<Q>>::borrow(item) == key
            })
    }

    /// Returns the most recently inserted item equal to `key`.
    pub fn get_by_key<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.position_of(key).map(|position| &self.values[position])
    }

    /// Returns `true` if an item equal to `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.position_of(key).is_some()
    }

    /// Inserts `value` at `position`, shifting later items to the right.
    ///
    /// # Panics
    ///
    /// Panics if `position > len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_index::DefaultIndexedVec;
    ///
    /// let mut values = DefaultIndexedVec::new();
    /// values.push('a');
    /// values.push('c');
    /// values.insert(1, 'b');
    ///
    /// assert_eq!(values.as_slice(), &['a', 'b', 'c']);
    /// assert_eq!(values.position_of(&'c'), Some(2));
    /// # }
    /// ```
    pub fn insert(&mut self, position: usize, value: T) {
        assert!(
            position <= self.values.len(),
            "insertion position {position} is past the end ({})",
            self.values.len()
        );

        if position == self.values.len() {
            self.push(value);
            return;
        }

        let hash = self.hash(&value);
        self.index.insert_at_index(hash, position);
        self.values.insert(position, value);
    }

    /// Removes the item at `position`, shifting later items to the left.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len`.
    pub fn remove(&mut self, position: usize) -> T {
        assert!(
            position < self.values.len(),
            "removal position {position} is out of bounds ({})",
            self.values.len()
        );

        let hash = self.hash(&self.values[position]);
        self.index.erase_and_remove_index(hash, position);
        self.values.remove(position)
    }

    /// Removes the item at `position`, moving the last item into its place.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len`.
    pub fn swap_remove(&mut self, position: usize) -> T {
        assert!(
            position < self.values.len(),
            "removal position {position} is out of bounds ({})",
            self.values.len()
        );

        let last = self.values.len() - 1;
        let hash = self.hash(&self.values[position]);
        self.index.erase(hash, position);

        if position != last {
            let last_hash = self.hash(&self.values[last]);
            self.index.erase(last_hash, last);
            self.index.insert(last_hash, position);
        }

        self.values.swap_remove(position)
    }

    /// Removes and returns the last item.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.values.len().checked_sub(1)?;
        let hash = self.hash(&self.values[last]);
        self.index.erase(hash, last);
        self.values.pop()
    }

    /// Removes every item, keeping the allocated index.
    pub fn clear(&mut self) {
        self.values.clear();
        self.index.clear();
    }
}

impl<T, S> IndexedVec<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty vector using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty vector with room for `capacity` items using the
    /// default hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S> Default for IndexedVec<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> Extend<T> for IndexedVec<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, S> FromIterator<T> for IndexedVec<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut values = Self::new();
        values.extend(iter);
        values
    }
}

impl<'a, T, S> IntoIterator for &'a IndexedVec<T, S> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
