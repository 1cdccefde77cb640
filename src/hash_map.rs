use core::fmt::Debug;

use crate::capacity::Indexing;
use crate::capacity::SizeClass;
use crate::capacity::checked_map_slots;
use crate::error::Error;
use crate::error::Result;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::hash_table::MergeStats;
use crate::strategy::Identity;
use crate::strategy::KeyStrategy;

/// A fixed-capacity map stored in a single open-addressing [`HashTable`].
///
/// `FixedMap<K, V, S>` stores key-value pairs inline and uses the strategy
/// `S` to hash and compare keys. The slot array is allocated once: a map
/// created with capacity hint `n` has exactly `max(2, 2 * n)` slots and
/// accepts at most half of them as entries. Inserting a new key beyond that
/// fails with [`Error::CapacityExceeded`](crate::Error::CapacityExceeded);
/// replacing the value of a stored key always succeeds.
///
/// Scalar keys use [`Identity`] by default. String-like keys need a
/// content-based strategy such as
/// [`DefaultHashed`](crate::strategy::DefaultHashed).
///
/// # Memory
///
/// Every slot holds a tag, a `u64` hash and an inline `(K, V)`.
#[derive(Clone)]
pub struct FixedMap<K, V, S = Identity> {
    table: HashTable<(K, V)>,
    strategy: S,
}

impl<K, V, S> Debug for FixedMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.table.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S> FixedMap<K, V, S>
where
    S: KeyStrategy<K>,
{
    /// Creates an empty map with room for `capacity` entries, using the given
    /// key strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    /// use buffer_collections::Identity;
    ///
    /// let map: FixedMap<u16, &str> = FixedMap::with_capacity_and_strategy(11, Identity);
    /// assert_eq!(map.capacity(), 22);
    /// assert_eq!(map.limit(), 11);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `2 * capacity` overflows `usize`.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: S) -> Self {
        Self {
            table: HashTable::for_map(capacity),
            strategy,
        }
    }

    /// Like [`FixedMap::with_capacity_and_strategy`], but reports allocation
    /// failure as [`Error::Allocation`](crate::Error::Allocation).
    ///
    /// A slot count that does not fit in `usize` is reported the same way,
    /// with `slots` set to `usize::MAX`.
    pub fn try_with_capacity_and_strategy(capacity: usize, strategy: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::try_with_slots(
                checked_map_slots(capacity).ok_or(Error::Allocation { slots: usize::MAX })?,
                Indexing::Modulo,
            )?,
            strategy,
        })
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str> = FixedMap::with_capacity(2);
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the map.
    ///
    /// This is fixed at construction and is twice the capacity hint.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the maximum number of entries the map accepts.
    pub fn limit(&self) -> usize {
        self.table.limit()
    }

    /// Returns `true` if no new key can be inserted.
    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }

    /// The key strategy this map was built with.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Removes all entries from the map. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns the previous value if the key was already present. If the key
    /// is new and the map is at its limit, returns
    /// [`Error::CapacityExceeded`](crate::Error::CapacityExceeded) and leaves
    /// the map unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::Error;
    /// use buffer_collections::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str> = FixedMap::with_capacity(1);
    /// assert_eq!(map.insert(37, "a"), Ok(None));
    /// assert_eq!(map.insert(37, "b"), Ok(Some("a")));
    /// assert_eq!(
    ///     map.insert(38, "c"),
    ///     Err(Error::CapacityExceeded { len: 1, limit: 1 })
    /// );
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let hash = self.strategy.hash(&key);
        let strategy = &self.strategy;
        match self.table.entry(hash, |(k, _)| strategy.eq(k, &key))? {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Ok(Some(old_value))
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                Ok(None)
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str> = FixedMap::with_capacity(4);
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.strategy.hash(key);
        self.table
            .find(hash, |(k, _)| self.strategy.eq(k, key))
            .map(|(_, v)| v)
    }

    /// Returns a clone of the value for `key`, or `fallback` if the key is
    /// absent.
    pub fn get_or(&self, key: &K, fallback: V) -> V
    where
        V: Clone,
    {
        match self.get(key) {
            Some(value) => value.clone(),
            None => fallback,
        }
    }

    /// Returns a clone of the value for `key`, or `V::default()` if the key
    /// is absent.
    ///
    /// The zero value is indistinguishable from a stored default; use
    /// [`FixedMap::get`] or [`FixedMap::contains_key`] when that matters.
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    ///
    /// let mut map: FixedMap<u8, u32> = FixedMap::with_capacity(4);
    /// map.insert(1, 10).unwrap();
    /// assert_eq!(map.get_or_zero(&1), 10);
    /// assert_eq!(map.get_or_zero(&2), 0);
    /// ```
    pub fn get_or_zero(&self, key: &K) -> V
    where
        V: Default + Clone,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.strategy.hash(key);
        let strategy = &self.strategy;
        self.table
            .find_mut(hash, |(k, _)| strategy.eq(k, key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning the value if the key was
    /// present.
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str> = FixedMap::with_capacity(4);
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.strategy.hash(key);
        let strategy = &self.strategy;
        self.table.remove(hash, |(k, _)| strategy.eq(k, key))
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// Fails with [`Error::CapacityExceeded`](crate::Error::CapacityExceeded)
    /// only when the key is absent and the map is at its limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    ///
    /// let mut counts: FixedMap<char, u32> = FixedMap::with_capacity(8);
    /// for c in "abracadabra".chars() {
    ///     *counts.entry(c).unwrap().or_default() += 1;
    /// }
    /// assert_eq!(counts.get(&'a'), Some(&5));
    /// assert_eq!(counts.len(), 5);
    /// ```
    pub fn entry(&mut self, key: K) -> Result<Entry<'_, K, V>> {
        let hash = self.strategy.hash(&key);
        let strategy = &self.strategy;
        Ok(match self.table.entry(hash, |(k, _)| strategy.eq(k, &key))? {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        })
    }

    /// Inserts a clone of every entry of `other`, in `other`'s slot order.
    ///
    /// Keys already present are overwritten. Entries that do not fit are
    /// skipped while the rest are still inserted; the returned
    /// [`MergeStats`] says how many were left out.
    ///
    /// ```rust
    /// use buffer_collections::fixed_map;
    /// use buffer_collections::FixedMap;
    ///
    /// let source = fixed_map! { 1 => 'a', 2 => 'b' };
    /// let mut dest: FixedMap<i32, char> = FixedMap::with_capacity(4);
    /// dest.insert(2, 'z').unwrap();
    ///
    /// let stats = dest.add_all(&source);
    /// assert_eq!((stats.inserted, stats.overwritten, stats.rejected), (1, 1, 0));
    /// assert_eq!(dest.get(&2), Some(&'b'));
    /// ```
    pub fn add_all<S2>(&mut self, other: &FixedMap<K, V, S2>) -> MergeStats
    where
        K: Clone,
        V: Clone,
    {
        let strategy = &self.strategy;
        self.table.merge_from(
            &other.table,
            |(k, _)| strategy.hash(k),
            |(a, _), (b, _)| strategy.eq(a, b),
        )
    }

    /// Returns an iterator over the key-value pairs of the map, in slot
    /// order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the key-value pairs with mutable references
    /// to the values.
    ///
    /// ```rust
    /// use buffer_collections::fixed_map;
    ///
    /// let mut map = fixed_map! { 1 => 10, 2 => 20 };
    /// for (_, value) in map.iter_mut() {
    ///     *value += 1;
    /// }
    /// assert_eq!(map.get(&2), Some(&21));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Removes all entries from the map and returns them as an iterator.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Read access to the underlying table, for statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn table(&self) -> &HashTable<(K, V)> {
        &self.table
    }

    fn extend_fitting(&mut self, entries: impl IntoIterator<Item = (K, V)>) {
        for (key, value) in entries {
            let hash = self.strategy.hash(&key);
            let strategy = &self.strategy;
            let outcome = self
                .table
                .insert(hash, (key, value), |(a, _), (b, _)| strategy.eq(a, b));
            debug_assert!(outcome.is_stored(), "literal entries exceed the map size");
        }
    }
}

impl<K, V, S> FixedMap<K, V, S>
where
    S: KeyStrategy<K> + Default,
{
    /// Creates an empty map with room for `capacity` entries.
    ///
    /// The map has exactly `max(2, 2 * capacity)` slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    ///
    /// let map: FixedMap<i32, i32> = FixedMap::with_capacity(4);
    /// assert_eq!(map.capacity(), 8);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `2 * capacity` overflows `usize`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, S::default())
    }

    /// Like [`FixedMap::with_capacity`], but reports allocation failure
    /// instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::try_with_capacity_and_strategy(capacity, S::default())
    }

    /// Creates an empty map sized by one of the preset size classes.
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    /// use buffer_collections::SizeClass;
    ///
    /// let map: FixedMap<u32, u32> = FixedMap::with_size_class(SizeClass::S16);
    /// assert_eq!(map.capacity(), 32);
    /// ```
    pub fn with_size_class(class: SizeClass) -> Self {
        Self::with_capacity(class.hint())
    }

    /// Builds a map from a list of entries, inserted in order.
    ///
    /// The capacity hint is the number of listed entries, so every entry
    /// fits. A key listed twice keeps its last value.
    ///
    /// ```rust
    /// use buffer_collections::FixedMap;
    ///
    /// let map: FixedMap<i32, i32> = FixedMap::from_entries([(1, 1), (2, 2), (1, 3)]);
    /// assert_eq!(map.capacity(), 6);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&1), Some(&3));
    /// ```
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        Self::from_entries_with_capacity(0, entries)
    }

    /// Builds a map from a list of entries with an explicit capacity hint.
    ///
    /// A hint smaller than the number of entries is raised to it.
    pub fn from_entries_with_capacity<I>(capacity: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let entries = entries.into_iter();
        let mut map = Self::with_capacity(capacity.max(entries.len()));
        map.extend_fitting(entries);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a FixedMap<K, V, S>
where
    S: KeyStrategy<K>,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single entry in a map, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`FixedMap`].
///
/// [`entry`]: FixedMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry. The map has room for it.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value in the entry and returns the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `FixedMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the key-value pairs of a `FixedMap`, with mutable
/// values.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `FixedMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `FixedMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `FixedMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
