//! The open-addressing engine shared by [`FixedMap`](crate::FixedMap) and
//! [`FixedSet`](crate::FixedSet).
//!
//! A `HashTable<V>` is a single boxed slice of slots that is allocated once
//! and never grows. Collisions are resolved by linear probing, removals leave
//! tombstones, and new entries are only accepted while at most half of the
//! slots are occupied.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::capacity::Indexing;
use crate::capacity::map_slots;
use crate::capacity::set_slots;
use crate::error::Error;
use crate::error::Result;

#[derive(Clone)]
enum Slot<V> {
    Empty,
    Occupied { hash: u64, value: V },
    Deleted,
}

impl<V> Slot<V> {
    #[inline(always)]
    fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline(always)]
    fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Result of a probe sequence.
enum Probe {
    /// An occupied slot holding a matching value.
    Found(usize),
    /// The value is absent; this is the slot a new entry should take.
    Vacant(usize),
    /// Every slot is occupied by a different value.
    Exhausted,
}

/// Outcome of [`HashTable::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<V> {
    /// The value took a free slot; the table grew by one.
    Inserted,
    /// A matching value was already stored and has been replaced. Carries
    /// the previous value.
    Overwritten(V),
    /// The table is at its fill limit. Carries the value that was not
    /// inserted; the table is unchanged.
    Rejected(V),
}

impl<V> InsertOutcome<V> {
    /// Returns `true` unless the insertion was rejected.
    pub fn is_stored(&self) -> bool {
        !matches!(self, InsertOutcome::Rejected(_))
    }
}

/// Tally of a bulk merge. See [`HashTable::merge_from`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries that took a new slot.
    pub inserted: usize,
    /// Entries that replaced an existing one.
    pub overwritten: usize,
    /// Entries dropped because the destination was at its fill limit.
    pub rejected: usize,
}

impl MergeStats {
    /// Returns `true` if every source entry made it into the destination.
    pub fn is_complete(&self) -> bool {
        self.rejected == 0
    }
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Maximum number of elements the table accepts
    pub limit: usize,
    /// Total number of slots allocated
    pub total_slots: usize,
    /// Number of tombstones left behind by removals
    pub tombstones: usize,
    /// Number of never-used or cleared slots
    pub empty_slots: usize,
    /// Load factor (populated / total_slots)
    pub load_factor: f64,
    /// Longest distance between an entry and its start slot
    pub max_probe_length: usize,
    /// Mean distance between an entry and its start slot
    pub mean_probe_length: f64,
    /// Total memory in bytes used by the slot array
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} limit, {} slots ({:.2}% load factor)",
            self.populated,
            self.limit,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Slots: {} empty, {} tombstones",
            self.empty_slots, self.tombstones
        );
        println!(
            "Probe length: max {}, mean {:.2}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A fixed-capacity open-addressing hash table.
///
/// `HashTable<V>` stores values of type `V` in a slot array whose length is
/// fixed at construction. Like the map and set built on top of it, it never
/// reallocates: once half of the slots are occupied, inserting a new value
/// is rejected. Replacing a value that is already stored always succeeds.
///
/// The table does not know how to hash or compare values; every operation
/// takes the hash and an equality predicate.
///
/// ## Example
///
/// ```rust
/// use buffer_collections::hash_table::Entry;
/// use buffer_collections::hash_table::HashTable;
///
/// let mut table: HashTable<(u64, &str)> = HashTable::for_map(4);
/// assert_eq!(table.capacity(), 8);
///
/// match table.entry(7, |(k, _)| *k == 7) {
///     Ok(Entry::Vacant(entry)) => {
///         entry.insert((7, "seven"));
///     }
///     Ok(Entry::Occupied(_)) => unreachable!(),
///     Err(err) => panic!("{err}"),
/// }
/// assert_eq!(table.find(7, |(k, _)| *k == 7), Some(&(7, "seven")));
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Box<[Slot<V>]>,
    populated: usize,
    indexing: Indexing,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::string::String;

        let popmap: String = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Empty => '.',
                Slot::Occupied { .. } => '#',
                Slot::Deleted => '~',
            })
            .collect();

        f.debug_struct("HashTable")
            .field("popmap", &popmap)
            .field("populated", &self.populated)
            .field("capacity", &self.capacity())
            .field("indexing", &self.indexing)
            .finish()
    }
}

impl<V> HashTable<V> {
    /// Creates a table with exactly `slots` slots.
    ///
    /// # Panics
    ///
    /// Panics if `slots < 2`, or if `indexing` is [`Indexing::Mask`] and
    /// `slots` is not a power of two. Aborts through the global allocator's
    /// error handler if the slot array cannot be allocated.
    pub fn with_slots(slots: usize, indexing: Indexing) -> Self {
        Self::check_geometry(slots, indexing);
        Self {
            slots: (0..slots).map(|_| Slot::Empty).collect(),
            populated: 0,
            indexing,
        }
    }

    /// Creates a table with exactly `slots` slots, reporting allocation
    /// failure instead of aborting.
    ///
    /// # Panics
    ///
    /// Panics on the same geometry errors as [`HashTable::with_slots`].
    pub fn try_with_slots(slots: usize, indexing: Indexing) -> Result<Self> {
        Self::check_geometry(slots, indexing);
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(slots)
            .map_err(|_| Error::Allocation { slots })?;
        buffer.extend((0..slots).map(|_| Slot::Empty));

        Ok(Self {
            slots: buffer.into_boxed_slice(),
            populated: 0,
            indexing,
        })
    }

    /// Creates a table sized for a map holding `capacity` entries: exactly
    /// `max(2, 2 * capacity)` slots, addressed with `hash % slots`.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// let table: HashTable<(i32, i32)> = HashTable::for_map(3);
    /// assert_eq!(table.capacity(), 6);
    /// assert_eq!(table.limit(), 3);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the slot count overflows `usize`.
    pub fn for_map(capacity: usize) -> Self {
        Self::with_slots(map_slots(capacity), Indexing::Modulo)
    }

    /// Creates a table sized for a set holding `capacity` values: the
    /// smallest power of two `>= 2 * capacity` slots (at least 2), addressed
    /// with `hash & (slots - 1)`.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// let table: HashTable<i32> = HashTable::for_set(3);
    /// assert_eq!(table.capacity(), 8);
    /// assert_eq!(table.limit(), 4);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the slot count overflows `usize`.
    pub fn for_set(capacity: usize) -> Self {
        Self::with_slots(set_slots(capacity), Indexing::Mask)
    }

    fn check_geometry(slots: usize, indexing: Indexing) {
        assert!(slots >= 2, "a hash table needs at least 2 slots");
        if indexing == Indexing::Mask {
            assert!(
                slots.is_power_of_two(),
                "mask indexing requires a power-of-two slot count"
            );
        }
    }

    /// Returns the number of slots in the table.
    ///
    /// This never changes after construction.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the maximum number of values the table accepts: half of its
    /// slots.
    pub fn limit(&self) -> usize {
        self.slots.len() / 2
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns `true` if no new value can be inserted.
    pub fn is_full(&self) -> bool {
        self.populated >= self.limit()
    }

    /// How the table reduces hashes to start slots.
    pub fn indexing(&self) -> Indexing {
        self.indexing
    }

    #[inline(always)]
    fn start_index(&self, hash: u64) -> usize {
        match self.indexing {
            Indexing::Modulo => (hash % self.slots.len() as u64) as usize,
            Indexing::Mask => (hash as usize) & (self.slots.len() - 1),
        }
    }

    #[inline(always)]
    fn next_index(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slots.len() { 0 } else { next }
    }

    /// Walks the probe sequence of `hash`.
    ///
    /// Tombstones are skipped but the first one is remembered so that a
    /// vacant result reuses it. The walk ends at the first empty slot, or
    /// after one full sweep of the table.
    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let mut index = self.start_index(hash);
        let mut first_deleted = None;

        for _ in 0..self.slots.len() {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(first_deleted.unwrap_or(index)),
                Slot::Deleted => {
                    first_deleted.get_or_insert(index);
                }
                Slot::Occupied { hash: stored, value } => {
                    if *stored == hash && eq(value) {
                        return Probe::Found(index);
                    }
                }
            }
            index = self.next_index(index);
        }

        trace_event!(
            "probe for {:#x} swept all {} slots without reaching an empty one",
            hash,
            self.slots.len()
        );
        match first_deleted {
            Some(index) => Probe::Vacant(index),
            None => Probe::Exhausted,
        }
    }

    /// Finds a value in the table by hash and equality predicate.
    ///
    /// Returns a reference to the value if found, or `None` if no matching
    /// value exists. This method does not modify the table.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// let mut table = HashTable::for_set(10);
    /// table.insert(42, 42u64, |a, b| a == b);
    ///
    /// assert_eq!(table.find(42, |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(99, |&n| n == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        if self.populated == 0 {
            return None;
        }

        match self.probe(hash, eq) {
            Probe::Found(index) => self.slots[index].value(),
            _ => None,
        }
    }

    /// Finds a value in the table by hash and equality predicate, returning a
    /// mutable reference.
    ///
    /// The caller must not change the value in a way that changes its hash or
    /// its equality with other stored values.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        if self.populated == 0 {
            return None;
        }

        match self.probe(hash, eq) {
            Probe::Found(index) => self.slots[index].value_mut(),
            _ => None,
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// An existing value is always reachable through
    /// [`Entry::Occupied`]. A vacant entry is only handed out while the table
    /// is below its fill limit; otherwise
    /// [`Error::CapacityExceeded`] is returned and the table is unchanged.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// # use buffer_collections::Error;
    /// let mut table: HashTable<u64> = HashTable::for_map(1);
    /// table.entry(1, |&n| n == 1).unwrap().or_insert(1);
    ///
    /// // The single usable slot is taken, but the stored value stays reachable.
    /// assert!(matches!(table.entry(1, |&n| n == 1), Ok(_)));
    /// assert_eq!(
    ///     table.entry(2, |&n| n == 2).err(),
    ///     Some(Error::CapacityExceeded { len: 1, limit: 1 })
    /// );
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<Entry<'_, V>> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Ok(Entry::Occupied(OccupiedEntry { table: self, index })),
            Probe::Vacant(index) if self.populated < self.limit() => {
                Ok(Entry::Vacant(VacantEntry {
                    table: self,
                    hash,
                    index,
                }))
            }
            _ => {
                trace_event!(
                    "rejected insert: {} of {} usable slots taken",
                    self.populated,
                    self.limit()
                );
                Err(Error::CapacityExceeded {
                    len: self.populated,
                    limit: self.limit(),
                })
            }
        }
    }

    /// Inserts `value`, replacing a stored value that `eq` considers equal.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// # use buffer_collections::InsertOutcome;
    /// let mut table: HashTable<(u8, char)> = HashTable::for_map(1);
    /// let same_key = |a: &(u8, char), b: &(u8, char)| a.0 == b.0;
    ///
    /// assert_eq!(table.insert(1, (1, 'a'), same_key), InsertOutcome::Inserted);
    /// assert_eq!(table.insert(1, (1, 'b'), same_key), InsertOutcome::Overwritten((1, 'a')));
    /// assert_eq!(table.insert(2, (2, 'c'), same_key), InsertOutcome::Rejected((2, 'c')));
    /// ```
    pub fn insert(
        &mut self,
        hash: u64,
        value: V,
        eq: impl Fn(&V, &V) -> bool,
    ) -> InsertOutcome<V> {
        match self.entry(hash, |stored| eq(stored, &value)) {
            Ok(Entry::Occupied(mut entry)) => {
                InsertOutcome::Overwritten(core::mem::replace(entry.get_mut(), value))
            }
            Ok(Entry::Vacant(entry)) => {
                entry.insert(value);
                InsertOutcome::Inserted
            }
            Err(_) => InsertOutcome::Rejected(value),
        }
    }

    /// Removes and returns a value from the table.
    ///
    /// The slot becomes a tombstone, so values that probed past it while it
    /// was occupied stay reachable.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// let mut table = HashTable::for_set(10);
    /// table.insert(42, 42u64, |a, b| a == b);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(42, |&n| n == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        if self.populated == 0 {
            return None;
        }

        match self.probe(hash, eq) {
            Probe::Found(index) => self.take_slot(index),
            _ => None,
        }
    }

    fn take_slot(&mut self, index: usize) -> Option<V> {
        match core::mem::replace(&mut self.slots[index], Slot::Deleted) {
            Slot::Occupied { value, .. } => {
                self.populated -= 1;
                Some(value)
            }
            other => {
                self.slots[index] = other;
                None
            }
        }
    }

    /// Removes all values from the table.
    ///
    /// Every slot, tombstones included, becomes empty. The capacity is
    /// unchanged.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.populated = 0;
    }

    /// Inserts a clone of every value of `other`, in `other`'s slot order.
    ///
    /// `hash` recomputes the hash of a value for this table, so the source
    /// may use a different hashing scheme. The merge is not atomic: values
    /// that do not fit are skipped and the rest are still inserted.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// let mut small: HashTable<u64> = HashTable::for_set(1);
    /// let mut source: HashTable<u64> = HashTable::for_set(4);
    /// for n in 0..3u64 {
    ///     source.insert(n, n, |a, b| a == b);
    /// }
    ///
    /// let stats = small.merge_from(&source, |&n| n, |a, b| a == b);
    /// assert_eq!(stats.inserted, 1);
    /// assert_eq!(stats.rejected, 2);
    /// assert!(!stats.is_complete());
    /// ```
    pub fn merge_from(
        &mut self,
        other: &HashTable<V>,
        hash: impl Fn(&V) -> u64,
        eq: impl Fn(&V, &V) -> bool,
    ) -> MergeStats
    where
        V: Clone,
    {
        let mut stats = MergeStats::default();
        for value in other.iter() {
            match self.insert(hash(value), value.clone(), &eq) {
                InsertOutcome::Inserted => stats.inserted += 1,
                InsertOutcome::Overwritten(_) => stats.overwritten += 1,
                InsertOutcome::Rejected(_) => stats.rejected += 1,
            }
        }

        if stats.rejected > 0 {
            trace_event!(
                "merge left out {} of {} entries",
                stats.rejected,
                other.len()
            );
        }
        stats
    }

    /// Returns an iterator over all values in the table, in slot order.
    ///
    /// ```rust
    /// # use buffer_collections::HashTable;
    /// let mut table = HashTable::for_set(4);
    /// for n in [3u64, 1, 2] {
    ///     table.insert(n, n, |a, b| a == b);
    /// }
    ///
    /// // Slot order, which here follows the identity hashes.
    /// let values: Vec<_> = table.iter().copied().collect();
    /// assert_eq!(values, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to all values, in slot
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// After the iterator is dropped the table is empty and every slot,
    /// tombstones included, is reusable.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            slot_index: 0,
        }
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Index `n` counts the values stored `n` slots past their start slot.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { hash, .. } = slot {
                let start = self.start_index(*hash);
                let distance = (index + self.slots.len() - start) % self.slots.len();
                if hist.len() <= distance {
                    hist.resize(distance + 1, 0);
                }
                hist[distance] += 1;
            }
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let tombstones = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Deleted))
            .count();
        let hist = self.probe_histogram();
        let total_probe: usize = hist.iter().enumerate().map(|(d, n)| d * n).sum();
        let max_probe_length = hist.iter().rposition(|&n| n != 0).unwrap_or(0);

        DebugStats {
            populated: self.populated,
            limit: self.limit(),
            total_slots: self.slots.len(),
            tombstones,
            empty_slots: self.slots.len() - self.populated - tombstones,
            load_factor: self.populated as f64 / self.slots.len() as f64,
            max_probe_length,
            mean_probe_length: if self.populated == 0 {
                0.0
            } else {
                total_probe as f64 / self.populated as f64
            },
            total_bytes: core::mem::size_of_val::<[Slot<V>]>(&self.slots),
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - the value is not present and there is room for it
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - the value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    ///
    /// If the entry is occupied, returns a mutable reference to the existing
    /// value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
///
/// Holding one guarantees the table has room for one more value.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
    index: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        debug_assert!(!matches!(self.table.slots[self.index], Slot::Occupied { .. }));
        self.table.populated += 1;
        self.table.slots[self.index] = Slot::Occupied {
            hash: self.hash,
            value,
        };
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot was just filled"),
        }
    }

    /// The hash the value will be stored under.
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("occupied entry points at an occupied slot"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("occupied entry points at an occupied slot"),
        }
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("occupied entry points at an occupied slot"),
        }
    }

    /// Removes the value, leaving a tombstone, and returns it.
    pub fn remove(self) -> V {
        match self.table.take_slot(self.index) {
            Some(value) => value,
            None => unreachable!("occupied entry points at an occupied slot"),
        }
    }
}

/// An iterator over the values in a [`HashTable`], in slot order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let value = self.slots.by_ref().find_map(Slot::value)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// A mutable iterator over the values in a [`HashTable`], in slot order.
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let value = self.slots.by_ref().find_map(Slot::value_mut)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
/// It yields owned `V` values and empties the table as it iterates.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    slot_index: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.slot_index < self.table.slots.len() {
            let slot = core::mem::replace(&mut self.table.slots[self.slot_index], Slot::Empty);
            self.slot_index += 1;
            if let Slot::Occupied { value, .. } = slot {
                self.table.populated -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::hash::Hasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(key: u64) -> u64 {
        let mut h = SipHasher::new_with_keys(7, 11);
        h.write_u64(key);
        h.finish()
    }

    fn hash_string_key(key: &str) -> u64 {
        let mut h = SipHasher::new_with_keys(7, 11);
        h.write(key.as_bytes());
        h.finish()
    }

    fn same_key(a: &Item, b: &Item) -> bool {
        a.key == b.key
    }

    fn item(key: u64, value: i32) -> Item {
        Item { key, value }
    }

    #[test]
    fn sizing_policies() {
        let map: HashTable<Item> = HashTable::for_map(4);
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.indexing(), Indexing::Modulo);
        assert_eq!(HashTable::<Item>::for_map(0).capacity(), 2);
        assert_eq!(HashTable::<Item>::for_map(11).capacity(), 22);

        let set: HashTable<Item> = HashTable::for_set(11);
        assert_eq!(set.capacity(), 32);
        assert_eq!(set.indexing(), Indexing::Mask);
        assert_eq!(HashTable::<Item>::for_set(1).capacity(), 2);
    }

    #[test]
    #[should_panic(expected = "power-of-two")]
    fn mask_indexing_rejects_odd_geometry() {
        let _table: HashTable<Item> = HashTable::with_slots(6, Indexing::Mask);
    }

    #[test]
    fn try_with_slots_reports_allocation_failure() {
        let result: Result<HashTable<u64>> = HashTable::try_with_slots(usize::MAX / 2, Indexing::Modulo);
        assert_eq!(
            result.err(),
            Some(Error::Allocation {
                slots: usize::MAX / 2
            })
        );

        let table: HashTable<u64> = HashTable::try_with_slots(8, Indexing::Mask).unwrap();
        assert_eq!(table.capacity(), 8);
    }

    #[test]
    fn insert_and_find() {
        let mut table: HashTable<Item> = HashTable::for_map(32);
        for k in 0..32u64 {
            let hash = hash_key(k);
            match table.entry(hash, |v| v.key == k) {
                Ok(Entry::Vacant(v)) => {
                    v.insert(item(k, (k as i32) * 2));
                    assert_eq!(
                        table.find(hash, |v| v.key == k),
                        Some(&item(k, (k as i32) * 2))
                    );
                }
                _ => panic!("expected a vacant entry for key {k}"),
            }
        }

        assert_eq!(table.len(), 32);
        assert!(table.is_full());
        for k in 0..32u64 {
            let hash = hash_key(k);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&item(k, (k as i32) * 2))
            );
        }
    }

    #[test]
    fn ceiling_rejects_new_but_allows_overwrite() {
        let mut table: HashTable<Item> = HashTable::for_map(4);
        for k in 1..=3u64 {
            assert_eq!(
                table.insert(k, item(k, k as i32), same_key),
                InsertOutcome::Inserted
            );
        }

        assert_eq!(
            table.insert(3, item(3, 33), same_key),
            InsertOutcome::Overwritten(item(3, 3))
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.find(3, |v| v.key == 3), Some(&item(3, 33)));

        assert_eq!(table.insert(4, item(4, 4), same_key), InsertOutcome::Inserted);
        assert_eq!(table.len(), table.capacity() / 2);

        assert_eq!(
            table.insert(5, item(5, 5), same_key),
            InsertOutcome::Rejected(item(5, 5))
        );
        assert_eq!(table.len(), 4);
        assert_eq!(table.find(5, |v| v.key == 5), None);

        // Overwrites still land at the ceiling.
        assert_eq!(
            table.insert(1, item(1, 11), same_key),
            InsertOutcome::Overwritten(item(1, 1))
        );
    }

    #[test]
    fn explicit_collision() {
        let mut table: HashTable<Item> = HashTable::for_set(4);
        // All three share start slot 3 of 8.
        for (k, hash) in [(1u64, 3u64), (2, 11), (3, 19)] {
            assert_eq!(table.insert(hash, item(k, k as i32), same_key), InsertOutcome::Inserted);
        }

        assert_eq!(table.find(3, |v| v.key == 1), Some(&item(1, 1)));
        assert_eq!(table.find(11, |v| v.key == 2), Some(&item(2, 2)));
        assert_eq!(table.find(19, |v| v.key == 3), Some(&item(3, 3)));
        assert_eq!(table.probe_histogram(), vec![1, 1, 1]);
    }

    #[test]
    fn probe_wraps_around_the_end() {
        let mut table: HashTable<Item> = HashTable::for_map(3);
        // Start slot 5 is the last one; the second entry wraps to slot 0.
        table.insert(5, item(1, 1), same_key);
        table.insert(11, item(2, 2), same_key);

        assert_eq!(table.find(11, |v| v.key == 2), Some(&item(2, 2)));
        let values: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(values, [2, 1]);
    }

    #[test]
    fn tombstones_keep_probe_chains_intact() {
        let mut table: HashTable<Item> = HashTable::for_set(4);
        for (k, hash) in [(1u64, 2u64), (2, 10), (3, 18)] {
            table.insert(hash, item(k, k as i32), same_key);
        }

        assert_eq!(table.remove(2, |v| v.key == 1), Some(item(1, 1)));
        assert_eq!(table.remove(10, |v| v.key == 2), Some(item(2, 2)));
        assert_eq!(table.len(), 1);

        assert_eq!(table.find(2, |v| v.key == 1), None);
        assert_eq!(table.find(18, |v| v.key == 3), Some(&item(3, 3)));

        let stats = table.debug_stats();
        assert_eq!(stats.tombstones, 2);
        assert_eq!(stats.empty_slots, 5);
    }

    #[test]
    fn insert_reuses_first_tombstone_without_duplicating() {
        let mut table: HashTable<Item> = HashTable::for_set(4);
        for (k, hash) in [(1u64, 2u64), (2, 10), (3, 18)] {
            table.insert(hash, item(k, k as i32), same_key);
        }
        table.remove(2, |v| v.key == 1);

        // Key 3 lives past the tombstone; it must be overwritten, not
        // duplicated into the tombstone.
        assert_eq!(
            table.insert(18, item(3, 30), same_key),
            InsertOutcome::Overwritten(item(3, 3))
        );
        assert_eq!(table.len(), 2);

        assert_eq!(table.insert(26, item(4, 4), same_key), InsertOutcome::Inserted);
        assert_eq!(table.debug_stats().tombstones, 0);
        assert_eq!(table.probe_histogram(), vec![1, 1, 1]);
    }

    #[test]
    fn lookups_terminate_without_empty_slots() {
        let mut table: HashTable<Item> = HashTable::for_map(1);
        table.insert(0, item(1, 1), same_key);
        table.remove(0, |v| v.key == 1);
        table.insert(1, item(2, 2), same_key);

        // One tombstone and one occupied slot: no empty slot remains.
        assert_eq!(table.debug_stats().empty_slots, 0);
        assert_eq!(table.find(0, |v| v.key == 9), None);
        assert_eq!(table.remove(0, |v| v.key == 9), None);
        assert_eq!(
            table.insert(0, item(9, 9), same_key),
            InsertOutcome::Rejected(item(9, 9))
        );
    }

    #[test]
    fn remove_items() {
        let mut table: HashTable<Item> = HashTable::for_map(64);
        for k in 0..64u64 {
            let hash = hash_key(k);
            table.insert(hash, item(k, k as i32), same_key);
        }

        for k in (0..64u64).step_by(2) {
            let hash = hash_key(k);
            assert_eq!(table.remove(hash, |v| v.key == k), Some(item(k, k as i32)));
        }
        assert_eq!(table.len(), 32);

        for k in 0..64u64 {
            let hash = hash_key(k);
            let found = table.find(hash, |v| v.key == k);
            if k % 2 == 0 {
                assert!(found.is_none());
            } else {
                assert_eq!(found, Some(&item(k, k as i32)));
            }
        }

        assert_eq!(table.remove(hash_key(0), |v| v.key == 0), None);
        assert_eq!(table.len(), 32);
    }

    #[test]
    fn find_mut_and_modify() {
        let mut table: HashTable<Item> = HashTable::for_map(8);
        let hash = hash_key(5);
        table.insert(hash, item(5, 1), same_key);

        if let Some(v) = table.find_mut(hash, |v| v.key == 5) {
            v.value = 99;
        }
        assert_eq!(table.find(hash, |v| v.key == 5), Some(&item(5, 99)));
        assert!(table.find_mut(hash_key(6), |v| v.key == 6).is_none());
    }

    #[test]
    fn entry_helpers() {
        let mut table: HashTable<(u64, Vec<i32>)> = HashTable::for_map(4);
        let hash = hash_key(1);

        table
            .entry(hash, |(k, _)| *k == 1)
            .unwrap()
            .or_insert_with(|| (1, vec![]))
            .1
            .push(42);
        table
            .entry(hash, |(k, _)| *k == 1)
            .unwrap()
            .or_insert((1, vec![0]))
            .1
            .push(24);
        assert_eq!(table.find(hash, |(k, _)| *k == 1), Some(&(1, vec![42, 24])));

        let modified = table
            .entry(hash, |(k, _)| *k == 1)
            .unwrap()
            .and_modify(|(_, v)| v.clear())
            .or_insert((1, vec![7]));
        assert_eq!(modified, &mut (1, vec![]));

        table
            .entry(hash_key(2), |(k, _)| *k == 2)
            .unwrap()
            .and_modify(|_| unreachable!())
            .or_default();
        assert_eq!(table.find(hash_key(2), |(k, _)| *k == 0), Some(&(0, vec![])));
        assert_eq!(table.remove(hash_key(2), |(k, _)| *k == 0), Some((0, vec![])));

        match table.entry(hash, |(k, _)| *k == 1) {
            Ok(Entry::Occupied(entry)) => {
                assert_eq!(entry.remove(), (1, vec![]));
            }
            _ => panic!("expected occupied entry"),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn vacant_entry_reports_hash() {
        let mut table: HashTable<u64> = HashTable::for_set(4);
        match table.entry(12345, |&v| v == 1) {
            Ok(Entry::Vacant(entry)) => assert_eq!(entry.hash(), 12345),
            _ => panic!("expected vacant entry"),
        }
        // Looking at a vacant entry does not insert anything.
        assert!(table.is_empty());
    }

    #[test]
    fn clear_resets_tombstones() {
        let mut table: HashTable<Item> = HashTable::for_map(4);
        for k in 0..4u64 {
            table.insert(k, item(k, 0), same_key);
        }
        table.remove(0, |v| v.key == 0);
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.capacity(), 8);
        let stats = table.debug_stats();
        assert_eq!(stats.tombstones, 0);
        assert_eq!(stats.empty_slots, 8);

        for k in 10..14u64 {
            assert_eq!(table.insert(k, item(k, 0), same_key), InsertOutcome::Inserted);
        }
    }

    #[test]
    fn iter_and_drain() {
        let mut table: HashTable<Item> = HashTable::for_map(16);
        for k in 0..16u64 {
            table.insert(hash_key(k), item(k, k as i32), same_key);
        }

        let iter = table.iter();
        assert_eq!(iter.len(), 16);
        let mut seen: Vec<u64> = iter.map(|v| v.key).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());

        for v in table.iter_mut() {
            v.value += 1;
        }
        assert_eq!(table.find(hash_key(3), |v| v.key == 3), Some(&item(3, 4)));

        table.remove(hash_key(0), |v| v.key == 0);
        let mut drained: Vec<u64> = table.drain().map(|v| v.key).collect();
        drained.sort_unstable();
        assert_eq!(drained, (1..16).collect::<Vec<_>>());
        assert!(table.is_empty());
        assert_eq!(table.debug_stats().tombstones, 0);
    }

    #[test]
    fn dropped_drain_empties_table() {
        let mut table: HashTable<String> = HashTable::for_set(8);
        for s in ["a", "b", "c"] {
            table.insert(hash_string_key(s), s.to_string(), |a, b| a == b);
        }

        let mut drain = table.drain();
        assert!(drain.next().is_some());
        drop(drain);

        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn string_values() {
        let mut table: HashTable<String> = HashTable::for_set(8);
        for s in ["hello", "world", "rust"] {
            assert_eq!(
                table.insert(hash_string_key(s), s.to_string(), |a, b| a == b),
                InsertOutcome::Inserted
            );
        }

        assert_eq!(
            table.find(hash_string_key("world"), |v| v == "world"),
            Some(&"world".to_string())
        );
        assert_eq!(table.find(hash_string_key("missing"), |v| v == "missing"), None);
        assert_eq!(
            table.remove(hash_string_key("hello"), |v| v == "hello"),
            Some("hello".to_string())
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn merge_is_not_atomic() {
        let mut source: HashTable<Item> = HashTable::for_map(8);
        for k in 0..6u64 {
            source.insert(k, item(k, k as i32), same_key);
        }

        let mut dest: HashTable<Item> = HashTable::for_map(4);
        dest.insert(0, item(0, 100), same_key);

        let stats = dest.merge_from(&source, |v| v.key, same_key);
        assert_eq!(
            stats,
            MergeStats {
                inserted: 3,
                overwritten: 1,
                rejected: 2,
            }
        );
        assert_eq!(dest.len(), 4);
        assert_eq!(dest.find(0, |v| v.key == 0), Some(&item(0, 0)));
        // The source is untouched.
        assert_eq!(source.len(), 6);
    }

    #[test]
    fn clone_is_independent() {
        let mut table: HashTable<Item> = HashTable::for_map(8);
        for k in 0..5u64 {
            table.insert(hash_key(k), item(k, k as i32), same_key);
        }
        table.remove(hash_key(2), |v| v.key == 2);

        let mut cloned = table.clone();
        assert_eq!(cloned.len(), 4);
        assert_eq!(cloned.debug_stats().tombstones, 1);

        cloned.remove(hash_key(1), |v| v.key == 1);
        assert_eq!(table.find(hash_key(1), |v| v.key == 1), Some(&item(1, 1)));
        assert_eq!(cloned.find(hash_key(1), |v| v.key == 1), None);
    }

    #[test]
    fn debug_output() {
        let mut table: HashTable<u64> = HashTable::for_set(2);
        table.insert(1, 1, |a, b| a == b);
        table.insert(2, 2, |a, b| a == b);
        table.remove(2, |&v| v == 2);

        let text = alloc::format!("{table:?}");
        assert!(text.contains("popmap: \".#~.\""), "{text}");
        assert!(text.contains("populated: 1"), "{text}");
    }

    #[test]
    fn histogram_output() {
        let mut table: HashTable<u64> = HashTable::for_set(64);
        for k in 0..64u64 {
            table.insert(hash_key(k), k, |a, b| a == b);
        }

        let hist = table.probe_histogram();
        assert_eq!(hist.iter().sum::<usize>(), 64);
        let stats = table.debug_stats();
        assert_eq!(stats.populated, 64);
        assert_eq!(stats.limit, 64);
        assert_eq!(stats.total_slots, 128);
        assert!((stats.load_factor - 0.5).abs() < f64::EPSILON);
        #[cfg(feature = "std")]
        stats.print();
    }

    #[test]
    fn randomized_against_reference() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for slots in [2usize, 6, 16, 30, 64] {
            let indexing = if slots.is_power_of_two() {
                Indexing::Mask
            } else {
                Indexing::Modulo
            };
            let mut table: HashTable<Item> = HashTable::with_slots(slots, indexing);
            let mut reference: std::collections::HashMap<u64, i32> =
                std::collections::HashMap::new();

            for step in 0..2_000 {
                // A small key space with a weak hash keeps collisions and
                // tombstones frequent.
                let key = rng.random_range(0..(slots as u64 * 2));
                let hash = key % 5;
                if rng.random_bool(0.6) {
                    let outcome = table.insert(hash, item(key, step), same_key);
                    match outcome {
                        InsertOutcome::Inserted => {
                            assert!(reference.insert(key, step).is_none());
                        }
                        InsertOutcome::Overwritten(old) => {
                            assert_eq!(reference.insert(key, step), Some(old.value));
                        }
                        InsertOutcome::Rejected(_) => {
                            assert!(!reference.contains_key(&key));
                            assert_eq!(reference.len(), slots / 2);
                        }
                    }
                } else {
                    let removed = table.remove(hash, |v| v.key == key);
                    assert_eq!(removed.map(|v| v.value), reference.remove(&key));
                }

                assert_eq!(table.len(), reference.len());
                assert!(table.len() <= table.limit());
            }

            for (&key, &value) in &reference {
                assert_eq!(table.find(key % 5, |v| v.key == key), Some(&item(key, value)));
            }
        }
    }
}
