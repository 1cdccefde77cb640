use core::fmt::Debug;

use crate::capacity::Indexing;
use crate::capacity::SizeClass;
use crate::capacity::checked_set_slots;
use crate::error::Error;
use crate::error::Result;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::hash_table::MergeStats;
use crate::strategy::Identity;
use crate::strategy::KeyStrategy;

/// A fixed-capacity set stored in a single open-addressing [`HashTable`].
///
/// `FixedSet<T, S>` stores values inline and uses the strategy `S` to hash
/// and compare them. A set created with capacity hint `n` has the smallest
/// power-of-two number of slots holding `2 * n` (at least 2), which lets it
/// reduce hashes with a mask. At most half of the slots can be occupied.
///
/// The rounding means a set usually has more room than a map built from the
/// same hint: `FixedSet::with_capacity(3)` has 8 slots where
/// `FixedMap::with_capacity(3)` has 6.
///
/// # Memory
///
/// Every slot holds a tag, a `u64` hash and an inline `T`.
#[derive(Clone)]
pub struct FixedSet<T, S = Identity> {
    table: HashTable<T>,
    strategy: S,
}

impl<T, S> PartialEq for FixedSet<T, S>
where
    S: KeyStrategy<T>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for FixedSet<T, S> where S: KeyStrategy<T> {}

impl<T, S> Debug for FixedSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S> FixedSet<T, S>
where
    S: KeyStrategy<T>,
{
    /// Creates an empty set with room for `capacity` values, using the given
    /// strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedSet;
    /// use buffer_collections::Identity;
    ///
    /// let set: FixedSet<u32> = FixedSet::with_capacity_and_strategy(11, Identity);
    /// assert_eq!(set.capacity(), 32);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the slot count overflows `usize`.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: S) -> Self {
        Self {
            table: HashTable::for_set(capacity),
            strategy,
        }
    }

    /// Like [`FixedSet::with_capacity_and_strategy`], but reports allocation
    /// failure as [`Error::Allocation`](crate::Error::Allocation).
    ///
    /// A slot count that does not fit in `usize` is reported the same way,
    /// with `slots` set to `usize::MAX`.
    pub fn try_with_capacity_and_strategy(capacity: usize, strategy: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::try_with_slots(
                checked_set_slots(capacity).ok_or(Error::Allocation { slots: usize::MAX })?,
                Indexing::Mask,
            )?,
            strategy,
        })
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the set.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the maximum number of values the set accepts.
    pub fn limit(&self) -> usize {
        self.table.limit()
    }

    /// Returns `true` if no new value can be inserted.
    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }

    /// The strategy this set was built with.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Clears the set, removing all values. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Adds a value to the set.
    ///
    /// Returns `Ok(true)` if the value was newly inserted and `Ok(false)` if
    /// an equal value was already present, in which case the set is not
    /// modified. Fails with
    /// [`Error::CapacityExceeded`](crate::Error::CapacityExceeded) if the
    /// value is new and the set is at its limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedSet;
    ///
    /// let mut set: FixedSet<i32> = FixedSet::with_capacity(1);
    /// assert_eq!(set.insert(2), Ok(true));
    /// assert_eq!(set.insert(2), Ok(false));
    /// assert!(set.insert(3).is_err());
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> Result<bool> {
        let hash = self.strategy.hash(&value);
        let strategy = &self.strategy;
        match self.table.entry(hash, |v| strategy.eq(v, &value))? {
            TableEntry::Occupied(_) => Ok(false),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                Ok(true)
            }
        }
    }

    /// Returns `true` if the set contains a value.
    ///
    /// ```rust
    /// use buffer_collections::fixed_set;
    ///
    /// let set = fixed_set![1, 2, 3];
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Returns a reference to the stored value equal to the given one.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.strategy.hash(value);
        self.table.find(hash, |v| self.strategy.eq(v, value))
    }

    /// Removes a value from the set. Returns whether the value was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to the given one.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.strategy.hash(value);
        let strategy = &self.strategy;
        self.table.remove(hash, |v| strategy.eq(v, value))
    }

    /// Returns `true` if every value yielded by `values` is in the set.
    ///
    /// An empty argument is contained in any set, including an empty one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::fixed_set;
    /// use buffer_collections::FixedSet;
    ///
    /// let set = fixed_set![1, 2, 3];
    /// assert!(set.contains_all(&[1, 3]));
    /// assert!(set.contains_all(&fixed_set![2]));
    /// assert!(!set.contains_all(&[3, 4]));
    ///
    /// let empty: FixedSet<i32> = FixedSet::with_capacity(4);
    /// assert!(empty.contains_all(&[]));
    /// assert!(!empty.contains_all(&set));
    /// ```
    pub fn contains_all<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        values.into_iter().all(|v| self.contains(v))
    }

    /// Returns `true` if `self` has no values in common with `other`.
    pub fn is_disjoint(&self, other: &FixedSet<T, S>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if the set is a subset of another, i.e., `other`
    /// contains at least all the values in `self`.
    pub fn is_subset(&self, other: &FixedSet<T, S>) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if the set is a superset of another, i.e., `self`
    /// contains at least all the values in `other`.
    pub fn is_superset(&self, other: &FixedSet<T, S>) -> bool {
        self.contains_all(other)
    }

    /// Returns an iterator over the values in `self` or `other`, without
    /// duplicates.
    ///
    /// ```rust
    /// use buffer_collections::fixed_set;
    ///
    /// let a = fixed_set![1, 2];
    /// let b = fixed_set![2, 3];
    /// let union: Vec<_> = a.union(&b).copied().collect();
    /// assert_eq!(union, [1, 2, 3]);
    /// ```
    pub fn union<'a>(&'a self, other: &'a FixedSet<T, S>) -> Union<'a, T, S> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            other_set: self,
        }
    }

    /// Returns an iterator over the values in both `self` and `other`.
    pub fn intersection<'a>(&'a self, other: &'a FixedSet<T, S>) -> Intersection<'a, T, S> {
        if self.len() <= other.len() {
            Intersection {
                iter: self.iter(),
                other,
            }
        } else {
            Intersection {
                iter: other.iter(),
                other: self,
            }
        }
    }

    /// Returns an iterator over the values in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a FixedSet<T, S>) -> Difference<'a, T, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Returns an iterator over the values in exactly one of the two sets.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a FixedSet<T, S>,
    ) -> SymmetricDifference<'a, T, S> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Inserts a clone of every value of `other`, in `other`'s slot order.
    ///
    /// Values that do not fit are skipped while the rest are still inserted.
    ///
    /// ```rust
    /// use buffer_collections::fixed_set;
    /// use buffer_collections::FixedSet;
    ///
    /// let mut small: FixedSet<i32> = FixedSet::with_capacity(1);
    /// let stats = small.add_all(&fixed_set![1, 2, 3]);
    /// assert_eq!(stats.inserted, 1);
    /// assert_eq!(stats.rejected, 2);
    /// ```
    pub fn add_all<S2>(&mut self, other: &FixedSet<T, S2>) -> MergeStats
    where
        T: Clone,
    {
        let strategy = &self.strategy;
        self.table
            .merge_from(&other.table, |v| strategy.hash(v), |a, b| strategy.eq(a, b))
    }

    /// An iterator visiting all values in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Clears the set, returning all values as an iterator.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Read access to the underlying table, for statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn table(&self) -> &HashTable<T> {
        &self.table
    }
}

impl<T, S> FixedSet<T, S>
where
    S: KeyStrategy<T> + Default,
{
    /// Creates an empty set with room for `capacity` values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::FixedSet;
    ///
    /// let set: FixedSet<i32> = FixedSet::with_capacity(3);
    /// assert_eq!(set.capacity(), 8);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the slot count overflows `usize`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, S::default())
    }

    /// Like [`FixedSet::with_capacity`], but reports allocation failure
    /// instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::try_with_capacity_and_strategy(capacity, S::default())
    }

    /// Creates an empty set sized by one of the preset size classes.
    pub fn with_size_class(class: SizeClass) -> Self {
        Self::with_capacity(class.hint())
    }

    /// Builds a set from a list of values. Duplicates are no-ops.
    ///
    /// The capacity hint is the number of listed values, so every value
    /// fits.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        Self::from_values_with_capacity(0, values)
    }

    /// Builds a set from a list of values with an explicit capacity hint.
    ///
    /// A hint smaller than the number of values is raised to it.
    pub fn from_values_with_capacity<I>(capacity: usize, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let mut set = Self::with_capacity(capacity.max(values.len()));
        for value in values {
            let hash = set.strategy.hash(&value);
            let strategy = &set.strategy;
            let outcome = set.table.insert(hash, value, |a, b| strategy.eq(a, b));
            debug_assert!(outcome.is_stored(), "literal values exceed the set size");
        }
        set
    }
}

/// An iterator over the values of a `FixedSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `FixedSet`.
pub struct Drain<'a, T> {
    inner: crate::hash_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'a, T, S> IntoIterator for &'a FixedSet<T, S>
where
    S: KeyStrategy<T>,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    other_set: &'a FixedSet<T, S>,
}

impl<'a, T, S> Iterator for Union<'a, T, S>
where
    S: KeyStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.other_set.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a FixedSet<T, S>,
}

impl<'a, T, S> Iterator for Intersection<'a, T, S>
where
    S: KeyStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a FixedSet<T, S>,
}

impl<'a, T, S> Iterator for Difference<'a, T, S>
where
    S: KeyStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S> {
    iter: core::iter::Chain<Difference<'a, T, S>, Difference<'a, T, S>>,
}

impl<'a, T, S> Iterator for SymmetricDifference<'a, T, S>
where
    S: KeyStrategy<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}
