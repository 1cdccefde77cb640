use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::capacity::SizeClass;
use crate::capacity::checked_deque_slots;
use crate::capacity::deque_slots;
use crate::error::Error;
use crate::error::Result;

/// A fixed-capacity double-ended queue backed by a ring buffer.
///
/// `RingDeque<T>` stores its elements in one boxed slice allocated at
/// construction. Logical element `i` lives in cell `(head + i) % capacity`.
/// Pushing onto a full deque fails with [`Error::CapacityExceeded`]; the
/// buffer never grows.
///
/// Every cell that holds no element holds `T::default()`. Pops and removals
/// reset the cell they vacate, which is visible through
/// [`RingDeque::as_raw_slice`].
///
/// ## Example
///
/// ```rust
/// use buffer_collections::RingDeque;
///
/// let mut deque: RingDeque<i32> = RingDeque::with_capacity(4);
/// deque.push_front(1).unwrap();
/// deque.push_front(2).unwrap();
/// assert_eq!(deque.front(), Some(&2));
///
/// assert_eq!(deque.pop_front(), Some(2));
/// assert_eq!(deque.pop_front(), Some(1));
/// assert!(deque.is_empty());
/// assert_eq!(deque.as_raw_slice(), &[0, 0, 0, 0]);
/// ```
#[derive(Clone)]
pub struct RingDeque<T> {
    items: Box<[T]>,
    head: usize,
    len: usize,
}

impl<T> Debug for RingDeque<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> PartialEq for RingDeque<T>
where
    T: PartialEq,
{
    /// Deques are equal when they hold equal elements in the same order.
    /// Capacity and buffer layout are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T> Eq for RingDeque<T> where T: Eq {}

impl<T> RingDeque<T> {
    /// Returns the number of elements in the deque.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the deque holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of cells in the buffer. Always even and at least 2.
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if every cell holds an element.
    pub fn is_full(&self) -> bool {
        self.len == self.items.len()
    }

    #[inline(always)]
    fn physical(&self, index: usize) -> usize {
        let cell = self.head + index;
        if cell >= self.items.len() {
            cell - self.items.len()
        } else {
            cell
        }
    }

    /// Returns the front element, or `None` if the deque is empty.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the back element, or `None` if the deque is empty.
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns the element at logical position `index`, counted from the
    /// front.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            Some(&self.items[self.physical(index)])
        } else {
            None
        }
    }

    /// Returns a mutable reference to the element at logical position
    /// `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            let cell = self.physical(index);
            Some(&mut self.items[cell])
        } else {
            None
        }
    }

    /// Returns `true` if the deque contains an element equal to `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|item| item == value)
    }

    /// Returns the elements as two slices, front part first.
    ///
    /// The second slice is empty unless the elements wrap past the end of the
    /// buffer.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let tail = self.head + self.len;
        if tail <= self.items.len() {
            (&self.items[self.head..tail], &[])
        } else {
            (
                &self.items[self.head..],
                &self.items[..tail - self.items.len()],
            )
        }
    }

    /// The whole buffer in physical order, including empty cells.
    pub fn as_raw_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns a front-to-back iterator.
    ///
    /// ```rust
    /// use buffer_collections::ring_deque;
    ///
    /// let mut deque = ring_deque![4; 2, 3];
    /// deque.push_front(1).unwrap();
    /// let items: Vec<_> = deque.iter().copied().collect();
    /// assert_eq!(items, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        let (front, back) = self.as_slices();
        Iter {
            front: front.iter(),
            back: back.iter(),
        }
    }
}

impl<T> RingDeque<T>
where
    T: Default,
{
    /// Creates an empty deque with room for `capacity` elements, rounded up
    /// to an even number (at least 2).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use buffer_collections::RingDeque;
    ///
    /// assert_eq!(RingDeque::<u8>::with_capacity(1).capacity(), 2);
    /// assert_eq!(RingDeque::<u8>::with_capacity(5).capacity(), 6);
    /// assert_eq!(RingDeque::<u8>::with_capacity(8).capacity(), 8);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if rounding `capacity` up to an even number overflows `usize`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: (0..deque_slots(capacity)).map(|_| T::default()).collect(),
            head: 0,
            len: 0,
        }
    }

    /// Like [`RingDeque::with_capacity`], but reports allocation failure as
    /// [`Error::Allocation`] instead of aborting.
    ///
    /// A cell count that does not fit in `usize` is reported the same way,
    /// with `slots` set to `usize::MAX`.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let cells = checked_deque_slots(capacity).ok_or(Error::Allocation { slots: usize::MAX })?;
        let mut items = Vec::new();
        items
            .try_reserve_exact(cells)
            .map_err(|_| Error::Allocation { slots: cells })?;
        items.extend((0..cells).map(|_| T::default()));

        Ok(Self {
            items: items.into_boxed_slice(),
            head: 0,
            len: 0,
        })
    }

    /// Creates an empty deque sized by one of the preset size classes.
    pub fn with_size_class(class: SizeClass) -> Self {
        Self::with_capacity(class.hint())
    }

    /// Builds a deque from a list of values, front to back.
    ///
    /// The capacity hint is the number of values.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        Self::from_values_with_capacity(0, values)
    }

    /// Builds a deque from a list of values with an explicit capacity hint.
    ///
    /// A hint smaller than the number of values is raised to it.
    pub fn from_values_with_capacity<I>(capacity: usize, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let mut deque = Self::with_capacity(capacity.max(values.len()));
        for value in values {
            let cell = deque.physical(deque.len);
            deque.items[cell] = value;
            deque.len += 1;
        }
        deque
    }

    fn check_room(&self) -> Result<()> {
        if self.is_full() {
            trace_event!("rejected push: all {} cells taken", self.items.len());
            return Err(Error::CapacityExceeded {
                len: self.len,
                limit: self.items.len(),
            });
        }
        Ok(())
    }

    /// Prepends an element.
    ///
    /// Fails with [`Error::CapacityExceeded`] if the deque is full, leaving
    /// it unchanged.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        self.check_room()?;
        self.head = if self.head == 0 {
            self.items.len() - 1
        } else {
            self.head - 1
        };
        self.items[self.head] = value;
        self.len += 1;
        Ok(())
    }

    /// Appends an element.
    ///
    /// Fails with [`Error::CapacityExceeded`] if the deque is full, leaving
    /// it unchanged.
    ///
    /// ```rust
    /// use buffer_collections::Error;
    /// use buffer_collections::RingDeque;
    ///
    /// let mut deque: RingDeque<char> = RingDeque::with_capacity(2);
    /// deque.push_back('a').unwrap();
    /// deque.push_back('b').unwrap();
    /// assert_eq!(
    ///     deque.push_back('c'),
    ///     Err(Error::CapacityExceeded { len: 2, limit: 2 })
    /// );
    /// ```
    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.check_room()?;
        let cell = self.physical(self.len);
        self.items[cell] = value;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the front element, or `None` if the deque is
    /// empty. The vacated cell is reset to `T::default()`.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let value = core::mem::take(&mut self.items[self.head]);
        self.head = self.physical(1);
        self.len -= 1;
        Some(value)
    }

    /// Removes and returns the back element, or `None` if the deque is
    /// empty. The vacated cell is reset to `T::default()`.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        let cell = self.physical(self.len);
        Some(core::mem::take(&mut self.items[cell]))
    }

    /// Returns a clone of the front element, or `T::default()` if the deque
    /// is empty.
    pub fn front_or_zero(&self) -> T
    where
        T: Clone,
    {
        self.front().cloned().unwrap_or_default()
    }

    /// Returns a clone of the back element, or `T::default()` if the deque is
    /// empty.
    pub fn back_or_zero(&self) -> T
    where
        T: Clone,
    {
        self.back().cloned().unwrap_or_default()
    }

    /// Removes the first element equal to `value`, counting from the front.
    ///
    /// The elements between the removed one and the nearer end move one cell
    /// toward the gap; when both ends are equally near, the front part
    /// moves. Returns `false` and leaves the deque unchanged if no element
    /// matches.
    ///
    /// ```rust
    /// use buffer_collections::ring_deque;
    ///
    /// let mut deque = ring_deque![1, 2, 1, 3];
    /// assert!(deque.remove_first_occurrence(&1));
    /// assert_eq!(deque, ring_deque![2, 1, 3]);
    /// assert!(!deque.remove_first_occurrence(&4));
    /// ```
    pub fn remove_first_occurrence(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.iter().position(|item| item == value) {
            Some(index) => {
                let shift_front = index <= self.len - 1 - index;
                self.remove_at(index, shift_front);
                true
            }
            None => false,
        }
    }

    /// Removes the last element equal to `value`, counting from the back.
    ///
    /// Like [`RingDeque::remove_first_occurrence`], but when both ends are
    /// equally near, the back part moves.
    ///
    /// ```rust
    /// use buffer_collections::ring_deque;
    ///
    /// let mut deque = ring_deque![1, 2, 1, 3];
    /// assert!(deque.remove_last_occurrence(&1));
    /// assert_eq!(deque, ring_deque![1, 2, 3]);
    /// ```
    pub fn remove_last_occurrence(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.iter().rposition(|item| item == value) {
            Some(index) => {
                let shift_front = index < self.len - 1 - index;
                self.remove_at(index, shift_front);
                true
            }
            None => false,
        }
    }

    /// Drops the element at logical `index` and closes the gap from one side.
    fn remove_at(&mut self, index: usize, shift_front: bool) {
        let gap = self.physical(index);
        drop(core::mem::take(&mut self.items[gap]));

        if shift_front {
            // The default left in the gap bubbles out at the front.
            for i in (0..index).rev() {
                let (from, to) = (self.physical(i), self.physical(i + 1));
                self.items.swap(from, to);
            }
            self.head = self.physical(1);
        } else {
            for i in index..self.len - 1 {
                let (from, to) = (self.physical(i + 1), self.physical(i));
                self.items.swap(from, to);
            }
        }
        self.len -= 1;
    }

    /// Removes every element and resets every cell to `T::default()`.
    pub fn clear(&mut self) {
        for item in self.items.iter_mut() {
            *item = T::default();
        }
        self.head = 0;
        self.len = 0;
    }
}

impl<'a, T> IntoIterator for &'a RingDeque<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A front-to-back iterator over a [`RingDeque`].
///
/// This struct is created by the [`iter`] method on [`RingDeque`].
///
/// [`iter`]: RingDeque::iter
#[derive(Clone)]
pub struct Iter<'a, T> {
    front: core::slice::Iter<'a, T>,
    back: core::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.front.next().or_else(|| self.back.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.front.len() + self.back.len();
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.back.next_back().or_else(|| self.front.next_back())
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
