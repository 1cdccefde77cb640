/// Preset capacity hints offered by every container.
///
/// Each size class is a capacity hint, so the resulting buffer length still
/// depends on the container's sizing policy: `SizeClass::S16` gives a map or
/// set 32 slots and a deque 16 cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeClass {
    /// Room for 4 elements.
    S4,
    /// Room for 8 elements.
    S8,
    /// Room for 16 elements.
    S16,
    /// Room for 32 elements.
    S32,
    /// Room for 64 elements.
    S64,
    /// Room for 128 elements.
    S128,
    /// Room for 256 elements.
    S256,
    /// Room for 512 elements.
    S512,
    /// Room for 1024 elements.
    S1024,
}

impl SizeClass {
    /// Every size class, smallest first.
    pub const ALL: [SizeClass; 9] = [
        SizeClass::S4,
        SizeClass::S8,
        SizeClass::S16,
        SizeClass::S32,
        SizeClass::S64,
        SizeClass::S128,
        SizeClass::S256,
        SizeClass::S512,
        SizeClass::S1024,
    ];

    /// The capacity hint this size class stands for.
    pub const fn hint(self) -> usize {
        match self {
            SizeClass::S4 => 4,
            SizeClass::S8 => 8,
            SizeClass::S16 => 16,
            SizeClass::S32 => 32,
            SizeClass::S64 => 64,
            SizeClass::S128 => 128,
            SizeClass::S256 => 256,
            SizeClass::S512 => 512,
            SizeClass::S1024 => 1024,
        }
    }
}

impl From<SizeClass> for usize {
    #[inline(always)]
    fn from(value: SizeClass) -> Self {
        value.hint()
    }
}

/// How a hash is reduced to a starting slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexing {
    /// `hash % slots`, used when the slot count is an arbitrary even number.
    Modulo,
    /// `hash & (slots - 1)`, which requires a power-of-two slot count.
    Mask,
}

/// Slot count for a map: exactly double the hint, at least 2.
///
/// # Panics
///
/// Panics if doubling the hint overflows `usize`; see
/// [`checked_map_slots`].
#[inline]
pub const fn map_slots(hint: usize) -> usize {
    match checked_map_slots(hint) {
        Some(slots) => slots,
        None => panic!("map capacity overflow"),
    }
}

/// Like [`map_slots`], but returns `None` when the slot count does not fit
/// in `usize`.
#[inline]
pub const fn checked_map_slots(hint: usize) -> Option<usize> {
    match hint.checked_mul(2) {
        Some(doubled) if doubled < 2 => Some(2),
        Some(doubled) => Some(doubled),
        None => None,
    }
}

/// Slot count for a set: the smallest power of two holding double the hint,
/// at least 2.
///
/// # Panics
///
/// Panics if the slot count does not fit in `usize`; see
/// [`checked_set_slots`].
#[inline]
pub const fn set_slots(hint: usize) -> usize {
    match checked_set_slots(hint) {
        Some(slots) => slots,
        None => panic!("set capacity overflow"),
    }
}

/// Like [`set_slots`], but returns `None` when the slot count does not fit
/// in `usize`.
#[inline]
pub const fn checked_set_slots(hint: usize) -> Option<usize> {
    match checked_map_slots(hint) {
        Some(slots) => slots.checked_next_power_of_two(),
        None => None,
    }
}

/// Cell count for a deque: the hint rounded up to an even number, at least
/// 2.
///
/// # Panics
///
/// Panics if rounding up overflows `usize`; see [`checked_deque_slots`].
#[inline]
pub const fn deque_slots(hint: usize) -> usize {
    match checked_deque_slots(hint) {
        Some(cells) => cells,
        None => panic!("deque capacity overflow"),
    }
}

/// Like [`deque_slots`], but returns `None` when the cell count does not fit
/// in `usize`.
#[inline]
pub const fn checked_deque_slots(hint: usize) -> Option<usize> {
    if hint < 2 {
        Some(2)
    } else {
        hint.checked_add(hint & 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_doubles_without_rounding() {
        assert_eq!(map_slots(0), 2);
        assert_eq!(map_slots(1), 2);
        assert_eq!(map_slots(3), 6);
        assert_eq!(map_slots(4), 8);
        assert_eq!(map_slots(11), 22);
        assert_eq!(map_slots(33), 66);
    }

    #[test]
    fn set_rounds_to_power_of_two() {
        assert_eq!(set_slots(0), 2);
        assert_eq!(set_slots(1), 2);
        assert_eq!(set_slots(2), 4);
        assert_eq!(set_slots(3), 8);
        assert_eq!(set_slots(4), 8);
        assert_eq!(set_slots(11), 32);
        assert_eq!(set_slots(20), 64);
        assert_eq!(set_slots(30), 64);
    }

    #[test]
    fn deque_rounds_to_even() {
        assert_eq!(deque_slots(0), 2);
        assert_eq!(deque_slots(1), 2);
        assert_eq!(deque_slots(2), 2);
        assert_eq!(deque_slots(3), 4);
        assert_eq!(deque_slots(5), 6);
        assert_eq!(deque_slots(8), 8);
    }

    #[test]
    fn checked_sizes_report_overflow() {
        assert_eq!(checked_map_slots(4), Some(8));
        assert_eq!(checked_set_slots(3), Some(8));
        assert_eq!(checked_deque_slots(5), Some(6));

        assert_eq!(checked_map_slots(usize::MAX), None);
        assert_eq!(checked_map_slots(usize::MAX / 2 + 1), None);
        assert_eq!(checked_set_slots(usize::MAX), None);
        assert_eq!(checked_set_slots(usize::MAX / 4 + 1), None);
        assert_eq!(checked_deque_slots(usize::MAX), None);
        assert_eq!(checked_deque_slots(usize::MAX - 1), Some(usize::MAX - 1));

        // Every slot count that is reported keeps the even geometry.
        assert_eq!(checked_map_slots(usize::MAX / 2).map(|n| n % 2), Some(0));
    }

    #[test]
    #[should_panic(expected = "map capacity overflow")]
    fn map_slots_panics_on_overflow() {
        map_slots(usize::MAX);
    }

    #[test]
    fn size_classes() {
        let hints: alloc::vec::Vec<usize> = SizeClass::ALL.iter().map(|c| c.hint()).collect();
        assert_eq!(hints, [4, 8, 16, 32, 64, 128, 256, 512, 1024]);

        for class in SizeClass::ALL {
            assert_eq!(map_slots(class.into()), class.hint() * 2);
            assert_eq!(set_slots(class.into()), class.hint() * 2);
            assert_eq!(deque_slots(class.into()), class.hint());
        }
    }
}
