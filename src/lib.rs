#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "log")] {
        macro_rules! trace_event {
            ($($arg:tt)+) => { log::trace!(target: "buffer_collections", $($arg)+) };
        }
    } else {
        macro_rules! trace_event {
            ($($arg:tt)+) => {{
                if false {
                    let _ = ::core::format_args!($($arg)+);
                }
            }};
        }
    }
}

/// Capacity sizing policies and the preset size classes.
pub mod capacity;

/// A fixed-capacity ring-buffer double-ended queue.
///
/// This module provides `RingDeque`, which stores its elements in a single
/// even-length buffer and supports O(1) pushes and pops at both ends.
pub mod deque;

mod error;

/// A fixed-capacity map built on the open-addressing `HashTable`.
///
/// This module provides a `FixedMap` that wraps the `HashTable` and provides
/// a key-value interface with pluggable key strategies.
pub mod hash_map;

/// A fixed-capacity set built on the open-addressing `HashTable`.
///
/// This module provides a `FixedSet` that wraps the `HashTable` and provides
/// a set interface with pluggable key strategies.
pub mod hash_set;

pub mod hash_table;

/// Hashing and equality strategies injected into the hashed containers.
pub mod strategy;

pub use capacity::SizeClass;
pub use deque::RingDeque;
pub use error::Error;
pub use error::Result;
pub use hash_map::FixedMap;
pub use hash_set::FixedSet;
pub use hash_table::HashTable;
pub use hash_table::InsertOutcome;
pub use strategy::Identity;
pub use strategy::KeyStrategy;

/// Builds a [`FixedMap`] from a literal list of `key => value` pairs.
///
/// Entries are inserted in listed order, so later duplicates overwrite
/// earlier ones. The capacity hint defaults to the number of listed entries;
/// prefix the list with `capacity;` to pass a larger hint. Keys use the
/// [`Identity`] strategy; call [`FixedMap::from_entries`] directly for any
/// other.
///
/// ```rust
/// use buffer_collections::fixed_map;
///
/// let map = fixed_map! { 1 => 10, 2 => 20, 3 => 30 };
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.capacity(), 6);
///
/// let map = fixed_map! { 6; 1 => 10 };
/// assert_eq!(map.capacity(), 12);
/// ```
#[macro_export]
macro_rules! fixed_map {
    ($capacity:expr; $($key:expr => $value:expr),* $(,)?) => {
        $crate::FixedMap::<_, _>::from_entries_with_capacity($capacity, [$(($key, $value)),*])
    };
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::FixedMap::<_, _>::from_entries([$(($key, $value)),*])
    };
}

/// Builds a [`FixedSet`] from a literal list of values.
///
/// Duplicates are no-ops. The capacity hint defaults to the number of listed
/// values; prefix the list with `capacity;` to pass a larger hint. Values use
/// the [`Identity`] strategy.
///
/// ```rust
/// use buffer_collections::fixed_set;
///
/// let set = fixed_set!['a', 'b', 'c'];
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.capacity(), 8);
/// ```
#[macro_export]
macro_rules! fixed_set {
    ($capacity:expr; $($value:expr),* $(,)?) => {
        $crate::FixedSet::<_>::from_values_with_capacity($capacity, [$($value),*])
    };
    ($($value:expr),* $(,)?) => {
        $crate::FixedSet::<_>::from_values([$($value),*])
    };
}

/// Builds a [`RingDeque`] from a literal list of values, front to back.
///
/// ```rust
/// use buffer_collections::ring_deque;
///
/// let deque = ring_deque![1, 2, 3];
/// assert_eq!(deque.capacity(), 4);
/// assert_eq!(deque.front(), Some(&1));
/// assert_eq!(deque.back(), Some(&3));
/// ```
#[macro_export]
macro_rules! ring_deque {
    ($capacity:expr; $($value:expr),* $(,)?) => {
        $crate::RingDeque::from_values_with_capacity($capacity, [$($value),*])
    };
    ($($value:expr),* $(,)?) => {
        $crate::RingDeque::from_values([$($value),*])
    };
}
