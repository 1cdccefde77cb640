//! Error model shared by every container in the crate.

use thiserror::Error;

/// Result alias used by the fallible container operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Conditions that prevent a container operation from completing.
///
/// Lookups that miss are not errors; they are reported through `Option` or
/// `bool` returns.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The container is at its fill limit and cannot accept a new element.
    ///
    /// For the hashed containers the limit is half of the slot count; for
    /// the deque it is the full buffer length. The container is left
    /// unchanged.
    #[error("container is full: {len} of {limit} usable slots taken")]
    CapacityExceeded {
        /// Number of elements stored when the operation was rejected.
        len: usize,
        /// Maximum number of elements the container accepts.
        limit: usize,
    },

    /// The backing buffer could not be allocated.
    #[error("failed to allocate a buffer of {slots} slots")]
    Allocation {
        /// Number of slots that were requested.
        slots: usize,
    },
}
