use thiserror::Error;

/// Errors that can occur when operating on a [`DynArray`][crate::DynArray].
///
/// All errors leave the array exactly as it was before the failed operation.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The caller addressed a position outside the range the operation accepts.
    ///
    /// For lookups, updates and deletions the accepted range is `0..len`. For insertion it is
    /// `0..=len`, the upper bound meaning "append".
    #[error("index {index} is out of bounds, expected an index below {bound}")]
    IndexOutOfBounds {
        /// The index the caller provided.
        index: usize,

        /// The exclusive upper bound of the accepted range at the time of the call.
        bound: usize,
    },

    /// The allocator could not provide memory for a backing store of the requested size.
    #[error("failed to allocate a backing store for {requested} elements")]
    AllocationFailed {
        /// The number of element slots that were requested.
        requested: usize,
    },

    /// Growing the backing store would exceed the maximum representable capacity.
    #[error("cannot grow a backing store of capacity {capacity} without overflowing")]
    CapacityOverflow {
        /// The capacity at the time growth was attempted.
        capacity: usize,
    },
}

/// A specialized `Result` type for dynamic array operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn index_out_of_bounds_mentions_index_and_bound() {
        let error = Error::IndexOutOfBounds { index: 7, bound: 3 };

        let message = error.to_string();
        assert!(message.contains('7'));
        assert!(message.contains('3'));
    }

    #[test]
    fn allocation_failed_mentions_requested_size() {
        let error = Error::AllocationFailed { requested: 1024 };

        assert!(error.to_string().contains("1024"));
    }
}
