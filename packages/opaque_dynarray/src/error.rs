use thiserror::Error;

/// Errors that can occur when creating or operating on an
/// [`OpaqueDynArray`][crate::OpaqueDynArray].
///
/// All errors leave the array exactly as it was before the failed operation.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The caller addressed a slot outside the range the operation accepts.
    #[error("index {index} is out of bounds, expected an index below {bound}")]
    IndexOutOfBounds {
        /// The index the caller provided.
        index: usize,

        /// The exclusive upper bound of the accepted range at the time of the call.
        bound: usize,
    },

    /// The caller provided a byte buffer whose length is not the element size of the array.
    #[error("element buffer has {actual} bytes but the array stores elements of {expected} bytes")]
    ElementSizeMismatch {
        /// The element size of the array.
        expected: usize,

        /// The length of the buffer the caller provided.
        actual: usize,
    },

    /// The allocator could not provide memory for a backing store of the requested size.
    #[error("failed to allocate a backing store of {requested_bytes} bytes")]
    AllocationFailed {
        /// The size of the backing store that was requested, in bytes.
        requested_bytes: usize,
    },

    /// The requested number of slots cannot be represented as a byte size.
    #[error("a backing store of {capacity} elements of {element_size} bytes overflows")]
    CapacityOverflow {
        /// The number of slots that was requested.
        capacity: usize,

        /// The element size of the array.
        element_size: usize,
    },
}

/// A specialized `Result` type for opaque dynamic array operations, returning the crate's
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
    fn element_size_mismatch_mentions_both_sizes() {
        let error = Error::ElementSizeMismatch {
            expected: 4,
            actual: 8,
        };

        let message = error.to_string();
        assert!(message.contains("4 bytes"));
        assert!(message.contains("8 bytes"));
    }

    #[test]
    fn capacity_overflow_is_error() {
        let error = Error::CapacityOverflow {
            capacity: usize::MAX,
            element_size: 2,
        };

        let result: Result<()> = Err(error);
        assert!(result.is_err());
    }
}
