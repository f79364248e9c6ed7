use std::cell::Cell;
use std::marker::PhantomData;
use std::mem;
use std::num::NonZero;

use crate::{OpaqueDynArray, Result};

/// Builder for creating an instance of [`OpaqueDynArray`].
///
/// [`OpaqueDynArray`] requires the element size to be specified at construction time.
/// Use either `.element_size()` to provide a specific size in bytes or `.element_size_of::<T>()`
/// to use the size of the provided type.
///
/// The element size is mandatory, whereas the initial length is optional and defaults to zero.
///
/// # Examples
///
/// Using a specific element size:
///
/// ```
/// use std::num::NonZero;
///
/// use opaque_dynarray::OpaqueDynArray;
///
/// let array = OpaqueDynArray::builder()
///     .element_size(NonZero::new(12).unwrap())
///     .len(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(array.len(), 4);
/// assert_eq!(array.element_size().get(), 12);
/// ```
///
/// Using type-based element size:
///
/// ```
/// use opaque_dynarray::OpaqueDynArray;
///
/// let array = OpaqueDynArray::builder()
///     .element_size_of::<u64>()
///     .build()
///     .unwrap();
///
/// assert!(array.is_empty());
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing array configuration to happen on different threads than where the array is used.
/// However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct OpaqueDynArrayBuilder {
    element_size: Option<NonZero<usize>>,
    len: usize,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl OpaqueDynArrayBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            element_size: None,
            len: 0,
            _not_sync: PhantomData,
        }
    }

    /// Sets the size in bytes of each element stored in the array.
    #[inline]
    pub fn element_size(mut self, element_size: NonZero<usize>) -> Self {
        self.element_size = Some(element_size);
        self
    }

    /// Sets the size in bytes of each element stored in the array based on a type.
    ///
    /// This is a convenience method that uses the size of `T` as the element size. Note that
    /// the array only stores bytes, so values of `T` still need to be converted to and from
    /// their byte representation by the caller.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_dynarray::OpaqueDynArray;
    ///
    /// let array = OpaqueDynArray::builder()
    ///     .element_size_of::<u32>()
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(array.element_size().get(), 4);
    /// ```
    #[inline]
    pub fn element_size_of<T>(mut self) -> Self {
        let element_size = NonZero::new(mem::size_of::<T>())
            .expect("OpaqueDynArray must have non-zero element size");
        self.element_size = Some(element_size);
        self
    }

    /// Sets the initial length of the array.
    ///
    /// The array starts out with this many zero-filled elements and a capacity of exactly
    /// this many slots.
    #[inline]
    pub fn len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    /// Builds the array with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if the backing store
    /// cannot be allocated and [`Error::CapacityOverflow`][crate::Error::CapacityOverflow] if
    /// its size in bytes is not representable.
    ///
    /// # Panics
    ///
    /// Panics if no element size has been set using either
    /// [`element_size`](Self::element_size) or [`element_size_of`](Self::element_size_of).
    #[inline]
    pub fn build(self) -> Result<OpaqueDynArray> {
        let element_size = self.element_size.expect(
            "element size must be set using .element_size() or .element_size_of::<T>() before calling .build()",
        );

        OpaqueDynArray::new_inner(self.len, element_size)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::Error;

    assert_impl_all!(OpaqueDynArrayBuilder: Send, std::fmt::Debug);
    assert_not_impl_any!(OpaqueDynArrayBuilder: Sync);

    #[test]
    fn builder_new_creates_default_state() {
        let builder = OpaqueDynArrayBuilder::new();

        assert!(builder.element_size.is_none());
        assert_eq!(builder.len, 0);
    }

    #[test]
    fn element_size_sets_size() {
        let builder = OpaqueDynArrayBuilder::new().element_size(nz!(24));

        assert_eq!(builder.element_size, Some(nz!(24)));
    }

    #[test]
    fn element_size_of_uses_type_size() {
        let builder = OpaqueDynArrayBuilder::new().element_size_of::<[u16; 3]>();

        assert_eq!(builder.element_size, Some(nz!(6)));
    }

    #[test]
    #[should_panic]
    fn element_size_of_zero_sized_type_panics() {
        let _builder = OpaqueDynArrayBuilder::new().element_size_of::<()>();
    }

    #[test]
    #[should_panic]
    fn build_without_element_size_panics() {
        let _array = OpaqueDynArrayBuilder::new().len(3).build();
    }

    #[test]
    fn element_size_can_be_overridden() {
        let builder = OpaqueDynArrayBuilder::new()
            .element_size_of::<u64>()
            .element_size(nz!(3));

        assert_eq!(builder.element_size, Some(nz!(3)));
    }

    #[test]
    fn build_applies_configuration() {
        let array = OpaqueDynArrayBuilder::new()
            .element_size(nz!(8))
            .len(5)
            .build()
            .unwrap();

        assert_eq!(array.element_size(), nz!(8));
        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 5);
    }

    #[test]
    fn build_with_unrepresentable_size_fails() {
        let result = OpaqueDynArrayBuilder::new()
            .element_size(nz!(16))
            .len(usize::MAX)
            .build();

        assert_eq!(
            result.unwrap_err(),
            Error::CapacityOverflow {
                capacity: usize::MAX,
                element_size: 16
            }
        );
    }

    #[test]
    fn build_with_unallocatable_size_fails() {
        let result = OpaqueDynArrayBuilder::new()
            .element_size(nz!(1))
            .len(usize::MAX)
            .build();

        assert_eq!(
            result.unwrap_err(),
            Error::AllocationFailed {
                requested_bytes: usize::MAX
            }
        );
    }
}
