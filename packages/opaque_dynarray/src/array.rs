use std::any::type_name;
use std::fmt;
use std::num::NonZero;

use tracing::{debug, trace, warn};

use crate::{Error, OpaqueDynArrayBuilder, Result, byte_range, copy_elements};

/// A growable array of fixed-size elements whose type is not known to the array.
///
/// Every element is an opaque sequence of exactly [`element_size()`](Self::element_size)
/// bytes, chosen when the array is created. Elements are passed in and out as byte slices; the
/// caller is responsible for converting between their own types and the byte representation.
///
/// The array tracks its capacity (the number of element slots in the backing store) separately
/// from its length (the number of slots that have been populated). Inserting into a full array
/// doubles the capacity. Deleting never releases capacity.
///
/// # Slot access
///
/// [`set()`](Self::set) and [`get()`](Self::get) address any slot below the capacity, not only
/// the populated ones. Slots past the length read as zero bytes unless they were written by
/// [`set()`](Self::set). [`insert()`](Self::insert) and [`delete()`](Self::delete) operate on
/// the populated part of the array and move elements to keep it contiguous.
///
/// # Examples
///
/// ```
/// use opaque_dynarray::OpaqueDynArray;
///
/// let mut array = OpaqueDynArray::builder()
///     .element_size_of::<u32>()
///     .build()
///     .unwrap();
///
/// array.insert(0, &7_u32.to_ne_bytes()).unwrap();
/// array.insert(0, &3_u32.to_ne_bytes()).unwrap();
///
/// let mut buffer = [0; 4];
/// array.get(1, &mut buffer).unwrap();
/// assert_eq!(u32::from_ne_bytes(buffer), 7);
///
/// assert_eq!(array.len(), 2);
/// assert_eq!(array.capacity(), 2);
/// ```
///
/// # Thread safety
///
/// The array is thread-mobile ([`Send`]) and can be shared between threads ([`Sync`]) for
/// reading. It contains no interior mutability.
#[derive(Clone)]
pub struct OpaqueDynArray {
    /// Zero-initialized backing store of exactly `capacity * element_size` bytes.
    bytes: Vec<u8>,

    /// Size in bytes of every element, fixed at creation.
    element_size: NonZero<usize>,

    /// Number of element slots in `bytes`.
    capacity: usize,

    /// Number of leading slots that are populated. Never exceeds `capacity`.
    len: usize,
}

impl OpaqueDynArray {
    /// Creates a builder for configuring and constructing an [`OpaqueDynArray`].
    ///
    /// You must specify an element size using either `.element_size()` or
    /// `.element_size_of::<T>()` before calling `.build()`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use opaque_dynarray::OpaqueDynArray;
    ///
    /// let array = OpaqueDynArray::builder()
    ///     .element_size_of::<u64>()
    ///     .len(10)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(array.len(), 10);
    /// assert_eq!(array.capacity(), 10);
    /// ```
    #[inline]
    pub fn builder() -> OpaqueDynArrayBuilder {
        OpaqueDynArrayBuilder::new()
    }

    /// Creates an array of `len` zero-filled elements of `element_size` bytes each.
    ///
    /// This is a shorthand for configuring both values via [`builder()`](Self::builder).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the backing store cannot be allocated and
    /// [`Error::CapacityOverflow`] if its size in bytes is not representable.
    pub fn new(len: usize, element_size: NonZero<usize>) -> Result<Self> {
        Self::new_inner(len, element_size)
    }

    pub(crate) fn new_inner(len: usize, element_size: NonZero<usize>) -> Result<Self> {
        let bytes = allocate_zeroed(len, element_size)?;

        Ok(Self {
            bytes,
            element_size,
            capacity: len,
            len,
        })
    }

    /// Returns the size in bytes of every element in the array.
    #[must_use]
    pub fn element_size(&self) -> NonZero<usize> {
        self.element_size
    }

    /// Returns the number of populated slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of slots in the backing store.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no slots are populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bytes of the populated slots, element after element.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
            .get(byte_range(0, self.len, self.element_size))
            .expect("length of the array never exceeds its capacity")
    }

    /// Returns the bytes of the slot at `index`, or `None` if `index` is not below
    /// [`capacity()`](Self::capacity).
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&[u8]> {
        if index >= self.capacity {
            return None;
        }

        self.bytes.get(byte_range(index, 1, self.element_size))
    }

    /// Returns the bytes of the slot at `index` for modification, or `None` if `index` is not
    /// below [`capacity()`](Self::capacity).
    #[must_use]
    pub fn element_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.capacity {
            return None;
        }

        self.bytes.get_mut(byte_range(index, 1, self.element_size))
    }

    /// Overwrites the slot at `index` with `element`.
    ///
    /// This never grows the array and does not change its length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementSizeMismatch`] if `element` is not exactly
    /// [`element_size()`](Self::element_size) bytes long.
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not below
    /// [`capacity()`](Self::capacity).
    pub fn set(&mut self, index: usize, element: &[u8]) -> Result<()> {
        self.check_element_size(element.len())?;

        let capacity = self.capacity;

        let Some(slot) = self.element_mut(index) else {
            trace!(index, capacity, "rejecting set outside of backing store");
            return Err(Error::IndexOutOfBounds {
                index,
                bound: capacity,
            });
        };

        slot.copy_from_slice(element);

        Ok(())
    }

    /// Copies the slot at `index` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementSizeMismatch`] if `destination` is not exactly
    /// [`element_size()`](Self::element_size) bytes long.
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not below
    /// [`capacity()`](Self::capacity). The destination is not modified.
    pub fn get(&self, index: usize, destination: &mut [u8]) -> Result<()> {
        self.check_element_size(destination.len())?;

        let Some(slot) = self.element(index) else {
            trace!(
                index,
                capacity = self.capacity,
                "rejecting get outside of backing store"
            );
            return Err(Error::IndexOutOfBounds {
                index,
                bound: self.capacity,
            });
        };

        destination.copy_from_slice(slot);

        Ok(())
    }

    /// Inserts `element` at `index`, moving every populated slot at or after `index` one
    /// position up.
    ///
    /// An `index` equal to [`len()`](Self::len) appends the element. If every slot is
    /// populated, the backing store is first replaced with one of double the capacity (or a
    /// single slot if the capacity was zero).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementSizeMismatch`] if `element` is not exactly
    /// [`element_size()`](Self::element_size) bytes long.
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is greater than [`len()`](Self::len).
    ///
    /// Returns [`Error::AllocationFailed`] or [`Error::CapacityOverflow`] if the backing store
    /// needed to grow and could not. The array is left unmodified.
    pub fn insert(&mut self, index: usize, element: &[u8]) -> Result<()> {
        self.check_element_size(element.len())?;

        if index > self.len {
            trace!(index, len = self.len, "rejecting insert past the end of array");

            return Err(Error::IndexOutOfBounds {
                index,
                // Cannot overflow because the length is bounded by the size of an allocation.
                bound: self.len.wrapping_add(1),
            });
        }

        if self.len == self.capacity {
            self.grow_and_insert(index, element)?;
        } else {
            self.shift_and_insert(index, element);
        }

        // Cannot overflow because both branches made sure there was a free slot.
        self.len = self.len.wrapping_add(1);

        Ok(())
    }

    /// Appends `element` after the last populated slot.
    ///
    /// Equivalent to `insert(len(), element)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementSizeMismatch`] if `element` is not exactly
    /// [`element_size()`](Self::element_size) bytes long.
    ///
    /// Returns [`Error::AllocationFailed`] or [`Error::CapacityOverflow`] if the backing store
    /// needed to grow and could not. The array is left unmodified.
    pub fn push(&mut self, element: &[u8]) -> Result<()> {
        self.insert(self.len, element)
    }

    /// Removes the element at `index`, moving every populated slot after `index` one position
    /// down.
    ///
    /// The slot that becomes unpopulated is zero-filled. The capacity is not reduced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not below [`len()`](Self::len). This
    /// is always the case for an empty array.
    pub fn delete(&mut self, index: usize) -> Result<()> {
        if index >= self.len {
            trace!(index, len = self.len, "rejecting delete outside of array");
            return Err(Error::IndexOutOfBounds {
                index,
                bound: self.len,
            });
        }

        // Cannot underflow because index < len.
        let last = self.len.wrapping_sub(1);

        // Cannot overflow because index < len.
        let following = index.wrapping_add(1);

        // Shifting the tail down overwrites the deleted element. If it was the last one,
        // the tail is empty and zero-filling the last slot clears it.
        let tail = byte_range(following, last.wrapping_sub(index), self.element_size);
        let destination = byte_range(index, 1, self.element_size).start;
        self.bytes.copy_within(tail, destination);

        self.slot_mut(last).fill(0);

        self.len = last;

        Ok(())
    }

    fn check_element_size(&self, actual: usize) -> Result<()> {
        if actual == self.element_size.get() {
            Ok(())
        } else {
            trace!(
                expected = self.element_size.get(),
                actual,
                "rejecting element buffer of wrong size"
            );

            Err(Error::ElementSizeMismatch {
                expected: self.element_size.get(),
                actual,
            })
        }
    }

    fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        let capacity = self.capacity;

        self.element_mut(index).unwrap_or_else(|| {
            panic!("slot {index} is out of bounds in backing store of capacity {capacity}")
        })
    }

    /// Inserts into a backing store with at least one vacant slot after the last element.
    fn shift_and_insert(&mut self, index: usize, element: &[u8]) {
        debug_assert!(self.len < self.capacity);

        // Cannot underflow because index <= len.
        let tail = byte_range(index, self.len.wrapping_sub(index), self.element_size);

        // Cannot overflow because the shifted tail still ends within the backing store.
        let destination = tail.start.wrapping_add(self.element_size.get());

        self.bytes.copy_within(tail, destination);
        self.slot_mut(index).copy_from_slice(element);
    }

    /// Inserts into a full backing store by relocating all elements into a larger one.
    ///
    /// The head before `index`, the new element and the tail from `index` onwards are each
    /// copied into their final position in the new backing store. The new backing store is
    /// fully allocated before anything is copied, so on failure the array is unchanged.
    fn grow_and_insert(&mut self, index: usize, element: &[u8]) -> Result<()> {
        let capacity = self.capacity;
        let element_size = self.element_size;

        let new_capacity = next_capacity(capacity).ok_or(Error::CapacityOverflow {
            capacity,
            element_size: element_size.get(),
        })?;

        let mut new_bytes = allocate_zeroed(new_capacity, element_size)?;

        debug!(
            capacity,
            new_capacity,
            element_size = element_size.get(),
            "growing backing store"
        );

        // Cannot underflow because index <= len.
        let tail_len = self.len.wrapping_sub(index);

        // Cannot overflow because index <= len < new_capacity.
        let shifted_index = index.wrapping_add(1);

        copy_elements(&self.bytes, 0, &mut new_bytes, 0, element_size, index);
        copy_elements(element, 0, &mut new_bytes, index, element_size, 1);
        copy_elements(
            &self.bytes,
            index,
            &mut new_bytes,
            shifted_index,
            element_size,
            tail_len,
        );

        self.bytes = new_bytes;
        self.capacity = new_capacity;

        Ok(())
    }
}

/// Returns the capacity a full backing store of `capacity` slots grows to, or `None` if that
/// is not representable.
fn next_capacity(capacity: usize) -> Option<usize> {
    if capacity == 0 {
        Some(1)
    } else {
        capacity.checked_mul(2)
    }
}

/// Allocates a zero-filled backing store for `capacity` elements of `element_size` bytes.
fn allocate_zeroed(capacity: usize, element_size: NonZero<usize>) -> Result<Vec<u8>> {
    let byte_len = capacity
        .checked_mul(element_size.get())
        .ok_or(Error::CapacityOverflow {
            capacity,
            element_size: element_size.get(),
        })?;

    let mut bytes = Vec::new();

    if let Err(error) = bytes.try_reserve_exact(byte_len) {
        warn!(byte_len, %error, "backing store allocation failed");
        return Err(Error::AllocationFailed {
            requested_bytes: byte_len,
        });
    }

    bytes.resize(byte_len, 0);

    Ok(bytes)
}

impl fmt::Debug for OpaqueDynArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("element_size", &self.element_size)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::fmt::Debug;

    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(OpaqueDynArray: Send, Sync, Debug, Clone);

    fn u32_array(len: usize) -> OpaqueDynArray {
        OpaqueDynArray::builder()
            .element_size_of::<u32>()
            .len(len)
            .build()
            .unwrap()
    }

    fn from_values(values: &[u32]) -> OpaqueDynArray {
        let mut array = u32_array(values.len());

        for (index, value) in values.iter().enumerate() {
            array.set(index, &value.to_ne_bytes()).unwrap();
        }

        array
    }

    fn read(array: &OpaqueDynArray, index: usize) -> u32 {
        let mut buffer = [0; 4];
        array.get(index, &mut buffer).unwrap();
        u32::from_ne_bytes(buffer)
    }

    fn values(array: &OpaqueDynArray) -> Vec<u32> {
        (0..array.len()).map(|index| read(array, index)).collect()
    }

    /// Asserts that the backing store matches the recorded capacity and that every slot
    /// past the length is zero-filled.
    fn assert_spare_slots_zeroed(array: &OpaqueDynArray) {
        assert_eq!(
            array.bytes.len(),
            array.capacity * array.element_size.get()
        );

        for index in array.len()..array.capacity() {
            assert!(array.element(index).unwrap().iter().all(|byte| *byte == 0));
        }
    }

    #[test]
    fn new_with_zero_len_is_empty() {
        let array = OpaqueDynArray::new(0, nz!(4)).unwrap();

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
        assert!(array.is_empty());
        assert!(array.as_bytes().is_empty());
    }

    #[test]
    fn new_sets_len_and_capacity() {
        let array = OpaqueDynArray::new(10, nz!(4)).unwrap();

        assert_eq!(array.len(), 10);
        assert_eq!(array.capacity(), 10);
        assert_eq!(array.as_bytes().len(), 40);
        assert!(array.as_bytes().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut array = u32_array(5);

        for (index, value) in [1_u32, 2, 3, 4, 5].into_iter().enumerate() {
            array.set(index, &value.to_ne_bytes()).unwrap();
        }

        assert_eq!(values(&array), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn set_and_get_out_of_bounds_fail() {
        let mut array = u32_array(2);
        let mut buffer = [0xff; 4];

        assert_eq!(
            array.set(2, &[1; 4]),
            Err(Error::IndexOutOfBounds { index: 2, bound: 2 })
        );
        assert_eq!(
            array.get(2, &mut buffer),
            Err(Error::IndexOutOfBounds { index: 2, bound: 2 })
        );

        // The destination is left alone on failure.
        assert_eq!(buffer, [0xff; 4]);
    }

    #[test]
    fn set_and_get_reach_spare_capacity() {
        let mut array = u32_array(0);
        array.push(&1_u32.to_ne_bytes()).unwrap();
        array.push(&2_u32.to_ne_bytes()).unwrap();
        array.push(&3_u32.to_ne_bytes()).unwrap();
        assert_eq!(array.capacity(), 4);

        // Slot 3 is allocated but not populated.
        assert_eq!(read(&array, 3), 0);
        array.set(3, &9_u32.to_ne_bytes()).unwrap();
        assert_eq!(read(&array, 3), 9);
        assert_eq!(array.len(), 3);

        // Appending overwrites the spare slot.
        array.push(&4_u32.to_ne_bytes()).unwrap();
        assert_eq!(values(&array), [1, 2, 3, 4]);
    }

    #[test]
    fn wrong_element_size_is_rejected() {
        let mut array = u32_array(1);

        assert_eq!(
            array.set(0, &[1, 2]),
            Err(Error::ElementSizeMismatch {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(
            array.get(0, &mut [0; 8]),
            Err(Error::ElementSizeMismatch {
                expected: 4,
                actual: 8
            })
        );
        assert_eq!(
            array.insert(0, &[]),
            Err(Error::ElementSizeMismatch {
                expected: 4,
                actual: 0
            })
        );

        assert_eq!(array.len(), 1);
        assert_eq!(array.capacity(), 1);
    }

    #[test]
    fn head_insertions_double_capacity() {
        let mut array = u32_array(0);

        array.insert(0, &1_u32.to_ne_bytes()).unwrap();
        assert_eq!(array.capacity(), 1);
        assert_eq!(array.len(), 1);

        array.insert(0, &2_u32.to_ne_bytes()).unwrap();
        assert_eq!(array.capacity(), 2);
        assert_eq!(array.len(), 2);

        array.insert(0, &3_u32.to_ne_bytes()).unwrap();
        assert_eq!(array.capacity(), 4);
        assert_eq!(array.len(), 3);

        assert_eq!(values(&array), [3, 2, 1]);
        assert_spare_slots_zeroed(&array);
    }

    #[test]
    fn insert_while_growing_preserves_order() {
        for index in 0..=4 {
            let mut array = from_values(&[1, 2, 3, 4]);

            array.insert(index, &99_u32.to_ne_bytes()).unwrap();

            let mut expected = vec![1, 2, 3, 4];
            expected.insert(index, 99);

            assert_eq!(values(&array), expected, "insert at {index}");
            assert_eq!(array.capacity(), 8);
            assert_spare_slots_zeroed(&array);
        }
    }

    #[test]
    fn insert_into_spare_capacity_preserves_order() {
        for index in 0..=3 {
            let mut array = from_values(&[1, 2, 3, 4]);
            array.delete(3).unwrap();

            array.insert(index, &99_u32.to_ne_bytes()).unwrap();

            let mut expected = vec![1, 2, 3];
            expected.insert(index, 99);

            assert_eq!(values(&array), expected, "insert at {index}");
            assert_eq!(array.capacity(), 4);
        }
    }

    #[test]
    fn insert_mixed_positions() {
        let mut array = from_values(&[1, 2, 3, 4, 5]);

        array.insert(0, &0xfa_u32.to_ne_bytes()).unwrap();
        assert_eq!(array.len(), 6);
        assert_eq!(array.capacity(), 10);

        array.insert(3, &0xfb_u32.to_ne_bytes()).unwrap();
        assert_eq!(array.len(), 7);
        assert_eq!(array.capacity(), 10);

        array.insert(7, &0xfc_u32.to_ne_bytes()).unwrap();
        assert_eq!(array.len(), 8);
        assert_eq!(array.capacity(), 10);

        assert_eq!(values(&array), [0xfa, 1, 2, 0xfb, 3, 4, 5, 0xfc]);
        assert_spare_slots_zeroed(&array);
    }

    #[test]
    fn insert_past_end_fails() {
        let mut array = from_values(&[1, 2, 3]);

        assert_eq!(
            array.insert(4, &9_u32.to_ne_bytes()),
            Err(Error::IndexOutOfBounds { index: 4, bound: 4 })
        );
        assert_eq!(values(&array), [1, 2, 3]);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn delete_closes_gap() {
        let mut array = from_values(&[1, 2, 3, 4, 5, 6, 7]);

        array.delete(0).unwrap();
        array.delete(3).unwrap();
        array.delete(4).unwrap();

        assert_eq!(values(&array), [2, 3, 4, 6]);
        assert_eq!(array.len(), 4);
        assert_eq!(array.capacity(), 7);
        assert_spare_slots_zeroed(&array);
    }

    #[test]
    fn delete_last_element_zeroes_slot() {
        let mut array = from_values(&[1, 2, 3]);

        array.delete(2).unwrap();

        assert_eq!(values(&array), [1, 2]);
        assert_eq!(read(&array, 2), 0);
    }

    #[test]
    fn delete_on_empty_fails() {
        let mut array = u32_array(0);

        assert_eq!(
            array.delete(0),
            Err(Error::IndexOutOfBounds { index: 0, bound: 0 })
        );
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn deleted_slot_is_reused_without_growth() {
        let mut array = from_values(&[1, 2, 3]);

        array.delete(0).unwrap();
        array.push(&4_u32.to_ne_bytes()).unwrap();

        assert_eq!(values(&array), [2, 3, 4]);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn single_byte_elements() {
        let mut array = OpaqueDynArray::new(0, nz!(1)).unwrap();

        for byte in b"hello" {
            array.push(&[*byte]).unwrap();
        }

        array.insert(0, b">").unwrap();
        array.delete(3).unwrap();

        assert_eq!(array.as_bytes(), b">helo");
        assert_eq!(array.capacity(), 8);
    }

    #[test]
    fn element_mut_modifies_in_place() {
        let mut array = from_values(&[1, 2]);

        array
            .element_mut(1)
            .unwrap()
            .copy_from_slice(&20_u32.to_ne_bytes());

        assert_eq!(values(&array), [1, 20]);
        assert!(array.element_mut(2).is_none());
    }

    #[test]
    fn growth_overflow_is_reported() {
        assert_eq!(next_capacity(0), Some(1));
        assert_eq!(next_capacity(3), Some(6));
        assert_eq!(next_capacity(usize::MAX), None);
    }

    #[test]
    fn debug_describes_shape() {
        let array = from_values(&[1, 2, 3]);

        let debug = format!("{array:?}");

        assert!(debug.contains("element_size: 4"));
        assert!(debug.contains("len: 3"));
        assert!(debug.contains("capacity: 3"));
    }
}
