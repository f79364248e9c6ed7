use std::any::type_name;
use std::{fmt, mem};

use tracing::{debug, trace, warn};

use crate::{Error, Result, next_capacity};

/// A growable array of `T` that doubles its backing store whenever an insertion finds it full.
///
/// The array distinguishes between its capacity (the number of slots in the backing store) and
/// its length (the number of slots holding elements the caller placed there). Slots past the
/// length hold `T::default()` and are not observable through the public API.
///
/// Every operation that can fail returns a [`Result`] and leaves the array untouched on
/// failure. This includes allocation failure when the backing store needs to grow: the array
/// does not abort the process but reports [`Error::AllocationFailed`].
///
/// The backing store never shrinks. Deleting elements keeps the capacity as is, so a subsequent
/// insertion into the freed space does not need to allocate.
///
/// # Examples
///
/// ```
/// use dynarray::DynArray;
///
/// let mut array = DynArray::<u32>::new();
/// assert_eq!(array.capacity(), 0);
///
/// array.insert(0, 10).unwrap();
/// array.insert(0, 20).unwrap();
/// array.insert(2, 30).unwrap();
///
/// assert_eq!(array.as_slice(), &[20, 10, 30]);
/// assert_eq!(array.len(), 3);
/// assert_eq!(array.capacity(), 4);
///
/// assert_eq!(array.delete(1), Ok(10));
/// assert_eq!(array.as_slice(), &[20, 30]);
/// assert_eq!(array.capacity(), 4);
/// ```
///
/// # Thread safety
///
/// The array is [`Send`] and [`Sync`] whenever `T` is. It contains no interior mutability.
pub struct DynArray<T> {
    /// The backing store. Every slot is initialized, so `slots.len()` is the capacity of the
    /// array. We never rely on the spare capacity of the `Vec` itself.
    slots: Vec<T>,

    /// Number of leading slots that hold caller-provided elements. Never exceeds `slots.len()`.
    len: usize,
}

impl<T> DynArray<T> {
    /// Creates an empty array with no backing store.
    ///
    /// No memory is allocated until the first insertion.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of elements in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of slots in the backing store.
    ///
    /// This is always at least [`len()`](Self::len).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the array holds no elements.
    ///
    /// An empty array may still have a non-zero capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a reference to the element at `index`, or `None` if `index` is not below
    /// [`len()`](Self::len).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns an exclusive reference to the element at `index`, or `None` if `index` is not
    /// below [`len()`](Self::len).
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Replaces the element at `index` with `value`, returning the previous element.
    ///
    /// This never grows the array. Use [`insert()`](Self::insert) to add elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not below [`len()`](Self::len). The
    /// rejected `value` is dropped.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = self.len;

        let Some(slot) = self.get_mut(index) else {
            trace!(index, len, "rejecting set outside of array");
            return Err(Error::IndexOutOfBounds { index, bound: len });
        };

        Ok(mem::replace(slot, value))
    }

    /// Returns the elements of the array as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.slots
            .get(..self.len)
            .expect("length of the array never exceeds its capacity")
    }

    /// Returns the elements of the array as an exclusive slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.slots
            .get_mut(..self.len)
            .expect("length of the array never exceeds its capacity")
    }

    fn slot_mut(&mut self, index: usize) -> &mut T {
        let capacity = self.capacity();

        self.slots.get_mut(index).unwrap_or_else(|| {
            panic!("slot {index} is out of bounds in backing store of capacity {capacity}")
        })
    }
}

impl<T: Default> DynArray<T> {
    /// Creates an array holding `len` default-valued elements, with a capacity of exactly `len`.
    ///
    /// If the backing store cannot be allocated, the array is created empty, with a capacity of
    /// zero. It remains fully usable in that state. Use [`try_with_len()`](Self::try_with_len)
    /// to detect this case.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynarray::DynArray;
    ///
    /// let array = DynArray::<i32>::with_len(3);
    ///
    /// assert_eq!(array.len(), 3);
    /// assert_eq!(array.capacity(), 3);
    /// assert_eq!(array.as_slice(), &[0, 0, 0]);
    /// ```
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self::try_with_len(len).unwrap_or_else(|error| {
            warn!(%error, "falling back to an empty array");
            Self::new()
        })
    }

    /// Creates an array holding `len` default-valued elements, with a capacity of exactly `len`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the backing store cannot be allocated.
    pub fn try_with_len(len: usize) -> Result<Self> {
        let mut slots = allocate_slots(len)?;
        slots.resize_with(len, T::default);

        Ok(Self { slots, len })
    }

    /// Inserts `value` at `index`, moving every element at or after `index` one position up.
    ///
    /// An `index` equal to [`len()`](Self::len) appends the element. If the backing store is
    /// full, it is first replaced with one of double the capacity (or a single slot if the
    /// capacity was zero).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is greater than [`len()`](Self::len).
    ///
    /// Returns [`Error::AllocationFailed`] or [`Error::CapacityOverflow`] if the backing store
    /// needed to grow and could not. The array is left unmodified.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            trace!(index, len = self.len, "rejecting insert past the end of array");

            return Err(Error::IndexOutOfBounds {
                index,
                // Cannot overflow because the length is bounded by the size of an allocation.
                bound: self.len.wrapping_add(1),
            });
        }

        if self.len == self.capacity() {
            self.grow_and_insert(index, value)?;
        } else {
            self.shift_and_insert(index, value);
        }

        // Cannot overflow because both branches made sure there was a free slot.
        self.len = self.len.wrapping_add(1);

        Ok(())
    }

    /// Appends `value` after the last element.
    ///
    /// Equivalent to `insert(len(), value)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] or [`Error::CapacityOverflow`] if the backing store
    /// needed to grow and could not. The array is left unmodified.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.insert(self.len, value)
    }

    /// Removes the element at `index` and returns it, moving every element after `index` one
    /// position down.
    ///
    /// The capacity of the array is not reduced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not below [`len()`](Self::len). This
    /// is always the case for an empty array.
    pub fn delete(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            trace!(index, len = self.len, "rejecting delete outside of array");
            return Err(Error::IndexOutOfBounds {
                index,
                bound: self.len,
            });
        }

        // The vacated slot is left holding a default value, which becomes the gap we close.
        let removed = mem::take(self.slot_mut(index));

        // Cannot underflow because index < len.
        let last = self.len.wrapping_sub(1);

        for position in index..last {
            // Cannot overflow because position < last < capacity.
            self.slots.swap(position, position.wrapping_add(1));
        }

        self.len = last;

        Ok(removed)
    }

    /// Inserts into a backing store with at least one vacant slot after the last element.
    ///
    /// The vacant slot at `len` is moved down to `index` one swap at a time, carrying the
    /// elements it passes one position up, and then receives the new value.
    fn shift_and_insert(&mut self, index: usize, value: T) {
        debug_assert!(self.len < self.capacity());

        for position in (index..self.len).rev() {
            // Cannot overflow because position < len < capacity.
            self.slots.swap(position, position.wrapping_add(1));
        }

        *self.slot_mut(index) = value;
    }

    /// Inserts into a full backing store by relocating all elements into a larger one.
    ///
    /// The new backing store is fully allocated before anything is moved, so on failure the
    /// array is unchanged.
    fn grow_and_insert(&mut self, index: usize, value: T) -> Result<()> {
        let capacity = self.capacity();

        let new_capacity =
            next_capacity(capacity).ok_or(Error::CapacityOverflow { capacity })?;

        let mut new_slots = allocate_slots(new_capacity)?;

        debug!(capacity, new_capacity, "growing backing store");

        // A full backing store holds only elements, so every old slot is carried over.
        let mut old_slots = mem::take(&mut self.slots).into_iter();

        new_slots.extend(old_slots.by_ref().take(index));
        new_slots.push(value);
        new_slots.extend(old_slots);
        new_slots.resize_with(new_capacity, T::default);

        self.slots = new_slots;

        Ok(())
    }
}

/// Allocates an empty `Vec` that can hold `count` slots without reallocating.
#[cfg_attr(test, mutants::skip)] // Skipping the reservation only moves the allocation elsewhere.
fn allocate_slots<T>(count: usize) -> Result<Vec<T>> {
    let mut slots = Vec::new();

    if let Err(error) = slots.try_reserve_exact(count) {
        warn!(
            count,
            element_type = type_name::<T>(),
            %error,
            "backing store allocation failed"
        );
        return Err(Error::AllocationFailed { requested: count });
    }

    Ok(slots)
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynArray<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("elements", &self.as_slice())
            .finish()
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    /// Two arrays are equal if they hold equal elements in the same order, regardless of
    /// their capacity.
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::fmt::Debug;
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(DynArray<u32>: Send, Sync, Debug, Default, Clone);
    assert_impl_all!(DynArray<String>: Send, Sync, Debug);
    assert_not_impl_any!(DynArray<Rc<u32>>: Send, Sync);

    fn from_values<T: Default + Clone>(values: &[T]) -> DynArray<T> {
        let mut array = DynArray::with_len(values.len());

        for (index, value) in values.iter().enumerate() {
            array.set(index, value.clone()).unwrap();
        }

        array
    }

    #[test]
    fn new_is_empty_without_capacity() {
        let array = DynArray::<u32>::new();

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
        assert!(array.is_empty());
        assert!(array.as_slice().is_empty());
    }

    #[test]
    fn with_len_sets_len_and_capacity() {
        for len in [0, 1, 5, 20] {
            let array = DynArray::<u64>::with_len(len);

            assert_eq!(array.len(), len);
            assert_eq!(array.capacity(), len);
            assert!(array.as_slice().iter().all(|value| *value == 0));
        }
    }

    #[test]
    fn with_len_zero_is_empty() {
        let array = DynArray::<u8>::with_len(0);

        assert!(array.is_empty());
    }

    #[test]
    fn try_with_len_reports_allocation_failure() {
        let result = DynArray::<u64>::try_with_len(usize::MAX);

        assert_eq!(
            result.unwrap_err(),
            Error::AllocationFailed {
                requested: usize::MAX
            }
        );
    }

    #[test]
    fn with_len_degrades_to_empty_on_allocation_failure() {
        let mut array = DynArray::<u64>::with_len(usize::MAX);

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);

        // Still usable after the failed allocation.
        array.push(42).unwrap();
        assert_eq!(array.as_slice(), &[42]);
    }

    #[test]
    fn get_out_of_bounds_is_none() {
        let array = from_values(&[1, 2, 3]);

        assert_eq!(array.get(2), Some(&3));
        assert_eq!(array.get(3), None);
        assert_eq!(array.get(usize::MAX), None);
    }

    #[test]
    fn get_does_not_expose_spare_capacity() {
        let mut array = DynArray::<u32>::new();
        array.push(1).unwrap();
        array.push(2).unwrap();
        array.push(3).unwrap();

        assert_eq!(array.capacity(), 4);
        assert_eq!(array.get(3), None);
    }

    #[test]
    fn set_replaces_and_returns_previous() {
        let mut array = from_values(&[1, 2, 3, 4, 5]);

        assert_eq!(array.set(0, 10), Ok(1));
        assert_eq!(array.set(4, 50), Ok(5));

        assert_eq!(array.as_slice(), &[10, 2, 3, 4, 50]);
    }

    #[test]
    fn set_out_of_bounds_fails_without_growing() {
        let mut array = from_values(&[1, 2]);

        assert_eq!(
            array.set(2, 3),
            Err(Error::IndexOutOfBounds { index: 2, bound: 2 })
        );
        assert_eq!(array.len(), 2);
        assert_eq!(array.capacity(), 2);
    }

    #[test]
    fn set_into_spare_capacity_fails() {
        let mut array = DynArray::<u32>::new();
        array.push(1).unwrap();
        array.push(2).unwrap();
        array.push(3).unwrap();

        assert!(array.set(3, 4).is_err());
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut array = from_values(&[1, 2, 3]);

        *array.get_mut(1).unwrap() += 40;

        assert_eq!(array.as_slice(), &[1, 42, 3]);
        assert!(array.get_mut(3).is_none());
    }

    #[test]
    fn head_insertions_double_capacity() {
        let mut array = DynArray::<u32>::new();

        array.insert(0, 1).unwrap();
        assert_eq!(array.capacity(), 1);
        assert_eq!(array.len(), 1);

        array.insert(0, 2).unwrap();
        assert_eq!(array.capacity(), 2);
        assert_eq!(array.len(), 2);

        array.insert(0, 3).unwrap();
        assert_eq!(array.capacity(), 4);
        assert_eq!(array.len(), 3);

        assert_eq!(array.as_slice(), &[3, 2, 1]);
    }

    #[test]
    fn insert_while_growing_preserves_order() {
        for index in 0..=4 {
            let mut array = from_values(&[1, 2, 3, 4]);

            array.insert(index, 99).unwrap();

            let mut expected = vec![1, 2, 3, 4];
            expected.insert(index, 99);

            assert_eq!(array.as_slice(), expected.as_slice(), "insert at {index}");
            assert_eq!(array.capacity(), 8);
        }
    }

    #[test]
    fn insert_into_spare_capacity_preserves_order() {
        for index in 0..=3 {
            let mut array = from_values(&[1, 2, 3, 4]);
            array.delete(3).unwrap();
            assert_eq!(array.capacity(), 4);

            array.insert(index, 99).unwrap();

            let mut expected = vec![1, 2, 3];
            expected.insert(index, 99);

            assert_eq!(array.as_slice(), expected.as_slice(), "insert at {index}");
            assert_eq!(array.capacity(), 4);
        }
    }

    #[test]
    fn insert_past_end_fails() {
        let mut array = from_values(&[1, 2, 3]);

        assert_eq!(
            array.insert(4, 9),
            Err(Error::IndexOutOfBounds { index: 4, bound: 4 })
        );
        assert_eq!(array.as_slice(), &[1, 2, 3]);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn insert_into_empty_at_nonzero_fails() {
        let mut array = DynArray::<u32>::new();

        assert!(array.insert(1, 9).is_err());
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn insert_mixed_positions() {
        let mut array = from_values(&[1, 2, 3, 4, 5]);

        array.insert(0, 0xfa).unwrap();
        assert_eq!(array.len(), 6);
        assert_eq!(array.capacity(), 10);

        array.insert(3, 0xfb).unwrap();
        assert_eq!(array.len(), 7);
        assert_eq!(array.capacity(), 10);

        array.insert(7, 0xfc).unwrap();
        assert_eq!(array.len(), 8);
        assert_eq!(array.capacity(), 10);

        assert_eq!(array.as_slice(), &[0xfa, 1, 2, 0xfb, 3, 4, 5, 0xfc]);
    }

    #[test]
    fn insert_strings() {
        let mut array = from_values(&[
            "one".to_string(),
            "two".to_string(),
            "three".to_string(),
        ]);

        array.insert(1, "between".to_string()).unwrap();
        array.push("last".to_string()).unwrap();

        assert_eq!(
            array.as_slice(),
            &["one", "between", "two", "three", "last"]
        );
    }

    #[test]
    fn delete_closes_gap() {
        let mut array = from_values(&[1, 2, 3, 4, 5, 6, 7]);

        assert_eq!(array.delete(0), Ok(1));
        assert_eq!(array.delete(3), Ok(5));
        assert_eq!(array.delete(4), Ok(7));

        assert_eq!(array.as_slice(), &[2, 3, 4, 6]);
        assert_eq!(array.len(), 4);
        assert_eq!(array.capacity(), 7);
    }

    #[test]
    fn delete_last_element() {
        let mut array = from_values(&[1, 2, 3]);

        assert_eq!(array.delete(2), Ok(3));
        assert_eq!(array.as_slice(), &[1, 2]);
    }

    #[test]
    fn delete_until_empty_keeps_capacity() {
        let mut array = from_values(&[1, 2, 3]);

        while !array.is_empty() {
            array.delete(0).unwrap();
        }

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn delete_on_empty_fails() {
        let mut array = DynArray::<u32>::new();

        assert_eq!(
            array.delete(0),
            Err(Error::IndexOutOfBounds { index: 0, bound: 0 })
        );
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn delete_out_of_bounds_fails() {
        let mut array = from_values(&[1, 2, 3]);

        assert!(array.delete(3).is_err());
        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn deleted_slot_is_reused_without_growth() {
        let mut array = from_values(&[1, 2, 3]);

        array.delete(1).unwrap();
        array.push(4).unwrap();

        assert_eq!(array.as_slice(), &[1, 3, 4]);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn zero_sized_elements() {
        let mut array = DynArray::<()>::new();

        array.push(()).unwrap();
        array.push(()).unwrap();
        array.push(()).unwrap();

        assert_eq!(array.len(), 3);
        assert_eq!(array.capacity(), 4);

        array.delete(1).unwrap();
        assert_eq!(array.len(), 2);
    }

    #[derive(Default)]
    struct DropCounter {
        drops: Option<Rc<Cell<usize>>>,
    }

    impl Drop for DropCounter {
        fn drop(&mut self) {
            if let Some(drops) = &self.drops {
                drops.set(drops.get() + 1);
            }
        }
    }

    #[test]
    fn elements_are_dropped_exactly_once() {
        let drops = Rc::new(Cell::new(0));

        let counter = || DropCounter {
            drops: Some(Rc::clone(&drops)),
        };

        let mut array = DynArray::new();

        // Forces two reallocations and one in-place shift.
        array.push(counter()).unwrap();
        array.push(counter()).unwrap();
        array.insert(0, counter()).unwrap();
        assert_eq!(drops.get(), 0);

        let removed = array.delete(1).unwrap();
        assert_eq!(drops.get(), 0);
        drop(removed);
        assert_eq!(drops.get(), 1);

        drop(array);
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn rejected_set_drops_value() {
        let drops = Rc::new(Cell::new(0));
        let mut array = DynArray::<DropCounter>::new();

        let result = array.set(
            0,
            DropCounter {
                drops: Some(Rc::clone(&drops)),
            },
        );

        assert!(result.is_err());
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn equality_ignores_capacity() {
        let mut grown = DynArray::new();
        grown.push(1).unwrap();
        grown.push(2).unwrap();
        grown.push(3).unwrap();

        let exact = from_values(&[1, 2, 3]);

        assert_ne!(grown.capacity(), exact.capacity());
        assert_eq!(grown, exact);
    }

    #[test]
    fn clone_is_independent() {
        let original = from_values(&[1, 2, 3]);
        let mut copy = original.clone();

        copy.set(0, 100).unwrap();

        assert_eq!(original.as_slice(), &[1, 2, 3]);
        assert_eq!(copy.as_slice(), &[100, 2, 3]);
        assert_eq!(copy.capacity(), original.capacity());
    }

    #[test]
    fn debug_shows_only_elements() {
        let mut array = DynArray::new();
        array.push(7_u8).unwrap();
        array.push(8_u8).unwrap();
        array.push(9_u8).unwrap();

        let debug = format!("{array:?}");

        assert!(debug.contains("len: 3"));
        assert!(debug.contains("capacity: 4"));
        assert!(debug.contains("[7, 8, 9]"));
    }
}
