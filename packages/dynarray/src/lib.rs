#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A growable array that doubles its backing store on demand.
//!
//! This crate provides [`DynArray<T>`], a contiguous array of `T` that tracks its capacity (the
//! number of allocated slots) separately from its length (the number of slots holding elements).
//! Elements can be inserted and deleted at any position; the array shifts the elements after
//! that position to keep them in order.
//!
//! # Key Features
//!
//! - **Positional insertion**: Insert at any index from zero up to and including the length
//! - **Doubling growth**: A full backing store is replaced by one with twice the capacity
//! - **Grow-only capacity**: Deleting elements never releases backing store memory
//! - **Fallible allocation**: Allocation failure is reported as an [`Error`], never an abort
//! - **Strong failure guarantee**: A failed operation leaves the array as it was
//!
//! # Examples
//!
//! ```rust
//! use dynarray::DynArray;
//!
//! // Start with five zero-valued elements.
//! let mut array = DynArray::<u32>::with_len(5);
//!
//! for index in 0..5 {
//!     array.set(index, u32::try_from(index).unwrap() + 1).unwrap();
//! }
//!
//! // The array is full, so inserting doubles its capacity.
//! array.insert(0, 0xfa).unwrap();
//! assert_eq!(array.len(), 6);
//! assert_eq!(array.capacity(), 10);
//!
//! // There is now spare capacity, so these insertions shift elements in place.
//! array.insert(3, 0xfb).unwrap();
//! array.insert(7, 0xfc).unwrap();
//! assert_eq!(array.capacity(), 10);
//!
//! assert_eq!(array.as_slice(), &[0xfa, 1, 2, 0xfb, 3, 4, 5, 0xfc]);
//! ```
//!
//! Reading outside the array is not an error but an explicit absence of a value:
//!
//! ```rust
//! use dynarray::DynArray;
//!
//! let array = DynArray::<u32>::with_len(2);
//!
//! assert_eq!(array.get(1), Some(&0));
//! assert_eq!(array.get(2), None);
//! ```

mod array;
mod error;
mod growth;

pub use array::DynArray;
pub use error::{Error, Result};
pub(crate) use growth::*;
