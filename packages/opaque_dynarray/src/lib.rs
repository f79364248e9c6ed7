#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A growable array of fixed-size elements whose type is only known at runtime.
//!
//! This crate provides [`OpaqueDynArray`], a dynamic array that stores each element as an
//! opaque block of bytes. The element size is fixed when the array is created, via
//! [`OpaqueDynArrayBuilder`]. This makes the array usable where the element type is not known
//! at compile time, for example when the elements come from a foreign interface or a
//! serialized format.
//!
//! # Key Features
//!
//! - **Type-erased storage**: Works with any element that has a fixed byte representation
//! - **Positional insertion**: Insert at any index from zero up to and including the length
//! - **Doubling growth**: A full backing store is replaced by one with twice the capacity
//! - **Grow-only capacity**: Deleting elements never releases backing store memory
//! - **Fallible allocation**: Allocation failure is reported as an [`Error`], never an abort
//!
//! # Examples
//!
//! ```rust
//! use opaque_dynarray::OpaqueDynArray;
//!
//! // An array of five zero-filled u32-sized elements.
//! let mut array = OpaqueDynArray::builder()
//!     .element_size_of::<u32>()
//!     .len(5)
//!     .build()
//!     .unwrap();
//!
//! for (index, value) in [1_u32, 2, 3, 4, 5].into_iter().enumerate() {
//!     array.set(index, &value.to_ne_bytes()).unwrap();
//! }
//!
//! // The array is full, so inserting doubles its capacity.
//! array.insert(0, &0xfa_u32.to_ne_bytes()).unwrap();
//! assert_eq!(array.len(), 6);
//! assert_eq!(array.capacity(), 10);
//!
//! let mut buffer = [0; 4];
//! array.get(1, &mut buffer).unwrap();
//! assert_eq!(u32::from_ne_bytes(buffer), 1);
//!
//! // Deleting closes the gap but keeps the capacity.
//! array.delete(0).unwrap();
//! array.get(0, &mut buffer).unwrap();
//! assert_eq!(u32::from_ne_bytes(buffer), 1);
//! assert_eq!(array.capacity(), 10);
//! ```

mod array;
mod builder;
mod copy;
mod error;

pub use array::OpaqueDynArray;
pub use builder::*;
pub(crate) use copy::*;
pub use error::{Error, Result};
