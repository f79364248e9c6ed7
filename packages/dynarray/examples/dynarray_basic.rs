//! Basic usage example for `DynArray`.
//!
//! Demonstrates how the capacity of the array changes as elements are inserted at various
//! positions, and that deletion keeps the capacity while closing the gap.

use dynarray::DynArray;

fn main() {
    let mut array = DynArray::<String>::new();

    println!(
        "Created empty array: len {}, capacity {}",
        array.len(),
        array.capacity()
    );

    for word in ["one", "two", "three"] {
        // Insert each word at the head, so they end up in reverse order.
        array
            .insert(0, word.to_string())
            .expect("growing a tiny array cannot fail");

        println!(
            "Inserted {word:?} at index 0: len {}, capacity {}",
            array.len(),
            array.capacity()
        );
    }

    println!("Contents: {:?}", array.as_slice());

    let removed = array.delete(1).expect("index 1 is within the array");
    println!("Deleted {removed:?}, contents now {:?}", array.as_slice());
    println!("Capacity after delete: {}", array.capacity());

    match array.get(5) {
        Some(value) => println!("Index 5 holds {value:?}"),
        None => println!("Index 5 is outside the array"),
    }

    if let Err(error) = array.insert(10, "far away".to_string()) {
        println!("Insert rejected: {error}");
    }
}
