//! Basic usage example for `OpaqueDynArray`.
//!
//! Stores 2D points as raw bytes, the way a caller would when the element type is only
//! described by its size at runtime.

use std::num::NonZero;

use opaque_dynarray::OpaqueDynArray;

const POINT_SIZE: usize = 8;

fn encode(x: i32, y: i32) -> [u8; POINT_SIZE] {
    let mut bytes = [0; POINT_SIZE];
    let (x_bytes, y_bytes) = bytes.split_at_mut(4);
    x_bytes.copy_from_slice(&x.to_le_bytes());
    y_bytes.copy_from_slice(&y.to_le_bytes());
    bytes
}

fn decode(bytes: &[u8]) -> (i32, i32) {
    let (x_bytes, y_bytes) = bytes.split_at(4);
    (
        i32::from_le_bytes(x_bytes.try_into().expect("point has 4 bytes per coordinate")),
        i32::from_le_bytes(y_bytes.try_into().expect("point has 4 bytes per coordinate")),
    )
}

fn main() {
    let element_size = NonZero::new(POINT_SIZE).expect("point size is non-zero");

    let mut array = OpaqueDynArray::builder()
        .element_size(element_size)
        .build()
        .expect("empty array needs no allocation");

    println!("Created {array:?}");

    for (x, y) in [(1, 2), (3, 4), (5, 6)] {
        array
            .push(&encode(x, y))
            .expect("growing a tiny array cannot fail");

        println!(
            "Appended ({x}, {y}): len {}, capacity {}",
            array.len(),
            array.capacity()
        );
    }

    array
        .insert(1, &encode(-1, -1))
        .expect("index 1 is within the array");

    array.delete(0).expect("index 0 is within the array");

    for index in 0..array.len() {
        let mut buffer = [0; POINT_SIZE];
        array
            .get(index, &mut buffer)
            .expect("index is within the array");

        println!("Point {index}: {:?}", decode(&buffer));
    }

    if let Err(error) = array.set(0, &[0; 3]) {
        println!("Set rejected: {error}");
    }
}
