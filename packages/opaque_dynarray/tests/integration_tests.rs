//! End-to-end scenarios exercising [`OpaqueDynArray`] through its public API only.
#![allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]

use new_zealand::nz;
use opaque_dynarray::{Error, OpaqueDynArray};

fn u32_array(values: &[u32]) -> OpaqueDynArray {
    let mut array = OpaqueDynArray::builder()
        .element_size_of::<u32>()
        .len(values.len())
        .build()
        .unwrap();

    for (index, value) in values.iter().enumerate() {
        array.set(index, &value.to_ne_bytes()).unwrap();
    }

    array
}

fn u32_values(array: &OpaqueDynArray) -> Vec<u32> {
    array
        .as_bytes()
        .chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[test]
fn construction_reports_requested_size() {
    for len in [0, 1, 10, 1000] {
        let array = OpaqueDynArray::new(len, nz!(4)).unwrap();

        assert_eq!(array.capacity(), len);
        assert_eq!(array.len(), len);
        assert_eq!(array.is_empty(), len == 0);
    }
}

#[test]
fn insert_at_head_middle_and_end() {
    let mut array = u32_array(&[1, 2, 3, 4, 5]);

    array.insert(0, &0xfa_u32.to_ne_bytes()).unwrap();
    assert_eq!(array.len(), 6);
    assert_eq!(array.capacity(), 10);

    array.insert(3, &0xfb_u32.to_ne_bytes()).unwrap();
    assert_eq!(array.len(), 7);
    assert_eq!(array.capacity(), 10);

    array.insert(7, &0xfc_u32.to_ne_bytes()).unwrap();
    assert_eq!(array.len(), 8);
    assert_eq!(array.capacity(), 10);

    assert_eq!(u32_values(&array), [0xfa, 1, 2, 0xfb, 3, 4, 5, 0xfc]);
}

#[test]
fn delete_at_head_and_middle() {
    let mut array = u32_array(&[1, 2, 3, 4, 5, 6, 7]);

    array.delete(0).unwrap();
    array.delete(3).unwrap();
    array.delete(4).unwrap();

    assert_eq!(u32_values(&array), [2, 3, 4, 6]);
    assert_eq!(array.len(), 4);
}

#[test]
fn repeated_delete_on_empty_array_keeps_failing() {
    let mut array = u32_array(&[]);

    for _ in 0..3 {
        assert!(matches!(
            array.delete(0),
            Err(Error::IndexOutOfBounds { index: 0, bound: 0 })
        ));
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
    }
}

const TITLE_LEN: usize = 50;
const AUTHOR_LEN: usize = 50;
const SUBJECT_LEN: usize = 100;
const BOOK_SIZE: usize = TITLE_LEN + AUTHOR_LEN + SUBJECT_LEN + 4;

/// A fixed-width record, standing in for a plain-data structure from a foreign interface.
#[derive(Debug, Eq, PartialEq)]
struct Book {
    title: String,
    author: String,
    subject: String,
    book_id: u32,
}

impl Book {
    fn to_bytes(&self) -> [u8; BOOK_SIZE] {
        let mut bytes = [0; BOOK_SIZE];

        let (title, rest) = bytes.split_at_mut(TITLE_LEN);
        let (author, rest) = rest.split_at_mut(AUTHOR_LEN);
        let (subject, book_id) = rest.split_at_mut(SUBJECT_LEN);

        write_text(title, &self.title);
        write_text(author, &self.author);
        write_text(subject, &self.subject);
        book_id.copy_from_slice(&self.book_id.to_le_bytes());

        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let (title, rest) = bytes.split_at(TITLE_LEN);
        let (author, rest) = rest.split_at(AUTHOR_LEN);
        let (subject, book_id) = rest.split_at(SUBJECT_LEN);

        Self {
            title: read_text(title),
            author: read_text(author),
            subject: read_text(subject),
            book_id: u32::from_le_bytes(book_id.try_into().unwrap()),
        }
    }
}

fn write_text(field: &mut [u8], text: &str) {
    field[..text.len()].copy_from_slice(text.as_bytes());
}

fn read_text(field: &[u8]) -> String {
    let end = field.iter().position(|byte| *byte == 0).unwrap_or(field.len());
    String::from_utf8(field[..end].to_vec()).unwrap()
}

#[test]
fn stores_fixed_width_records() {
    let book = Book {
        title: "Algorithms".to_string(),
        author: "Robert Sedgewick".to_string(),
        subject: "Computer Programming Structured Design".to_string(),
        book_id: 1,
    };

    let mut array = OpaqueDynArray::builder()
        .element_size_of::<[u8; BOOK_SIZE]>()
        .len(1)
        .build()
        .unwrap();

    array.set(0, &book.to_bytes()).unwrap();

    let mut buffer = [0; BOOK_SIZE];
    array.get(0, &mut buffer).unwrap();
    assert_eq!(Book::from_bytes(&buffer), book);

    // Growth relocates the record intact.
    array.insert(0, &[0; BOOK_SIZE]).unwrap();
    assert_eq!(Book::from_bytes(array.element(1).unwrap()), book);
}

#[test]
fn grows_through_many_appends() {
    let mut array = u32_array(&[]);
    let mut capacities = Vec::new();

    for value in 0..100_u32 {
        array.push(&value.to_ne_bytes()).unwrap();

        if capacities.last() != Some(&array.capacity()) {
            capacities.push(array.capacity());
        }
    }

    assert_eq!(capacities, [1_usize, 2, 4, 8, 16, 32, 64, 128]);
    assert!(u32_values(&array).into_iter().eq(0..100));
}
