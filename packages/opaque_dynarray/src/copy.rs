use std::num::NonZero;
use std::ops::Range;

/// Returns the byte range occupied by `count` elements of `element_size` bytes, starting at the
/// element with index `first`.
///
/// The caller is responsible for only asking about ranges that fit in some buffer, which means
/// the calculation cannot overflow.
#[must_use]
pub(crate) fn byte_range(
    first: usize,
    count: usize,
    element_size: NonZero<usize>,
) -> Range<usize> {
    let start = first.wrapping_mul(element_size.get());
    let len = count.wrapping_mul(element_size.get());

    start..start.wrapping_add(len)
}

/// Copies `count` elements from `source` starting at element `source_index` into
/// `destination` starting at element `destination_index`.
///
/// The two buffers are always distinct allocations, so the regions cannot overlap. Moving
/// elements within a single buffer is done with [`slice::copy_within`] instead.
///
/// # Panics
///
/// Panics if either region does not fit in its buffer.
pub(crate) fn copy_elements(
    source: &[u8],
    source_index: usize,
    destination: &mut [u8],
    destination_index: usize,
    element_size: NonZero<usize>,
    count: usize,
) {
    let source_range = byte_range(source_index, count, element_size);
    let destination_range = byte_range(destination_index, count, element_size);

    let source_len = source.len();
    let destination_len = destination.len();

    let from = source.get(source_range.clone()).unwrap_or_else(|| {
        panic!("source range {source_range:?} is out of bounds of buffer of {source_len} bytes")
    });

    let to = destination
        .get_mut(destination_range.clone())
        .unwrap_or_else(|| {
            panic!(
                "destination range {destination_range:?} is out of bounds of buffer of {destination_len} bytes"
            )
        });

    to.copy_from_slice(from);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn byte_range_scales_by_element_size() {
        assert_eq!(byte_range(0, 0, nz!(4)), 0..0);
        assert_eq!(byte_range(0, 1, nz!(4)), 0..4);
        assert_eq!(byte_range(2, 3, nz!(4)), 8..20);
        assert_eq!(byte_range(5, 1, nz!(1)), 5..6);
    }

    #[test]
    fn copies_to_same_position() {
        let source = [1, 2, 3, 4, 5, 6];
        let mut destination = [0; 6];

        copy_elements(&source, 0, &mut destination, 0, nz!(2), 2);

        assert_eq!(destination, [1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn copies_to_shifted_position() {
        let source = [1, 2, 3, 4, 5, 6];
        let mut destination = [0; 8];

        copy_elements(&source, 1, &mut destination, 2, nz!(2), 2);

        assert_eq!(destination, [0, 0, 0, 0, 3, 4, 5, 6]);
    }

    #[test]
    fn zero_elements_is_no_op() {
        let source = [1, 2, 3];
        let mut destination = [9; 3];

        copy_elements(&source, 3, &mut destination, 3, nz!(1), 0);

        assert_eq!(destination, [9, 9, 9]);
    }

    #[test]
    #[should_panic]
    fn source_out_of_bounds_panics() {
        let source = [1, 2, 3, 4];
        let mut destination = [0; 8];

        copy_elements(&source, 1, &mut destination, 0, nz!(2), 2);
    }

    #[test]
    #[should_panic]
    fn destination_out_of_bounds_panics() {
        let source = [1, 2, 3, 4];
        let mut destination = [0; 4];

        copy_elements(&source, 0, &mut destination, 1, nz!(2), 2);
    }
}
