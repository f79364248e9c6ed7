/// Returns the capacity a full backing store of `capacity` slots grows to.
///
/// An empty backing store grows to a single slot, anything else doubles. Returns `None` if the
/// doubled capacity is not representable.
#[must_use]
pub(crate) fn next_capacity(capacity: usize) -> Option<usize> {
    if capacity == 0 {
        Some(1)
    } else {
        capacity.checked_mul(2)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_grows_to_one() {
        assert_eq!(next_capacity(0), Some(1));
    }

    #[test]
    fn non_empty_doubles() {
        assert_eq!(next_capacity(1), Some(2));
        assert_eq!(next_capacity(2), Some(4));
        assert_eq!(next_capacity(5), Some(10));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(next_capacity(usize::MAX / 2 + 1), None);
        assert_eq!(next_capacity(usize::MAX), None);
    }
}
