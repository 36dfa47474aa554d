//! Stream compaction

/// Returns the exclusive prefix sum of `values` and the grand total.
/// `out[i]` is the sum of `values[..i]`.
///
/// * `values` - Input values.
pub fn exclusive_scan(values: &[usize]) -> (Vec<usize>, usize) {
    let mut total = 0;
    let scanned = values
        .iter()
        .map(|&v| {
            let s = total;
            total += v;
            s
        })
        .collect();
    (scanned, total)
}

/// Removes the items for which `keep` is false, preserving the relative order
/// of the rest.
///
/// Runs in two phases: the 0/1 mask and its exclusive scan are fully
/// materialised before any item is scattered to its destination.
///
/// * `items` - Items to compact.
/// * `keep`  - Predicate selecting the items to keep.
pub fn compact_by<T, F>(items: Vec<T>, keep: F) -> Vec<T>
where
    F: Fn(&T) -> bool,
{
    let mask: Vec<usize> = items.iter().map(|item| keep(item) as usize).collect();
    let (positions, total) = exclusive_scan(&mask);

    let mut out: Vec<Option<T>> = (0..total).map(|_| None).collect();
    for ((item, &m), &pos) in items.into_iter().zip(mask.iter()).zip(positions.iter()) {
        if m == 1 {
            out[pos] = Some(item);
        }
    }
    out.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scan_of_mask() {
        let (s, total) = exclusive_scan(&[1, 0, 1, 1, 0]);
        assert_eq!(s, vec![0, 1, 1, 2, 3]);
        assert_eq!(total, 3);
    }

    #[test]
    fn scan_of_empty() {
        let (s, total) = exclusive_scan(&[]);
        assert!(s.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn compact_removes_zeros() {
        let v = compact_by(vec![3, 0, 1, 0, 0, 7], |&x| x != 0);
        assert_eq!(v, vec![3, 1, 7]);
    }

    proptest! {
        #[test]
        fn compact_matches_filter(v in prop::collection::vec(0..4u8, 0..200)) {
            let expected: Vec<u8> = v.iter().copied().filter(|&x| x > 0).collect();
            prop_assert_eq!(compact_by(v, |&x| x > 0), expected);
        }
    }
}
