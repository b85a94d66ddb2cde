//! Deterministic slicing of the credential set for sharded runs.

use crate::config::BatchSelection;

/// Half-open index range `[start, end)` of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchBounds {
    pub start: usize,
    pub end: usize,
}

impl BatchBounds {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Index range assigned to `selection` out of `total_count` items.
///
/// `batch_size = ceil(total / total_batches)`; trailing batches may be short
/// or empty.
pub fn batch_bounds(total_count: usize, selection: BatchSelection) -> BatchBounds {
    if total_count == 0 {
        return BatchBounds { start: 0, end: 0 };
    }

    let batch_size = total_count.div_ceil(selection.total_batches).max(1);
    let start = (selection.batch_number - 1)
        .saturating_mul(batch_size)
        .min(total_count);
    let end = start.saturating_add(batch_size).min(total_count);

    BatchBounds { start, end }
}

/// The contiguous slice of `items` belonging to `selection`.
pub fn select_batch<T>(items: &[T], selection: BatchSelection) -> &[T] {
    let bounds = batch_bounds(items.len(), selection);
    &items[bounds.start..bounds.end]
}

/// Splits `items` into consecutive chunks of at most `size` elements.
pub fn chunk_by_size<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items
        .chunks(size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(batch_number: usize, total_batches: usize) -> BatchSelection {
        BatchSelection::new(batch_number, total_batches).unwrap()
    }

    #[test]
    fn test_seven_into_three() {
        let items: Vec<u32> = (1..=7).collect();
        let sizes: Vec<usize> = (1..=3)
            .map(|n| select_batch(&items, sel(n, 3)).len())
            .collect();

        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(select_batch(&items, sel(3, 3)), &[7]);
    }

    #[test]
    fn test_union_is_complete_and_disjoint() {
        for total in 0..40usize {
            let items: Vec<usize> = (0..total).collect();
            for batches in 1..12usize {
                let mut joined = Vec::new();
                let mut previous_end = 0;
                for n in 1..=batches {
                    let bounds = batch_bounds(total, sel(n, batches));
                    if !bounds.is_empty() {
                        assert_eq!(bounds.start, previous_end);
                        previous_end = bounds.end;
                    }
                    joined.extend_from_slice(select_batch(&items, sel(n, batches)));
                }
                assert_eq!(joined, items, "total={} batches={}", total, batches);
            }
        }
    }

    #[test]
    fn test_empty_input_gives_empty_batches() {
        let items: Vec<u8> = Vec::new();
        for n in 1..=4 {
            assert!(select_batch(&items, sel(n, 4)).is_empty());
        }
    }

    #[test]
    fn test_more_batches_than_items() {
        let items = vec!["a", "b"];
        assert_eq!(select_batch(&items, sel(1, 5)), &["a"]);
        assert_eq!(select_batch(&items, sel(2, 5)), &["b"]);
        assert!(select_batch(&items, sel(3, 5)).is_empty());
        assert!(select_batch(&items, sel(5, 5)).is_empty());
    }

    #[test]
    fn test_partition_is_deterministic() {
        let items: Vec<u32> = (0..23).collect();
        let first = select_batch(&items, sel(2, 4)).to_vec();
        let second = select_batch(&items, sel(2, 4)).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chunk_by_size() {
        let items: Vec<u32> = (0..5).collect();
        let chunks = chunk_by_size(&items, 2);
        assert_eq!(chunks, vec![vec![0, 1], vec![2, 3], vec![4]]);
        assert!(chunk_by_size::<u32>(&[], 3).is_empty());
    }
}
