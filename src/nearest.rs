use std::cmp::Ordering;
use std::collections::BinaryHeap;

// A training example considered as a neighbor of some query.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub distance: f32,
    // Position of the example in the training set
    pub index: usize,
}

// Ordered by distance, then by training index, so equal distances favor the
// earlier example. total_cmp keeps NaN distances orderable (they sort last).
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

// Keeps the k smallest neighbors seen so far.
// Backed by a max-heap of size k: the root is the current worst of the best k,
// and anything not better than it is dropped.
pub struct KNearest {
    k: usize,
    heap: BinaryHeap<Neighbor>,
}

impl KNearest {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    pub fn push(&mut self, candidate: Neighbor) {
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if candidate < *worst {
                *worst = candidate;
            }
        }
    }

    // The kept neighbors, nearest first
    pub fn into_sorted_vec(self) -> Vec<Neighbor> {
        self.heap.into_sorted_vec()
    }
}

impl Extend<Neighbor> for KNearest {
    fn extend<I: IntoIterator<Item = Neighbor>>(&mut self, iter: I) {
        iter.into_iter().for_each(|candidate| self.push(candidate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors(distances: &[f32]) -> impl Iterator<Item = Neighbor> + '_ {
        distances
            .iter()
            .enumerate()
            .map(|(index, &distance)| Neighbor { distance, index })
    }

    fn indices(nearest: KNearest) -> Vec<usize> {
        nearest.into_sorted_vec().iter().map(|n| n.index).collect()
    }

    #[test]
    fn test_keeps_k_smallest_in_order() {
        let mut nearest = KNearest::new(3);
        nearest.extend(neighbors(&[5.0, 1.0, 4.0, 0.5, 3.0, 9.0]));
        assert_eq!(indices(nearest), vec![3, 1, 4]);
    }

    #[test]
    fn test_fewer_candidates_than_k() {
        let mut nearest = KNearest::new(10);
        nearest.extend(neighbors(&[2.0, 1.0]));
        assert_eq!(indices(nearest), vec![1, 0]);
    }

    #[test]
    fn test_zero_k_keeps_nothing() {
        let mut nearest = KNearest::new(0);
        nearest.extend(neighbors(&[2.0, 1.0]));
        assert!(nearest.into_sorted_vec().is_empty());
    }

    #[test]
    fn test_equal_distances_prefer_earlier_examples() {
        let mut nearest = KNearest::new(2);
        nearest.extend(neighbors(&[1.0, 1.0, 1.0, 1.0]));
        assert_eq!(indices(nearest), vec![0, 1]);

        // Same set pushed in reverse still resolves by index
        let mut nearest = KNearest::new(2);
        let mut reversed: Vec<_> = neighbors(&[1.0, 1.0, 1.0, 1.0]).collect();
        reversed.reverse();
        nearest.extend(reversed);
        assert_eq!(indices(nearest), vec![0, 1]);
    }

    #[test]
    fn test_nan_distances_sort_last() {
        let mut nearest = KNearest::new(2);
        nearest.extend(neighbors(&[f32::NAN, 3.0, 2.0]));
        assert_eq!(indices(nearest), vec![2, 1]);
    }
}
