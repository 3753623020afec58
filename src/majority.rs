use std::collections::HashMap;
use std::hash::Hash;

// Majority vote over a set of labels.
// The label with the most votes wins; among labels tied for the most votes the
// smallest one wins, so the outcome never depends on iteration order.
// Returns None when there are no votes at all.
pub fn majority_vote<'a, L>(votes: impl IntoIterator<Item = &'a L>) -> Option<L>
where
    L: Clone + Eq + Hash + Ord + 'a,
{
    let mut tally: HashMap<&L, usize> = HashMap::new();
    for label in votes {
        *tally.entry(label).or_insert(0) += 1;
    }

    tally
        .into_iter()
        .max_by(|(label_a, count_a), (label_b, count_b)| {
            count_a.cmp(count_b).then_with(|| label_b.cmp(label_a))
        })
        .map(|(label, _)| label.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_majority() {
        assert_eq!(majority_vote(&[0_u8, 1, 0]), Some(0));
        assert_eq!(majority_vote(&[7_u8, 3, 3, 7, 3]), Some(3));
    }

    #[test]
    fn test_ties_go_to_smallest_label() {
        assert_eq!(majority_vote(&[5_u8, 2]), Some(2));
        assert_eq!(majority_vote(&[9_u8, 9, 4, 4, 1]), Some(4));
        assert_eq!(majority_vote(&["b", "a", "c"]), Some("a"));
    }

    #[test]
    fn test_no_votes() {
        let empty: [u8; 0] = [];
        assert_eq!(majority_vote(&empty), None);
    }
}
