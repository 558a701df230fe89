//! Infers which sorting operation produced a transition between two
//! snapshots.
//!
//! Traces carry raw array states only, so the kind of operation is guessed
//! from the shape of the difference. Each algorithm family has its own diff
//! signature. Shapes a rule does not recognise produce no events.

use serde::Serialize;

use crate::Algorithm;

/// A sorting micro-operation inferred from one snapshot transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Positions `i < j` exchanged their values; `values` holds the new
    /// contents of `(i, j)`.
    Swap { i: usize, j: usize, values: (i64, i64) },
    /// A partition step rearranged the inclusive range `left..=right`.
    PartitionSpan { left: usize, right: usize },
    /// A value that jumped more than one slot, taken to be the pivot.
    PivotPlaced { value: i64 },
    /// A merge wrote `value` into `index`.
    MergeWrite { value: i64, index: usize },
    /// The trace reached its sorted final state.
    Completed,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Swap { .. } => "swap",
            Event::PartitionSpan { .. } => "partition_span",
            Event::PivotPlaced { .. } => "pivot_placed",
            Event::MergeWrite { .. } => "merge_write",
            Event::Completed => "completed",
        }
    }
}

/// Classifies the transition `prev -> curr` under the rules of `algorithm`.
///
/// Pure and deterministic. A missing or identical previous snapshot, or
/// snapshots of different widths, yield no events.
pub fn classify(prev: Option<&[i64]>, curr: &[i64], algorithm: Algorithm) -> Vec<Event> {
    let Some(prev) = prev else {
        return Vec::new();
    };
    if prev.len() != curr.len() || prev == curr {
        return Vec::new();
    }

    let changed = changed_indices(prev, curr);
    match algorithm {
        Algorithm::Bubble => transposition(prev, curr, &changed).into_iter().collect(),
        Algorithm::Merge => changed
            .iter()
            .map(|&index| Event::MergeWrite {
                value: curr[index],
                index,
            })
            .collect(),
        Algorithm::Quick => classify_quick(prev, curr, &changed),
    }
}

/// Indices where the two snapshots disagree, ascending.
pub fn changed_indices(prev: &[i64], curr: &[i64]) -> Vec<usize> {
    prev.iter()
        .zip(curr)
        .enumerate()
        .filter_map(|(index, (a, b))| (a != b).then_some(index))
        .collect()
}

/// `Swap` when exactly two positions changed and hold each other's previous
/// values.
fn transposition(prev: &[i64], curr: &[i64], changed: &[usize]) -> Option<Event> {
    let &[i, j] = changed else {
        return None;
    };
    (curr[i] == prev[j] && curr[j] == prev[i]).then(|| Event::Swap {
        i,
        j,
        values: (curr[i], curr[j]),
    })
}

fn classify_quick(prev: &[i64], curr: &[i64], changed: &[usize]) -> Vec<Event> {
    match changed {
        [] | [_] => return Vec::new(),
        [_, _] => return transposition(prev, curr, changed).into_iter().collect(),
        _ => {}
    }
    let (left, right) = (changed[0], changed[changed.len() - 1]);

    let mut events = vec![Event::PartitionSpan { left, right }];
    if let Some(value) = find_pivot(prev, curr, changed) {
        events.push(Event::PivotPlaced { value });
    }
    events
}

/// Heuristic pivot detection: the first changed cell whose value sat more
/// than one slot away in the previous snapshot. With duplicate values the
/// first previous occurrence is used, so the guess is approximate.
fn find_pivot(prev: &[i64], curr: &[i64], changed: &[usize]) -> Option<i64> {
    changed.iter().find_map(|&index| {
        let value = curr[index];
        let from = prev.iter().position(|&candidate| candidate == value)?;
        (from.abs_diff(index) > 1).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn diff(prev: &[i64], curr: &[i64], algorithm: Algorithm) -> Vec<Event> {
        classify(Some(prev), curr, algorithm)
    }

    #[test]
    fn first_frame_and_unchanged_frames_are_silent() {
        assert!(classify(None, &[1, 2, 3], Algorithm::Bubble).is_empty());
        assert!(diff(&[1, 2, 3], &[1, 2, 3], Algorithm::Quick).is_empty());
    }

    #[test]
    fn bubble_adjacent_swap() {
        let events = diff(&[1, 2, 3, 4], &[1, 2, 4, 3], Algorithm::Bubble);
        assert_eq!(
            events,
            vec![Event::Swap {
                i: 2,
                j: 3,
                values: (4, 3)
            }]
        );
    }

    #[test]
    fn bubble_ignores_other_shapes() {
        assert!(diff(&[1, 2, 3, 4], &[1, 5, 3, 4], Algorithm::Bubble).is_empty());
        assert!(diff(&[1, 2, 3, 4], &[2, 3, 1, 4], Algorithm::Bubble).is_empty());
        assert!(diff(&[1, 2, 3, 4], &[1, 3, 9, 4], Algorithm::Bubble).is_empty());
    }

    #[test]
    fn merge_single_write() {
        let events = diff(&[1, 2, 3, 4], &[1, 5, 3, 4], Algorithm::Merge);
        assert_eq!(events, vec![Event::MergeWrite { value: 5, index: 1 }]);
    }

    #[test]
    fn merge_emits_one_write_per_changed_cell() {
        let events = diff(&[4, 3, 2, 1], &[3, 4, 1, 2], Algorithm::Merge);
        let indices: Vec<usize> = events
            .iter()
            .map(|event| match event {
                Event::MergeWrite { index, .. } => *index,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn quick_prefers_transposition_over_partition() {
        let events = diff(&[5, 3, 8, 1, 9], &[1, 3, 8, 5, 9], Algorithm::Quick);
        assert_eq!(
            events,
            vec![Event::Swap {
                i: 0,
                j: 3,
                values: (1, 5)
            }]
        );
    }

    #[test]
    fn quick_partition_with_pivot() {
        // 3 jumps from index 3 to index 0.
        let events = diff(&[5, 1, 7, 3, 9], &[3, 1, 5, 7, 9], Algorithm::Quick);
        assert_eq!(
            events,
            vec![
                Event::PartitionSpan { left: 0, right: 3 },
                Event::PivotPlaced { value: 3 },
            ]
        );
    }

    #[test]
    fn quick_partition_without_long_move_has_no_pivot() {
        let events = diff(&[2, 1, 4, 3], &[1, 2, 3, 4], Algorithm::Quick);
        assert_eq!(events, vec![Event::PartitionSpan { left: 0, right: 3 }]);
    }

    #[test]
    fn quick_ignores_single_cell_and_non_transposition_pairs() {
        assert!(diff(&[1, 2, 3], &[1, 9, 3], Algorithm::Quick).is_empty());
        assert!(diff(&[1, 2, 3], &[7, 9, 3], Algorithm::Quick).is_empty());
    }

    #[test]
    fn mismatched_widths_are_ignored() {
        assert!(diff(&[1, 2, 3], &[1, 2], Algorithm::Merge).is_empty());
    }

    fn arb_algorithm() -> impl Strategy<Value = Algorithm> {
        prop_oneof![
            Just(Algorithm::Bubble),
            Just(Algorithm::Merge),
            Just(Algorithm::Quick),
        ]
    }

    proptest! {
        #[test]
        fn classification_is_deterministic(
            prev in proptest::collection::vec(0i64..10, 1..12),
            curr_seed in proptest::collection::vec(0i64..10, 12),
            algorithm in arb_algorithm(),
        ) {
            let curr: Vec<i64> = curr_seed[..prev.len()].to_vec();
            let first = classify(Some(prev.as_slice()), &curr, algorithm);
            let second = classify(Some(prev.as_slice()), &curr, algorithm);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn at_most_one_pivot_per_diff(
            prev in proptest::collection::vec(0i64..20, 3..16),
        ) {
            let mut curr = prev.clone();
            curr.reverse();
            let pivots = classify(Some(prev.as_slice()), &curr, Algorithm::Quick)
                .into_iter()
                .filter(|event| matches!(event, Event::PivotPlaced { .. }))
                .count();
            prop_assert!(pivots <= 1);
        }
    }
}
