use std::collections::{HashSet, VecDeque};

use crate::{trace::is_sorted, Algorithm, Event};

/// Keys of finished traces that have already played their completion cue.
///
/// Keys combine the algorithm with the serialised final snapshot. The memo is
/// bounded: once `capacity` keys are held, the oldest is evicted first.
#[derive(Debug, Clone)]
pub struct CompletionMemo {
    keys: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl CompletionMemo {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn key(algorithm: Algorithm, snapshot: &[i64]) -> String {
        let values: Vec<String> = snapshot.iter().map(i64::to_string).collect();
        format!("{algorithm}:{}", values.join(" "))
    }

    pub fn contains(&self, algorithm: Algorithm, snapshot: &[i64]) -> bool {
        self.keys.contains(&Self::key(algorithm, snapshot))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Inserts the key if absent. Returns `true` when it was newly added.
    pub fn insert(&mut self, algorithm: Algorithm, snapshot: &[i64]) -> bool {
        let key = Self::key(algorithm, snapshot);
        if !self.keys.insert(key.clone()) {
            return false;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
        true
    }

    /// Fires `Completed` once per distinct `(algorithm, snapshot)` when the
    /// cursor sits on the last index and the snapshot is sorted.
    pub fn check_completion(
        &mut self,
        algorithm: Algorithm,
        at_last_index: bool,
        snapshot: &[i64],
    ) -> Option<Event> {
        if !at_last_index || !is_sorted(snapshot) {
            return None;
        }
        self.insert(algorithm, snapshot).then_some(Event::Completed)
    }
}

impl Default for CompletionMemo {
    fn default() -> Self {
        Self::new(256)
    }
}
