use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::models::CompatibilityScore;

/// Scored candidate held by [`TopK`]
///
/// Ordered so that `a > b` means `a` ranks ahead of `b`: higher total first,
/// then lower identity.
#[derive(Debug, Clone)]
pub struct Scored {
    pub user_id: String,
    pub score: Arc<CompatibilityScore>,
}

impl Scored {
    #[inline]
    fn rank_cmp(total: f64, user_id: &str, other: &Scored) -> Ordering {
        total
            .total_cmp(&other.score.total)
            .then_with(|| other.user_id.as_str().cmp(user_id))
    }
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        Scored::rank_cmp(self.score.total, &self.user_id, other)
    }
}

/// Bounded best-K accumulator
///
/// A min-heap of at most `capacity` entries whose root is the weakest kept
/// candidate. Each offer costs O(log K); the full pool is never sorted.
#[derive(Debug)]
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<Scored>>,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1).min(1024)),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer a candidate; returns whether it was kept
    ///
    /// When full, the candidate replaces the weakest entry only if it ranks
    /// strictly ahead of it. On an exact score tie the lower identity wins.
    pub fn offer(&mut self, user_id: &str, score: Arc<CompatibilityScore>) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(Scored {
                user_id: user_id.to_string(),
                score,
            }));
            return true;
        }

        let beats_weakest = match self.heap.peek() {
            Some(Reverse(weakest)) => {
                Scored::rank_cmp(score.total, user_id, weakest) == Ordering::Greater
            }
            None => true,
        };

        if beats_weakest {
            self.heap.pop();
            self.heap.push(Reverse(Scored {
                user_id: user_id.to_string(),
                score,
            }));
        }

        beats_weakest
    }

    /// Drain into a best-first sequence
    pub fn into_sorted_vec(self) -> Vec<Scored> {
        // Ascending order of Reverse<_> is best-first
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(scored)| scored)
            .collect()
    }
}
