//! Priority agenda for best-first exploration of scored derivations.
//!
//! The exhaustive chart never needs this. It is used when a [`Scorer`] is
//! available: to pick the best root derivation, or to keep only the best
//! `k` trees of each chart cell (beam pruning).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::derivation::DerivationTree;

// ---------------------------------------------------------------------------
// Agenda
// ---------------------------------------------------------------------------

/// A binary min-heap.
///
/// `insert` and `remove_min` are O(log n), `peek_min` is O(1), and building
/// from a `Vec` or iterator heapifies bottom-up in O(n).
#[derive(Debug, Clone)]
pub struct Agenda<T: Ord> {
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> Agenda<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, item: T) {
        self.heap.push(Reverse(item));
    }

    /// Remove and return the smallest item, or `None` when empty.
    pub fn remove_min(&mut self) -> Option<T> {
        self.heap.pop().map(|Reverse(item)| item)
    }

    pub fn peek_min(&self) -> Option<&T> {
        self.heap.peek().map(|Reverse(item)| item)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Remove up to `k` items in ascending order.
    pub fn drain_min(&mut self, k: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(k.min(self.len()));
        while out.len() < k {
            match self.remove_min() {
                Some(item) => out.push(item),
                None => break,
            }
        }
        out
    }

    /// Consume the agenda, returning every item in ascending order.
    pub fn into_sorted_vec(self) -> Vec<T> {
        let mut items: Vec<T> = self
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(item)| item)
            .collect();
        items.reverse();
        items
    }
}

impl<T: Ord> Default for Agenda<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> From<Vec<T>> for Agenda<T> {
    fn from(items: Vec<T>) -> Self {
        let wrapped: Vec<Reverse<T>> = items.into_iter().map(Reverse).collect();
        Self {
            heap: BinaryHeap::from(wrapped),
        }
    }
}

impl<T: Ord> FromIterator<T> for Agenda<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<T>>())
    }
}

impl<T: Ord> Extend<T> for Agenda<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.heap.extend(iter.into_iter().map(Reverse));
    }
}

// ---------------------------------------------------------------------------
// Scored derivations
// ---------------------------------------------------------------------------

/// A partial derivation with its lexical head and score.
///
/// Ordered by descending score, then by head position, so the agenda's
/// minimum is the best-scoring derivation. Equality follows the ordering
/// and ignores the tree itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDerivation {
    pub head_word: String,
    pub head_index: usize,
    pub score: f64,
    pub tree: DerivationTree,
}

impl ScoredDerivation {
    /// Score `tree`, which spans `words[start..]`.
    pub fn new(words: &[&str], start: usize, tree: DerivationTree, score: f64) -> Self {
        let head_index = start + tree.lexical_head_offset();
        let head_word = words.get(head_index).copied().unwrap_or_default().to_string();
        Self {
            head_word,
            head_index,
            score,
            tree,
        }
    }
}

impl Ord for ScoredDerivation {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.head_index.cmp(&other.head_index))
    }
}

impl PartialOrd for ScoredDerivation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScoredDerivation {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredDerivation {}

// ---------------------------------------------------------------------------
// Scorers
// ---------------------------------------------------------------------------

/// Scores a derivation spanning `words[span.0..span.1]`. Higher is better.
pub trait Scorer: Send + Sync {
    fn score(&self, words: &[&str], span: (usize, usize), tree: &DerivationTree) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&[&str], (usize, usize), &DerivationTree) -> f64 + Send + Sync,
{
    fn score(&self, words: &[&str], span: (usize, usize), tree: &DerivationTree) -> f64 {
        self(words, span, tree)
    }
}

/// Prefers derivations built by plain application.
///
/// Each composition node costs 1 and each type-raise costs 2; the score is
/// the negated total cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationPreference;

impl Scorer for ApplicationPreference {
    fn score(&self, _words: &[&str], _span: (usize, usize), tree: &DerivationTree) -> f64 {
        let cost: usize = tree
            .rules()
            .into_iter()
            .map(|rule| match rule {
                r if r.is_application() => 0,
                r if r.is_type_raise() => 2,
                _ => 1,
            })
            .sum();
        -(cost as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::rules::Rule;

    fn drain<T: Ord>(mut agenda: Agenda<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(item) = agenda.remove_min() {
            out.push(item);
        }
        out
    }

    #[test]
    fn heapified_agenda_yields_ascending_order() {
        let agenda = Agenda::from(vec![10, 5, 3, 6, 4]);
        assert_eq!(drain(agenda), vec![3, 4, 5, 6, 10]);
        let agenda = Agenda::from(vec![10, 5, 3, 6, 4, 42]);
        assert_eq!(drain(agenda), vec![3, 4, 5, 6, 10, 42]);
    }

    #[test]
    fn insert_and_peek() {
        let mut agenda = Agenda::new();
        assert!(agenda.is_empty());
        assert_eq!(agenda.peek_min(), None);
        for x in [7, 2, 9, 2, 5] {
            agenda.insert(x);
        }
        assert_eq!(agenda.len(), 5);
        assert_eq!(agenda.peek_min(), Some(&2));
        assert_eq!(drain(agenda), vec![2, 2, 5, 7, 9]);
    }

    #[test]
    fn remove_min_on_empty_is_none() {
        let mut agenda: Agenda<i32> = Agenda::default();
        assert_eq!(agenda.remove_min(), None);
    }

    #[test]
    fn drain_min_and_sorted_vec() {
        let mut agenda: Agenda<i32> = [8, 1, 4, 3].into_iter().collect();
        assert_eq!(agenda.drain_min(2), vec![1, 3]);
        assert_eq!(agenda.drain_min(10), vec![4, 8]);
        let mut agenda = Agenda::with_capacity(4);
        agenda.extend([3, 1, 2]);
        assert_eq!(agenda.into_sorted_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn best_scored_derivation_comes_first() {
        let leaf = DerivationTree::leaf(Category::noun_phrase());
        let words = ["a", "b", "c"];
        let items = vec![
            ScoredDerivation::new(&words, 0, leaf.clone(), -2.0),
            ScoredDerivation::new(&words, 1, leaf.clone(), 0.5),
            ScoredDerivation::new(&words, 2, leaf, -0.5),
        ];
        let mut agenda = Agenda::from(items);
        let best = agenda.remove_min().unwrap();
        assert_eq!(best.score, 0.5);
        assert_eq!(best.head_word, "b");
        assert_eq!(agenda.remove_min().unwrap().score, -0.5);
    }

    #[test]
    fn application_preference_penalises_composition_and_raising() {
        let np = Category::noun_phrase();
        let tv = Category::forward(Category::backward(Category::sentence(), np.clone()), np.clone());
        let applied = DerivationTree::node(
            DerivationTree::leaf(np.clone()),
            DerivationTree::node(
                DerivationTree::leaf(tv.clone()),
                DerivationTree::leaf(np.clone()),
                Rule::ForwardApply,
            ),
            Rule::BackwardApply,
        );
        let raised = DerivationTree::node(
            DerivationTree::node(
                DerivationTree::raised_leaf(DerivationTree::leaf(np.clone()), tv.clone()).unwrap(),
                DerivationTree::leaf(tv),
                Rule::ForwardCompose,
            ),
            DerivationTree::leaf(np),
            Rule::ForwardApply,
        );
        let words = ["I", "proved", "Marcel"];
        let scorer = ApplicationPreference;
        assert_eq!(scorer.score(&words, (0, 3), &applied), 0.0);
        assert_eq!(scorer.score(&words, (0, 3), &raised), -3.0);
    }

    #[test]
    fn closures_are_scorers() {
        let by_depth = |_: &[&str], _: (usize, usize), t: &DerivationTree| -(t.depth() as f64);
        let leaf = DerivationTree::leaf(Category::noun_phrase());
        assert_eq!(by_depth.score(&[], (0, 1), &leaf), -1.0);
    }
}
