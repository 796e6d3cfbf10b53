use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::instance::Label;

/// Label → probability map produced by a prediction.
///
/// Keys are the labels seen during training; values sum to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionMap<L: Label> {
    probabilities: BTreeMap<L, f64>,
}

impl<L: Label> PredictionMap<L> {
    pub(crate) fn new(probabilities: BTreeMap<L, f64>) -> Self {
        Self { probabilities }
    }

    /// Return the probability assigned to `label`, or 0.0 for an unseen label.
    #[must_use]
    pub fn get(&self, label: &L) -> f64 {
        self.probabilities.get(label).copied().unwrap_or(0.0)
    }

    /// Return the most probable label; ties go to the smallest label.
    #[must_use]
    pub fn most_likely(&self) -> Option<(&L, f64)> {
        self.probabilities
            .iter()
            .fold(None, |best: Option<(&L, f64)>, (label, &p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((label, p)),
            })
    }

    /// Iterate over `(label, probability)` pairs in label order.
    pub fn iter(&self) -> btree_map::Iter<'_, L, f64> {
        self.probabilities.iter()
    }

    /// Return the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Return `true` if the map has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}

impl<'a, L: Label> IntoIterator for &'a PredictionMap<L> {
    type Item = (&'a L, &'a f64);
    type IntoIter = btree_map::Iter<'a, L, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.probabilities.iter()
    }
}
