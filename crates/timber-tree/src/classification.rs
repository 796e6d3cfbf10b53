//! Label-count summaries of instance sets.

use std::collections::{BTreeMap, BTreeSet};

use crate::instance::{Instance, Label};
use crate::prediction::PredictionMap;

/// Label counts for a dataset with exactly two distinct labels.
///
/// Holds both classes inline so probability lookups are a single comparison
/// instead of a map search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryClassificationProperties<L> {
    first: (L, u64),
    second: (L, u64),
}

impl<L: Label> BinaryClassificationProperties<L> {
    /// Return the more frequent class and its count; ties go to the smaller label.
    #[must_use]
    pub fn majority(&self) -> (&L, u64) {
        if self.second.1 > self.first.1 {
            (&self.second.0, self.second.1)
        } else {
            (&self.first.0, self.first.1)
        }
    }

    /// Return the less frequent class and its count.
    #[must_use]
    pub fn minority(&self) -> (&L, u64) {
        if self.second.1 > self.first.1 {
            (&self.first.0, self.first.1)
        } else {
            (&self.second.0, self.second.1)
        }
    }

    fn count(&self, label: &L) -> u64 {
        if *label == self.first.0 {
            self.first.1
        } else if *label == self.second.0 {
            self.second.1
        } else {
            0
        }
    }

    fn total(&self) -> u64 {
        self.first.1 + self.second.1
    }
}

/// Immutable per-label instance counts.
///
/// Built with [`ClassificationProperties::from_instances`]; exactly two
/// distinct labels produce the [`Binary`](ClassificationProperties::Binary)
/// variant, anything else the general map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationProperties<L> {
    /// Two-class specialization.
    Binary(BinaryClassificationProperties<L>),
    /// Any number of classes other than two.
    General {
        /// Instance count per label.
        counts: BTreeMap<L, u64>,
        /// Sum of all counts.
        total: u64,
    },
}

impl<L: Label> ClassificationProperties<L> {
    /// Count label occurrences over `instances`.
    ///
    /// The result does not depend on iteration order.
    pub fn from_instances<'a, I>(instances: I) -> Self
    where
        I: IntoIterator<Item = &'a Instance<L>>,
        L: 'a,
    {
        let mut counts: BTreeMap<L, u64> = BTreeMap::new();
        for instance in instances {
            *counts.entry(instance.label().clone()).or_insert(0) += 1;
        }
        Self::from_counts(counts)
    }

    /// Build from precomputed counts, dropping zero entries.
    #[must_use]
    pub fn from_counts(mut counts: BTreeMap<L, u64>) -> Self {
        counts.retain(|_, c| *c > 0);
        if counts.len() == 2
            && let (Some(first), Some(second)) = (counts.pop_first(), counts.pop_first())
        {
            return Self::Binary(BinaryClassificationProperties { first, second });
        }
        let total = counts.values().sum();
        Self::General { counts, total }
    }

    /// Return `true` when exactly two labels were observed.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Return the binary specialization, if any.
    #[must_use]
    pub fn as_binary(&self) -> Option<&BinaryClassificationProperties<L>> {
        match self {
            Self::Binary(b) => Some(b),
            Self::General { .. } => None,
        }
    }

    /// Return the number of instances counted.
    #[must_use]
    pub fn n_instances(&self) -> u64 {
        match self {
            Self::Binary(b) => b.total(),
            Self::General { total, .. } => *total,
        }
    }

    /// Return the number of instances carrying `label`.
    #[must_use]
    pub fn count(&self, label: &L) -> u64 {
        match self {
            Self::Binary(b) => b.count(label),
            Self::General { counts, .. } => counts.get(label).copied().unwrap_or(0),
        }
    }

    /// Return the distinct labels observed.
    #[must_use]
    pub fn labels(&self) -> BTreeSet<L> {
        self.counts_by_label().into_keys().collect()
    }

    /// Return the number of distinct labels observed.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        match self {
            Self::Binary(_) => 2,
            Self::General { counts, .. } => counts.len(),
        }
    }

    /// Return a copy of the label → count map.
    #[must_use]
    pub fn counts_by_label(&self) -> BTreeMap<L, u64> {
        match self {
            Self::Binary(b) => [b.first.clone(), b.second.clone()].into_iter().collect(),
            Self::General { counts, .. } => counts.clone(),
        }
    }

    /// Return the most frequent label; ties go to the smallest label.
    #[must_use]
    pub fn majority_label(&self) -> Option<&L> {
        match self {
            Self::Binary(b) => Some(b.majority().0),
            Self::General { counts, .. } => counts
                .iter()
                .fold(None, |best: Option<(&L, u64)>, (label, &c)| match best {
                    Some((_, best_c)) if best_c >= c => best,
                    _ => Some((label, c)),
                })
                .map(|(label, _)| label),
        }
    }

    /// Return the empirical probability of `label`; 0.0 when nothing was counted.
    #[must_use]
    pub fn probability(&self, label: &L) -> f64 {
        let total = self.n_instances();
        if total == 0 {
            return 0.0;
        }
        self.count(label) as f64 / total as f64
    }

    /// Build a prediction map over `training_labels` from these counts.
    ///
    /// Labels absent from this summary get probability 0.0.
    #[must_use]
    pub fn prediction_map<'a>(&self, training_labels: impl IntoIterator<Item = &'a L>) -> PredictionMap<L>
    where
        L: 'a,
    {
        PredictionMap::new(
            training_labels
                .into_iter()
                .map(|label| (label.clone(), self.probability(label)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Attributes;

    fn instances(labels: &[&'static str]) -> Vec<Instance<&'static str>> {
        labels
            .iter()
            .map(|&l| Instance::new(Attributes::new(), l))
            .collect()
    }

    #[test]
    fn counts_sum_to_instance_count() {
        let data = instances(&["a", "b", "c", "a", "a"]);
        let props = ClassificationProperties::from_instances(&data);
        assert_eq!(props.n_instances(), 5);
        assert_eq!(props.counts_by_label().values().sum::<u64>(), 5);
        assert_eq!(props.count(&"a"), 3);
        assert!(!props.is_binary());
    }

    #[test]
    fn two_labels_are_binary() {
        let data = instances(&["yes", "no", "yes"]);
        let props = ClassificationProperties::from_instances(&data);
        assert!(props.is_binary());
        let binary = props.as_binary().unwrap();
        assert_eq!(binary.majority(), (&"yes", 2));
        assert_eq!(binary.minority(), (&"no", 1));
        assert!((props.probability(&"yes") - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_label_is_general() {
        let data = instances(&["x", "x"]);
        let props = ClassificationProperties::from_instances(&data);
        assert!(!props.is_binary());
        assert_eq!(props.n_labels(), 1);
        assert_eq!(props.majority_label(), Some(&"x"));
    }

    #[test]
    fn order_independent() {
        let a = ClassificationProperties::from_instances(&instances(&["a", "b", "a", "c"]));
        let b = ClassificationProperties::from_instances(&instances(&["c", "a", "b", "a"]));
        assert_eq!(a, b);
    }

    #[test]
    fn binary_and_general_agree_on_counts() {
        let data = instances(&["p", "q", "q"]);
        let binary = ClassificationProperties::from_instances(&data);
        let general = ClassificationProperties::General {
            counts: binary.counts_by_label(),
            total: 3,
        };
        for label in ["p", "q", "r"] {
            assert_eq!(binary.count(&label), general.count(&label));
            assert_eq!(binary.probability(&label), general.probability(&label));
        }
    }

    #[test]
    fn prediction_map_covers_training_labels() {
        let props = ClassificationProperties::from_instances(&instances(&["a", "a", "b"]));
        let training = ["a", "b", "c"];
        let pm = props.prediction_map(&training);
        assert_eq!(pm.len(), 3);
        assert_eq!(pm.get(&"c"), 0.0);
        let sum: f64 = pm.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_counts_are_dropped() {
        let counts: BTreeMap<&str, u64> = [("a", 4), ("b", 0)].into_iter().collect();
        let props = ClassificationProperties::from_counts(counts);
        assert_eq!(props.n_labels(), 1);
        assert!(!props.is_binary());
    }
}
